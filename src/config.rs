// ABOUTME: Version and banner constants for the CLI driver

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const ABOUT: &str = "A tree-walking interpreter for the minilang language";
