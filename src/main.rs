mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod parser;
mod scanner;
mod value;

use clap::Parser;
use eval::Evaluator;
use std::io::Read;
use std::path::PathBuf;

/// A tree-walking interpreter for the minilang language
#[derive(Parser, Debug)]
#[command(name = "minilang")]
#[command(version = config::VERSION)]
#[command(about = config::ABOUT)]
struct CliArgs {
    /// Script file to execute (omit to read a program from stdin until EOF)
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Run an inline source string instead of a file or stdin
    #[arg(short = 'e', long = "eval", value_name = "SOURCE")]
    eval: Option<String>,
}

fn main() {
    let args = CliArgs::parse();

    let source = match read_source(&args) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match run(&source) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn read_source(args: &CliArgs) -> Result<String, String> {
    if let Some(source) = &args.eval {
        return Ok(source.clone());
    }
    if let Some(path) = &args.script {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read script file {}: {}", path.display(), e));
    }
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| format!("Cannot read stdin: {}", e))?;
    Ok(source)
}

fn run(source: &str) -> Result<Vec<String>, error::MinilangError> {
    let program = parser::parse(source)?;
    Evaluator::new().run(&program)
}
