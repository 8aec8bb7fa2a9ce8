// ABOUTME: Byte-position scanner producing one token per call, one token of
// ABOUTME: lookahead, no tokenizer-level error reporting (that's the parser's job)

use std::fmt;

/// One lexical token. Punctuation is always a single byte except for the
/// two-byte `$[` lexeme; every other multi-character "operator" (`>=`, `==`,
/// ...) simply doesn't exist in minilang.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    Int(i64),
    Bool(bool),
    Null,
    /// A bare name: either an identifier or a reserved keyword spelling
    /// (`var`, `if`, `and`, ...). The parser, not the scanner, distinguishes
    /// them by comparing text.
    Ident(String),
    /// A single- or double-byte punctuation lexeme, e.g. `;`, `(`, `$[`.
    Punct(String),
    Str(String),
}

impl Token {
    /// Renders the token the way error messages quote it: integers as
    /// decimal, end-of-input as `$EOF`, everything else as its own spelling.
    pub fn describe(&self) -> String {
        match self {
            Token::Eof => "$EOF".to_string(),
            Token::Int(n) => n.to_string(),
            Token::Bool(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::Ident(s) => s.clone(),
            Token::Punct(s) => s.clone(),
            Token::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A pull-based scanner over minilang source text. Holds no lookahead of its
/// own; the parser is responsible for buffering the single token it peeks.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Returns the next token, advancing the cursor past it.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Token::Eof;
        };

        if is_ident_start(c) {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
                self.pos += 1;
            }
            let text: String = self.chars[start..self.pos].iter().collect();
            return match text.as_str() {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                "null" => Token::Null,
                _ => Token::Ident(text),
            };
        }

        if c.is_ascii_digit() {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            let text: String = self.chars[start..self.pos].iter().collect();
            // Lexically bounded to digit runs; overflow wraps per the
            // 64-bit two's-complement integer model.
            let n: i64 = text.parse().unwrap_or_else(|_| {
                text.parse::<u64>().map(|u| u as i64).unwrap_or(i64::MAX)
            });
            return Token::Int(n);
        }

        match c {
            '!' => {
                while matches!(self.peek(), Some(c) if c != '\n') {
                    self.pos += 1;
                }
                // the newline itself (if present) is left for skip_whitespace
                self.next_token()
            }
            '\'' => {
                self.pos += 1; // opening quote
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c != '\'') {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                if self.peek() == Some('\'') {
                    self.pos += 1;
                }
                Token::Str(text)
            }
            '$' => {
                self.pos += 1;
                if self.peek() == Some('[') {
                    self.pos += 1;
                    Token::Punct("$[".to_string())
                } else {
                    Token::Punct("$".to_string())
                }
            }
            other => {
                self.pos += 1;
                Token::Punct(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let mut s = Scanner::new(src);
        let mut out = Vec::new();
        loop {
            let t = s.next_token();
            let done = t == Token::Eof;
            out.push(t);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn integers() {
        assert_eq!(tokens("42"), vec![Token::Int(42), Token::Eof]);
    }

    #[test]
    fn keywords_become_dedicated_tokens() {
        assert_eq!(tokens("true false null"), vec![
            Token::Bool(true),
            Token::Bool(false),
            Token::Null,
            Token::Eof,
        ]);
    }

    #[test]
    fn identifiers() {
        assert_eq!(
            tokens("foo_bar1"),
            vec![Token::Ident("foo_bar1".to_string()), Token::Eof]
        );
    }

    #[test]
    fn string_literal_no_escapes() {
        assert_eq!(
            tokens("'hello\\n'"),
            vec![Token::Str("hello\\n".to_string()), Token::Eof]
        );
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(
            tokens("1 ! comment\n2"),
            vec![Token::Int(1), Token::Int(2), Token::Eof]
        );
    }

    #[test]
    fn dollar_bracket_is_two_byte_lexeme() {
        assert_eq!(
            tokens("$[ $"),
            vec![
                Token::Punct("$[".to_string()),
                Token::Punct("$".to_string()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn single_byte_punctuation() {
        assert_eq!(
            tokens(";(){}[],.:=#<>+-*/%^"),
            vec![
                Token::Punct(";".to_string()),
                Token::Punct("(".to_string()),
                Token::Punct(")".to_string()),
                Token::Punct("{".to_string()),
                Token::Punct("}".to_string()),
                Token::Punct("[".to_string()),
                Token::Punct("]".to_string()),
                Token::Punct(",".to_string()),
                Token::Punct(".".to_string()),
                Token::Punct(":".to_string()),
                Token::Punct("=".to_string()),
                Token::Punct("#".to_string()),
                Token::Punct("<".to_string()),
                Token::Punct(">".to_string()),
                Token::Punct("+".to_string()),
                Token::Punct("-".to_string()),
                Token::Punct("*".to_string()),
                Token::Punct("/".to_string()),
                Token::Punct("%".to_string()),
                Token::Punct("^".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn describe_renders_eof_as_dollar_eof() {
        assert_eq!(Token::Eof.describe(), "$EOF");
    }
}
