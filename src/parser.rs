// ABOUTME: Recursive-descent parser with one token of lookahead, producing
// ABOUTME: the AST the evaluator walks

use std::rc::Rc;

use crate::error::MinilangError;
use crate::scanner::{Scanner, Token};

/// A statement node. Top-level programs are a bare `Vec<Stmt>`, distinct
/// from a `Block`, so the evaluator can tell "at top level" apart from
/// "inside a nested block" when reporting control-flow misuse.
#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),
    Var(Expr, Expr),
    Set(Expr, Expr),
    If(Box<Expr>, Box<Stmt>, Box<Stmt>),
    While(Box<Expr>, Box<Stmt>),
    For(String, Box<Expr>, Box<Stmt>),
    Break,
    Continue,
    Return(Option<Expr>),
    Print(Expr),
    ExprStmt(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Gt,
    Eq,
    Ne,
    And,
    Or,
}

/// An expression node. `Index`/`Dot` also serve as l-value targets for
/// `var`/`set` — the parser builds the same shape in both positions.
#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Null,
    Name(String),
    Str(String),
    Arr(Vec<Expr>),
    Dic(Vec<(String, Expr)>),
    Func(Rc<Vec<String>>, Rc<Stmt>),
    Index(Box<Expr>, Box<Expr>),
    Dot(Box<Expr>, String),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
}

/// Parses a whole program (every top-level statement) in one call.
pub fn parse(source: &str) -> Result<Vec<Stmt>, MinilangError> {
    let mut parser = Parser::new(source);
    let mut stmts = Vec::new();
    while parser.current != Token::Eof {
        stmts.push(parser.parse_stmt()?);
    }
    Ok(stmts)
}

struct Parser {
    scanner: Scanner,
    current: Token,
}

impl Parser {
    fn new(source: &str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Parser { scanner, current }
    }

    fn bump(&mut self) -> Token {
        std::mem::replace(&mut self.current, self.scanner.next_token())
    }

    fn check_punct(&self, p: &str) -> bool {
        matches!(&self.current, Token::Punct(s) if s == p)
    }

    fn is_ident(&self, text: &str) -> bool {
        matches!(&self.current, Token::Ident(s) if s == text)
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), MinilangError> {
        if self.check_punct(p) {
            self.bump();
            Ok(())
        } else {
            Err(MinilangError::ExpectedToken {
                expected: p.to_string(),
                found: self.current.describe(),
            })
        }
    }

    /// An identifier used as an l-value base or a `def`/`func` name.
    fn expect_name(&mut self) -> Result<String, MinilangError> {
        match self.bump() {
            Token::Ident(s) => Ok(s),
            other => Err(MinilangError::ExpectedName {
                found: other.describe(),
            }),
        }
    }

    /// An identifier used inside a list position: parameters, dict keys,
    /// dotted field names, `for` loop variables.
    fn expect_name_in_list(&mut self) -> Result<String, MinilangError> {
        match self.bump() {
            Token::Ident(s) => Ok(s),
            other => Err(MinilangError::NameExpected {
                found: other.describe(),
            }),
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, MinilangError> {
        if self.check_punct("{") {
            return Ok(Stmt::Block(self.parse_block_stmts()?));
        }
        if self.is_ident("var") {
            return self.parse_var();
        }
        if self.is_ident("set") {
            return self.parse_set();
        }
        if self.is_ident("if") {
            return self.parse_if();
        }
        if self.is_ident("while") {
            return self.parse_while();
        }
        if self.is_ident("for") {
            return self.parse_for();
        }
        if self.is_ident("break") {
            self.bump();
            self.expect_punct(";")?;
            return Ok(Stmt::Break);
        }
        if self.is_ident("continue") {
            self.bump();
            self.expect_punct(";")?;
            return Ok(Stmt::Continue);
        }
        if self.is_ident("def") {
            return self.parse_def();
        }
        if self.is_ident("return") {
            return self.parse_return();
        }
        if self.is_ident("print") {
            return self.parse_print();
        }
        self.parse_expr_stmt()
    }

    fn parse_block_stmts(&mut self) -> Result<Vec<Stmt>, MinilangError> {
        self.expect_punct("{")?;
        let mut stmts = Vec::new();
        while !self.check_punct("}") {
            if self.current == Token::Eof {
                return Err(MinilangError::ExpectedToken {
                    expected: "}".to_string(),
                    found: self.current.describe(),
                });
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect_punct("}")?;
        Ok(stmts)
    }

    /// Parses an identifier primary plus any `[EXPR]`/`.NAME` suffixes into
    /// a nested `Index`/`Dot` l-value.
    fn parse_lvalue(&mut self) -> Result<Expr, MinilangError> {
        let mut target = Expr::Name(self.expect_name()?);
        loop {
            if self.check_punct("[") {
                self.bump();
                let idx = self.parse_expr()?;
                self.expect_punct("]")?;
                target = Expr::Index(Box::new(target), Box::new(idx));
            } else if self.check_punct(".") {
                self.bump();
                let name = self.expect_name_in_list()?;
                target = Expr::Dot(Box::new(target), name);
            } else {
                break;
            }
        }
        Ok(target)
    }

    fn parse_var(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        let target = self.parse_lvalue()?;
        self.expect_punct("=")?;
        let value = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Var(target, value))
    }

    fn parse_set(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        let target = self.parse_lvalue()?;
        self.expect_punct("=")?;
        let value = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Set(target, value))
    }

    fn parse_if(&mut self) -> Result<Stmt, MinilangError> {
        self.bump(); // `if` or (recursively) `elif`
        let cond = self.parse_expr()?;
        let then_branch = Stmt::Block(self.parse_block_stmts()?);
        let else_branch = if self.is_ident("elif") {
            self.parse_if()?
        } else if self.is_ident("else") {
            self.bump();
            Stmt::Block(self.parse_block_stmts()?)
        } else {
            Stmt::Block(Vec::new())
        };
        Ok(Stmt::If(
            Box::new(cond),
            Box::new(then_branch),
            Box::new(else_branch),
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        let cond = self.parse_expr()?;
        let body = Stmt::Block(self.parse_block_stmts()?);
        Ok(Stmt::While(Box::new(cond), Box::new(body)))
    }

    fn parse_for(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        let name = self.expect_name_in_list()?;
        if !self.is_ident("in") {
            return Err(MinilangError::ExpectedToken {
                expected: "in".to_string(),
                found: self.current.describe(),
            });
        }
        self.bump();
        let iter = self.parse_expr()?;
        let body = Stmt::Block(self.parse_block_stmts()?);
        Ok(Stmt::For(name, Box::new(iter), Box::new(body)))
    }

    fn parse_def(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        let name = self.expect_name()?;
        let params = self.parse_params()?;
        let body = self.parse_block_stmts()?;
        let func = Expr::Func(Rc::new(params), Rc::new(Stmt::Block(body)));
        Ok(Stmt::Var(Expr::Name(name), func))
    }

    fn parse_params(&mut self) -> Result<Vec<String>, MinilangError> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        if !self.check_punct(")") {
            loop {
                params.push(self.expect_name_in_list()?);
                if self.check_punct(",") {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    fn parse_return(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        if self.check_punct(";") {
            self.bump();
            return Ok(Stmt::Return(None));
        }
        let value = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Return(Some(value)))
    }

    fn parse_print(&mut self) -> Result<Stmt, MinilangError> {
        self.bump();
        let value = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::Print(value))
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, MinilangError> {
        let value = self.parse_expr()?;
        self.expect_punct(";")?;
        Ok(Stmt::ExprStmt(value))
    }

    fn parse_expr(&mut self) -> Result<Expr, MinilangError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, MinilangError> {
        let mut left = self.parse_and()?;
        while self.is_ident("or") {
            self.bump();
            let right = self.parse_and()?;
            left = Expr::BinOp(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, MinilangError> {
        let mut left = self.parse_not()?;
        while self.is_ident("and") {
            self.bump();
            let right = self.parse_not()?;
            left = Expr::BinOp(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, MinilangError> {
        if self.is_ident("not") {
            self.bump();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_eq()
    }

    fn parse_eq(&mut self) -> Result<Expr, MinilangError> {
        let mut left = self.parse_rel()?;
        loop {
            if self.check_punct("=") {
                self.bump();
                let right = self.parse_rel()?;
                left = Expr::BinOp(BinOp::Eq, Box::new(left), Box::new(right));
            } else if self.check_punct("#") {
                self.bump();
                let right = self.parse_rel()?;
                left = Expr::BinOp(BinOp::Ne, Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_rel(&mut self) -> Result<Expr, MinilangError> {
        let mut left = self.parse_add()?;
        loop {
            if self.check_punct("<") {
                self.bump();
                let right = self.parse_add()?;
                left = Expr::BinOp(BinOp::Lt, Box::new(left), Box::new(right));
            } else if self.check_punct(">") {
                self.bump();
                let right = self.parse_add()?;
                left = Expr::BinOp(BinOp::Gt, Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_add(&mut self) -> Result<Expr, MinilangError> {
        let mut left = self.parse_mul()?;
        loop {
            if self.check_punct("+") {
                self.bump();
                let right = self.parse_mul()?;
                left = Expr::BinOp(BinOp::Add, Box::new(left), Box::new(right));
            } else if self.check_punct("-") {
                self.bump();
                let right = self.parse_mul()?;
                left = Expr::BinOp(BinOp::Sub, Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Expr, MinilangError> {
        let mut left = self.parse_unary_minus()?;
        loop {
            if self.check_punct("*") {
                self.bump();
                let right = self.parse_unary_minus()?;
                left = Expr::BinOp(BinOp::Mul, Box::new(left), Box::new(right));
            } else if self.check_punct("/") {
                self.bump();
                let right = self.parse_unary_minus()?;
                left = Expr::BinOp(BinOp::Div, Box::new(left), Box::new(right));
            } else if self.check_punct("%") {
                self.bump();
                let right = self.parse_unary_minus()?;
                left = Expr::BinOp(BinOp::Mod, Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary_minus(&mut self) -> Result<Expr, MinilangError> {
        if self.check_punct("-") {
            self.bump();
            let inner = self.parse_unary_minus()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_pow()
    }

    fn parse_pow(&mut self) -> Result<Expr, MinilangError> {
        let base = self.parse_postfix()?;
        if self.check_punct("^") {
            self.bump();
            let rhs = self.parse_pow()?; // right-associative
            return Ok(Expr::BinOp(BinOp::Pow, Box::new(base), Box::new(rhs)));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, MinilangError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check_punct("(") {
                self.bump();
                let mut args = Vec::new();
                if !self.check_punct(")") {
                    loop {
                        args.push(self.parse_expr()?);
                        if self.check_punct(",") {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                self.expect_punct(")")?;
                expr = Expr::Call(Box::new(expr), args);
            } else if self.check_punct("[") {
                self.bump();
                let idx = self.parse_expr()?;
                self.expect_punct("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(idx));
            } else if self.check_punct(".") {
                self.bump();
                let name = self.expect_name_in_list()?;
                expr = Expr::Dot(Box::new(expr), name);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, MinilangError> {
        match self.current.clone() {
            Token::Int(n) => {
                self.bump();
                Ok(Expr::Int(n))
            }
            Token::Bool(b) => {
                self.bump();
                Ok(Expr::Bool(b))
            }
            Token::Null => {
                self.bump();
                Ok(Expr::Null)
            }
            Token::Str(s) => {
                self.bump();
                Ok(Expr::Str(s))
            }
            Token::Punct(p) if p == "(" => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect_punct(")")?;
                Ok(inner)
            }
            Token::Punct(p) if p == "[" => {
                self.bump();
                let mut items = Vec::new();
                if !self.check_punct("]") {
                    loop {
                        items.push(self.parse_expr()?);
                        if self.check_punct(",") {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                self.expect_punct("]")?;
                Ok(Expr::Arr(items))
            }
            Token::Punct(p) if p == "$[" => {
                self.bump();
                let mut entries = Vec::new();
                if !self.check_punct("]") {
                    loop {
                        let key = self.expect_name_in_list()?;
                        self.expect_punct(":")?;
                        let value = self.parse_expr()?;
                        entries.push((key, value));
                        if self.check_punct(",") {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                self.expect_punct("]")?;
                Ok(Expr::Dic(entries))
            }
            Token::Ident(name) if name == "func" => {
                self.bump();
                let params = self.parse_params()?;
                let body = self.parse_block_stmts()?;
                Ok(Expr::Func(Rc::new(params), Rc::new(Stmt::Block(body))))
            }
            Token::Ident(name) => {
                self.bump();
                Ok(Expr::Name(name))
            }
            other => Err(MinilangError::UnexpectedToken {
                found: other.describe(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn print_int_literal() {
        let prog = parse("print 123;").unwrap();
        assert!(matches!(&prog[0], Stmt::Print(Expr::Int(123))));
    }

    #[test]
    fn addition_is_left_associative() {
        let prog = parse("print 5 + 6 + 7;").unwrap();
        match &prog[0] {
            Stmt::Print(Expr::BinOp(BinOp::Add, l, r)) => {
                assert!(matches!(**r, Expr::Int(7)));
                assert!(matches!(**l, Expr::BinOp(BinOp::Add, _, _)));
            }
            _ => panic!("expected nested +"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let prog = parse("print 2 ^ 2 ^ 3;").unwrap();
        match &prog[0] {
            Stmt::Print(Expr::BinOp(BinOp::Pow, l, r)) => {
                assert!(matches!(**l, Expr::Int(2)));
                assert!(matches!(**r, Expr::BinOp(BinOp::Pow, _, _)));
            }
            _ => panic!("expected nested ^"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_power_precedence_level() {
        // `*` sits below `^` in the precedence table, so `5 * 2 ^ 3` is
        // `5 * (2 ^ 3)`.
        let prog = parse("print 5 * 2 ^ 3;").unwrap();
        match &prog[0] {
            Stmt::Print(Expr::BinOp(BinOp::Mul, l, r)) => {
                assert!(matches!(**l, Expr::Int(5)));
                assert!(matches!(**r, Expr::BinOp(BinOp::Pow, _, _)));
            }
            _ => panic!("expected * over ^"),
        }
    }

    #[test]
    fn missing_semicolon_reports_expected_token() {
        let err = parse("print 5").unwrap_err();
        assert_eq!(err.to_string(), "Expected `;`, found `$EOF`.");
    }

    #[test]
    fn bad_punctuation_reports_expected_token() {
        let err = parse("print 5:").unwrap_err();
        assert_eq!(err.to_string(), "Expected `;`, found `:`.");
    }

    #[test]
    fn def_desugars_to_var_of_func() {
        let prog = parse("def square(x) { return x * x; }").unwrap();
        match &prog[0] {
            Stmt::Var(Expr::Name(name), Expr::Func(params, _)) => {
                assert_eq!(name, "square");
                assert_eq!(**params, vec!["x".to_string()]);
            }
            _ => panic!("expected desugared def"),
        }
    }

    #[test]
    fn elif_chain_desugars_to_nested_if() {
        let prog = parse("if 1 { } elif 2 { } else { }").unwrap();
        match &prog[0] {
            Stmt::If(_, _, else_branch) => match &**else_branch {
                Stmt::If(_, _, _) => {}
                _ => panic!("expected nested if for elif"),
            },
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn dict_literal_keys_are_identifiers() {
        let prog = parse("print $[val: 5];").unwrap();
        match &prog[0] {
            Stmt::Print(Expr::Dic(entries)) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, "val");
            }
            _ => panic!("expected dict literal"),
        }
    }

    #[test]
    fn lvalue_with_suffixes_builds_nested_target() {
        let prog = parse("set a.abc = 1;").unwrap();
        match &prog[0] {
            Stmt::Set(Expr::Dot(base, name), _) => {
                assert!(matches!(**base, Expr::Name(ref n) if n == "a"));
                assert_eq!(name, "abc");
            }
            _ => panic!("expected dotted set target"),
        }
    }
}
