// ABOUTME: Evaluator module for walking the AST against the environment arena
// ABOUTME: Statement outcomes are an explicit Completion sum type (Normal /
// ABOUTME: Break / Continue / Return) rather than exception-like unwinding

use std::rc::Rc;

use indexmap::IndexMap;

use crate::env::{EnvArena, EnvId};
use crate::error::MinilangError;
use crate::parser::{BinOp, Expr, Stmt};
use crate::value::{BuiltinData, ClosureData, Value};

/// The outcome of evaluating one statement. Only `While`/`For` absorb
/// `Break`/`Continue`; a call frame absorbs `Return` and turns any
/// `Break`/`Continue` reaching its boundary into an error; the top level
/// turns all three into an error.
#[derive(Debug)]
enum Completion {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub struct Evaluator {
    arena: EnvArena,
    root: EnvId,
    output: Vec<String>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        crate::builtins::register_builtins(&mut arena, root);
        Evaluator {
            arena,
            root,
            output: Vec::new(),
        }
    }

    /// Evaluates a whole program. On success, returns the ordered list of
    /// printed lines. Any failure unwinds the whole evaluation; the caller
    /// is expected to discard partial output on `Err`.
    pub fn run(&mut self, program: &[Stmt]) -> Result<Vec<String>, MinilangError> {
        for stmt in program {
            match self.eval_stmt(stmt, self.root)? {
                Completion::Normal => {}
                Completion::Return(_) => return Err(MinilangError::ReturnAtTopLevel),
                Completion::Break => return Err(MinilangError::BreakAtTopLevel),
                Completion::Continue => return Err(MinilangError::ContinueAtTopLevel),
            }
        }
        Ok(std::mem::take(&mut self.output))
    }

    fn eval_stmts(&mut self, stmts: &[Stmt], env: EnvId) -> Result<Completion, MinilangError> {
        for stmt in stmts {
            match self.eval_stmt(stmt, env)? {
                Completion::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: EnvId) -> Result<Completion, MinilangError> {
        match stmt {
            Stmt::Block(stmts) => {
                let child = self.arena.create_child(env);
                self.eval_stmts(stmts, child)
            }
            Stmt::Var(target, value_expr) => {
                let value = self.eval_expr(value_expr, env)?;
                match target {
                    Expr::Name(name) => {
                        self.arena.define(env, name, value)?;
                        Ok(Completion::Normal)
                    }
                    // `var a[0] = ...` / `var a.b = ...`: nothing is being
                    // defined, so this is rejected rather than silently
                    // reinterpreted as `set`. See DESIGN.md.
                    _ => Err(MinilangError::IllegalAssignment),
                }
            }
            Stmt::Set(target, value_expr) => self.eval_set(target, value_expr, env),
            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.eval_stmt(then_branch, env)
                } else {
                    self.eval_stmt(else_branch, env)
                }
            }
            Stmt::While(cond, body) => {
                while self.eval_expr(cond, env)?.is_truthy() {
                    match self.eval_stmt(body, env)? {
                        Completion::Break => break,
                        Completion::Continue | Completion::Normal => {}
                        Completion::Return(v) => return Ok(Completion::Return(v)),
                    }
                }
                Ok(Completion::Normal)
            }
            Stmt::For(name, iter_expr, body) => self.eval_for(name, iter_expr, body, env),
            Stmt::Break => Ok(Completion::Break),
            Stmt::Continue => Ok(Completion::Continue),
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(e, env)?,
                    None => Value::Null,
                };
                Ok(Completion::Return(value))
            }
            Stmt::Print(expr) => {
                let value = self.eval_expr(expr, env)?;
                self.output.push(value.to_string());
                Ok(Completion::Normal)
            }
            Stmt::ExprStmt(expr) => {
                self.eval_expr(expr, env)?;
                Ok(Completion::Normal)
            }
        }
    }

    fn eval_for(
        &mut self,
        name: &str,
        iter_expr: &Expr,
        body: &Stmt,
        env: EnvId,
    ) -> Result<Completion, MinilangError> {
        let iter_value = self.eval_expr(iter_expr, env)?;
        let items = iterable_items(&iter_value)?;

        let loop_env = self.arena.create_child(env);
        self.arena.define(loop_env, name, Value::Null)?;

        for item in items {
            self.arena.assign(loop_env, name, item)?;
            match self.eval_stmt(body, loop_env)? {
                Completion::Break => break,
                Completion::Continue | Completion::Normal => {}
                Completion::Return(v) => return Ok(Completion::Return(v)),
            }
        }
        Ok(Completion::Normal)
    }

    fn eval_set(
        &mut self,
        target: &Expr,
        value_expr: &Expr,
        env: EnvId,
    ) -> Result<Completion, MinilangError> {
        match target {
            Expr::Name(name) => {
                let value = self.eval_expr(value_expr, env)?;
                self.arena.assign(env, name, value)?;
            }
            Expr::Index(recv_expr, key_expr) => {
                let container = self.eval_expr(recv_expr, env)?;
                let key = self.eval_expr(key_expr, env)?;
                let value = self.eval_expr(value_expr, env)?;
                match (&container, &key) {
                    (Value::Array(items), Value::Int(i)) => {
                        let mut items = items.borrow_mut();
                        if *i < 0 || *i as usize >= items.len() {
                            return Err(MinilangError::IllegalAssignment);
                        }
                        items[*i as usize] = value;
                    }
                    (Value::Dict(entries), Value::Str(key)) => {
                        entries.borrow_mut().insert(key.to_string(), value);
                    }
                    _ => return Err(MinilangError::IllegalAssignment),
                }
            }
            Expr::Dot(recv_expr, name) => {
                let container = self.eval_expr(recv_expr, env)?;
                let value = self.eval_expr(value_expr, env)?;
                match &container {
                    Value::Dict(entries) => {
                        entries.borrow_mut().insert(name.clone(), value);
                    }
                    _ => return Err(MinilangError::IllegalAssignment),
                }
            }
            _ => return Err(MinilangError::IllegalAssignment),
        }
        Ok(Completion::Normal)
    }

    fn eval_expr(&mut self, expr: &Expr, env: EnvId) -> Result<Value, MinilangError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Str(s) => Ok(Value::str(s.clone())),
            Expr::Name(name) => self.arena.get(env, name),
            Expr::Arr(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, env)?);
                }
                Ok(Value::array(values))
            }
            Expr::Dic(entries) => {
                let mut map = IndexMap::new();
                for (key, value_expr) in entries {
                    let value = self.eval_expr(value_expr, env)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::dict(map))
            }
            Expr::Func(params, body) => Ok(Value::Closure(Rc::new(ClosureData {
                params: (**params).clone(),
                body: Rc::clone(body),
                env,
            }))),
            Expr::Index(recv, key) => {
                let recv = self.eval_expr(recv, env)?;
                let key = self.eval_expr(key, env)?;
                index_value(&recv, &key)
            }
            Expr::Dot(recv_expr, name) => {
                let recv = self.eval_expr(recv_expr, env)?;
                let (resolved, this_value) = self.resolve_dot(&recv, name, env)?;
                self.bind_ufcs(resolved, this_value)
            }
            Expr::BinOp(op, l, r) => self.eval_binop(*op, l, r, env),
            Expr::Neg(e) => match self.eval_expr(e, env)? {
                Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                _ => Err(MinilangError::IllegalOperation),
            },
            Expr::Not(e) => {
                let value = self.eval_expr(e, env)?;
                Ok(Value::Bool(!value.is_truthy()))
            }
            Expr::Call(callee, args) => {
                let callee = self.eval_expr(callee, env)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, env)?);
                }
                self.call_value(callee, values)
            }
        }
    }

    /// Walks `RECV`, then `RECV.__proto__`, then its `__proto__`, etc.,
    /// looking for an owned key `name`; falls back to an environment lookup
    /// if the chain is exhausted (or `RECV` was never a dictionary at all).
    /// `this` is always the ORIGINAL receiver, not the prototype it was
    /// finally found on.
    fn resolve_dot(
        &self,
        recv: &Value,
        name: &str,
        env: EnvId,
    ) -> Result<(Value, Value), MinilangError> {
        let this_value = recv.clone();
        let mut current = recv.clone();
        loop {
            match &current {
                Value::Dict(entries) => {
                    if let Some(v) = entries.borrow().get(name) {
                        return Ok((v.clone(), this_value));
                    }
                    match entries.borrow().get("__proto__").cloned() {
                        Some(proto) => current = proto,
                        None => break,
                    }
                }
                _ => break,
            }
        }
        let value = self.arena.get(env, name)?;
        Ok((value, this_value))
    }

    /// Uniform Function Call Syntax: a resolved dot-access that names a
    /// closure or builtin is rebound with its first parameter/argument
    /// fixed to `this`; anything else passes through unchanged.
    fn bind_ufcs(&mut self, resolved: Value, this_value: Value) -> Result<Value, MinilangError> {
        match resolved {
            Value::Closure(closure) if !closure.params.is_empty() => {
                let bound_env = self.arena.create_child(closure.env);
                self.arena
                    .define(bound_env, &closure.params[0], this_value)
                    .expect("fresh scope cannot already bind this parameter");
                Ok(Value::Closure(Rc::new(ClosureData {
                    params: closure.params[1..].to_vec(),
                    body: Rc::clone(&closure.body),
                    env: bound_env,
                })))
            }
            Value::Builtin(builtin) => {
                let name = builtin.name;
                Ok(Value::Builtin(Rc::new(BuiltinData {
                    name,
                    func: Box::new(move |args: &[Value]| {
                        let mut full = Vec::with_capacity(args.len() + 1);
                        full.push(this_value.clone());
                        full.extend_from_slice(args);
                        (builtin.func)(&full)
                    }),
                })))
            }
            other => Ok(other),
        }
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, MinilangError> {
        match callee {
            Value::Closure(closure) => {
                let call_env = self.arena.create_child(closure.env);
                for (param, arg) in closure.params.iter().zip(args) {
                    self.arena.define(call_env, param, arg)?;
                }
                match self.eval_stmt(closure.body.as_ref(), call_env)? {
                    Completion::Return(v) => Ok(v),
                    Completion::Normal => Ok(Value::Null),
                    Completion::Break => Err(MinilangError::BreakOutsideLoop),
                    Completion::Continue => Err(MinilangError::ContinueOutsideLoop),
                }
            }
            Value::Builtin(builtin) => (builtin.func)(&args),
            _ => Err(MinilangError::NotCallable),
        }
    }

    fn eval_binop(
        &mut self,
        op: BinOp,
        l: &Expr,
        r: &Expr,
        env: EnvId,
    ) -> Result<Value, MinilangError> {
        match op {
            BinOp::And => {
                let left = self.eval_expr(l, env)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.eval_expr(r, env)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            BinOp::Or => {
                let left = self.eval_expr(l, env)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.eval_expr(r, env)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            BinOp::Eq => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                Ok(Value::Bool(left == right))
            }
            BinOp::Ne => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                Ok(Value::Bool(left != right))
            }
            BinOp::Lt => self.eval_ordering(l, r, env, true),
            BinOp::Gt => self.eval_ordering(l, r, env, false),
            BinOp::Add => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
                    (Value::Str(a), Value::Str(b)) => {
                        Ok(Value::str(format!("{}{}", a, b)))
                    }
                    (Value::Array(a), Value::Array(b)) => {
                        let mut items = a.borrow().clone();
                        items.extend(b.borrow().iter().cloned());
                        Ok(Value::array(items))
                    }
                    _ => Err(MinilangError::IllegalOperation),
                }
            }
            BinOp::Sub => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
                    _ => Err(MinilangError::IllegalOperation),
                }
            }
            BinOp::Mul => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                match (&left, &right) {
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
                    (Value::Array(items), Value::Int(n)) => {
                        // Shallow sharing: cloning a Value clones the handle,
                        // not the underlying storage, so repeated elements
                        // still alias one another. See DESIGN.md.
                        let source = items.borrow();
                        let mut out = Vec::new();
                        for _ in 0..(*n).max(0) {
                            out.extend(source.iter().cloned());
                        }
                        Ok(Value::array(out))
                    }
                    _ => Err(MinilangError::IllegalOperation),
                }
            }
            BinOp::Div => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                match (&left, &right) {
                    (Value::Int(_), Value::Int(0)) => Err(MinilangError::DivisionByZero),
                    (Value::Int(a), Value::Int(b)) => Ok(Value::Int(floor_div(*a, *b))),
                    _ => Err(MinilangError::IllegalOperation),
                }
            }
            BinOp::Mod => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                match &right {
                    Value::Array(items) => {
                        Ok(Value::Bool(items.borrow().iter().any(|v| *v == left)))
                    }
                    Value::Dict(entries) => match &left {
                        Value::Str(key) => {
                            Ok(Value::Bool(entries.borrow().contains_key(key.as_ref())))
                        }
                        _ => Ok(Value::Bool(false)),
                    },
                    Value::Str(haystack) => match &left {
                        Value::Str(needle) => Ok(Value::Bool(haystack.contains(needle.as_ref()))),
                        _ => Ok(Value::Bool(false)),
                    },
                    Value::Int(0) => Err(MinilangError::DivisionByZero),
                    Value::Int(b) => match &left {
                        Value::Int(a) => Ok(Value::Int(floor_mod(*a, *b))),
                        _ => Err(MinilangError::IllegalOperation),
                    },
                    _ => Err(MinilangError::IllegalOperation),
                }
            }
            BinOp::Pow => {
                let left = self.eval_expr(l, env)?;
                let right = self.eval_expr(r, env)?;
                match (&left, &right) {
                    (Value::Int(base), Value::Int(exp)) => {
                        let mut result: i64 = 1;
                        let mut remaining = *exp;
                        while remaining > 0 {
                            result = result.wrapping_mul(*base);
                            remaining -= 1;
                        }
                        Ok(Value::Int(result))
                    }
                    _ => Err(MinilangError::IllegalOperation),
                }
            }
        }
    }

    fn eval_ordering(
        &mut self,
        l: &Expr,
        r: &Expr,
        env: EnvId,
        want_less: bool,
    ) -> Result<Value, MinilangError> {
        let left = self.eval_expr(l, env)?;
        let right = self.eval_expr(r, env)?;
        match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => {
                Ok(Value::Bool(if want_less { a < b } else { a > b }))
            }
            (Value::Str(a), Value::Str(b)) => {
                Ok(Value::Bool(if want_less { a < b } else { a > b }))
            }
            _ => Err(MinilangError::IllegalOperation),
        }
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn index_value(recv: &Value, key: &Value) -> Result<Value, MinilangError> {
    match (recv, key) {
        (Value::Array(items), Value::Int(i)) => {
            let items = items.borrow();
            if *i < 0 || *i as usize >= items.len() {
                return Err(MinilangError::IllegalIndex);
            }
            Ok(items[*i as usize].clone())
        }
        (Value::Dict(entries), Value::Str(key)) => entries
            .borrow()
            .get(key.as_ref())
            .cloned()
            .ok_or_else(|| MinilangError::NotDefined {
                name: key.to_string(),
            }),
        (Value::Str(s), Value::Int(i)) => {
            if *i < 0 {
                return Err(MinilangError::IllegalIndex);
            }
            s.chars()
                .nth(*i as usize)
                .map(|c| Value::str(c.to_string()))
                .ok_or(MinilangError::IllegalIndex)
        }
        _ => Err(MinilangError::IllegalIndex),
    }
}

fn iterable_items(value: &Value) -> Result<Vec<Value>, MinilangError> {
    match value {
        Value::Str(s) => Ok(s.chars().map(|c| Value::str(c.to_string())).collect()),
        Value::Array(items) => Ok(items.borrow().clone()),
        Value::Dict(entries) => Ok(entries
            .borrow()
            .keys()
            .map(|k| Value::str(k.clone()))
            .collect()),
        other => Err(MinilangError::NotIterable {
            found: other.type_name().to_string(),
        }),
    }
}
