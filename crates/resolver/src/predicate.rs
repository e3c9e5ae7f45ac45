// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small, restricted boolean-expression evaluator for `event_type` predicates and rule /
//! post-action `condition` strings.
//!
//! Supports boolean logic (`and`/`or`/`not`, `&&`/`||`/`!`), comparisons (`== != < > <= >=`),
//! dotted/bracketed member access into the evaluation scope, and a small date/duration
//! vocabulary (`now()`, `days(n)`, `hours(n)`, `minutes(n)`, `is_older_than(ts, dur)`). There
//! is no variable assignment, no loop, no function beyond the four above, and no way to reach
//! outside the scope value handed in -- by construction, not by a sandboxing afterthought.
//!
//! Every failure mode -- a malformed expression, an unknown identifier, a type mismatch in a
//! comparison -- evaluates to `false` rather than propagating an error, per the spec's
//! "treat all evaluation errors as false" rule.

use chrono::{DateTime, Utc};
use flowkeep_core::{parse_duration, parse_timestamp};
use serde_json::Value;
use std::time::Duration as StdDuration;

use crate::path::resolve_path;

/// Evaluate `expr` against `scope`, using `now` for the `now()` helper. Never panics; any
/// failure (parse error, unknown identifier, type mismatch) yields `false`.
pub fn evaluate(expr: &str, scope: &Value, now: DateTime<Utc>) -> bool {
    let tokens = match lex(expr) {
        Some(t) => t,
        None => return false,
    };
    let mut parser = Parser { tokens, pos: 0 };
    let ast = match parser.parse_expr() {
        Some(ast) if parser.pos == parser.tokens.len() => ast,
        _ => return false,
    };
    match eval(&ast, scope, now) {
        Some(v) => truthy(&v),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Number(f64),
    Str(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Op(&'static str),
    LParen,
    RParen,
    Comma,
}

fn lex(input: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '"' | '\'' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    s.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return None;
                }
                i += 1;
                tokens.push(Token::Str(s));
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op("=="));
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op("!="));
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op("<="));
                i += 2;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Op(">="));
                i += 2;
            }
            '<' => {
                tokens.push(Token::Op("<"));
                i += 1;
            }
            '>' => {
                tokens.push(Token::Op(">"));
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n: f64 = text.parse().ok()?;
                tokens.push(Token::Number(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.' | '[' | ']'))
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(match text.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" | "none" => Token::Null,
                    _ => Token::Path(text),
                });
            }
            _ => return None,
        }
    }
    Some(tokens)
}

// ---------------------------------------------------------------------------
// AST + recursive-descent parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Expr {
    Lit(Value),
    Path(String),
    Call(String, Vec<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cmp(&'static str, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_not()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.bump();
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn parse_not(&mut self) -> Option<Expr> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.bump();
            let inner = self.parse_not()?;
            return Some(Expr::Not(Box::new(inner)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Option<Expr> {
        let lhs = self.parse_primary()?;
        if let Some(Token::Op(op)) = self.peek().cloned() {
            self.bump();
            let rhs = self.parse_primary()?;
            return Some(Expr::Cmp(op, Box::new(lhs), Box::new(rhs)));
        }
        Some(lhs)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.bump()? {
            Token::Number(n) => Some(Expr::Lit(serde_json::json!(n))),
            Token::Str(s) => Some(Expr::Lit(Value::String(s))),
            Token::True => Some(Expr::Lit(Value::Bool(true))),
            Token::False => Some(Expr::Lit(Value::Bool(false))),
            Token::Null => Some(Expr::Lit(Value::Null)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                match self.bump() {
                    Some(Token::RParen) => Some(inner),
                    _ => None,
                }
            }
            Token::Path(name) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.bump();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        loop {
                            args.push(self.parse_expr()?);
                            match self.peek() {
                                Some(Token::Comma) => {
                                    self.bump();
                                }
                                _ => break,
                            }
                        }
                    }
                    match self.bump() {
                        Some(Token::RParen) => Some(Expr::Call(name, args)),
                        _ => None,
                    }
                } else {
                    Some(Expr::Path(name))
                }
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

enum EV {
    Json(Value),
    Timestamp(DateTime<Utc>),
    Duration(StdDuration),
}

fn truthy(v: &EV) -> bool {
    match v {
        EV::Json(Value::Bool(b)) => *b,
        EV::Json(Value::Null) => false,
        EV::Json(Value::String(s)) => !s.is_empty(),
        EV::Json(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        EV::Json(Value::Array(a)) => !a.is_empty(),
        EV::Json(Value::Object(o)) => !o.is_empty(),
        EV::Timestamp(_) | EV::Duration(_) => true,
    }
}

fn eval(expr: &Expr, scope: &Value, now: DateTime<Utc>) -> Option<EV> {
    match expr {
        Expr::Lit(v) => Some(EV::Json(v.clone())),
        Expr::Path(p) => resolve_path(p, scope).map(EV::Json),
        Expr::Not(inner) => {
            let v = eval(inner, scope, now)?;
            Some(EV::Json(Value::Bool(!truthy(&v))))
        }
        Expr::And(l, r) => {
            let lv = eval(l, scope, now)?;
            if !truthy(&lv) {
                return Some(EV::Json(Value::Bool(false)));
            }
            let rv = eval(r, scope, now)?;
            Some(EV::Json(Value::Bool(truthy(&rv))))
        }
        Expr::Or(l, r) => {
            let lv = eval(l, scope, now)?;
            if truthy(&lv) {
                return Some(EV::Json(Value::Bool(true)));
            }
            let rv = eval(r, scope, now)?;
            Some(EV::Json(Value::Bool(truthy(&rv))))
        }
        Expr::Cmp(op, l, r) => {
            let lv = eval(l, scope, now)?;
            let rv = eval(r, scope, now)?;
            compare(op, &lv, &rv)
        }
        Expr::Call(name, args) => eval_call(name, args, scope, now),
    }
}

fn compare(op: &str, lv: &EV, rv: &EV) -> Option<EV> {
    if op == "==" || op == "!=" {
        let eq = json_eq(lv, rv);
        return Some(EV::Json(Value::Bool(if op == "==" { eq } else { !eq })));
    }
    let ordering = match (lv, rv) {
        (EV::Json(Value::Number(a)), EV::Json(Value::Number(b))) => {
            a.as_f64()?.partial_cmp(&b.as_f64()?)?
        }
        (EV::Json(Value::String(a)), EV::Json(Value::String(b))) => a.cmp(b),
        (EV::Timestamp(a), EV::Timestamp(b)) => a.cmp(b),
        _ => return None,
    };
    let result = match op {
        "<" => ordering.is_lt(),
        ">" => ordering.is_gt(),
        "<=" => ordering.is_le(),
        ">=" => ordering.is_ge(),
        _ => return None,
    };
    Some(EV::Json(Value::Bool(result)))
}

fn json_eq(lv: &EV, rv: &EV) -> bool {
    match (lv, rv) {
        (EV::Json(a), EV::Json(b)) => a == b,
        (EV::Timestamp(a), EV::Timestamp(b)) => a == b,
        _ => false,
    }
}

fn eval_call(name: &str, args: &[Expr], scope: &Value, now: DateTime<Utc>) -> Option<EV> {
    match name {
        "now" if args.is_empty() => Some(EV::Timestamp(now)),
        "days" | "hours" | "minutes" if args.len() == 1 => {
            let n = match eval(&args[0], scope, now)? {
                EV::Json(Value::Number(n)) => n.as_f64()?,
                _ => return None,
            };
            let secs = match name {
                "days" => n * 86_400.0,
                "hours" => n * 3_600.0,
                "minutes" => n * 60.0,
                _ => unreachable!(),
            };
            if secs < 0.0 {
                return None;
            }
            Some(EV::Duration(StdDuration::from_secs_f64(secs)))
        }
        "is_older_than" if args.len() == 2 => {
            let ts = as_timestamp(eval(&args[0], scope, now)?)?;
            let dur = as_duration(eval(&args[1], scope, now)?)?;
            let chrono_dur = chrono::Duration::from_std(dur).ok()?;
            Some(EV::Json(Value::Bool(now.signed_duration_since(ts) > chrono_dur)))
        }
        _ => None,
    }
}

fn as_timestamp(v: EV) -> Option<DateTime<Utc>> {
    match v {
        EV::Timestamp(dt) => Some(dt),
        EV::Json(Value::String(s)) => parse_timestamp(&s),
        _ => None,
    }
}

fn as_duration(v: EV) -> Option<StdDuration> {
    match v {
        EV::Duration(d) => Some(d),
        EV::Json(Value::String(s)) => parse_duration(&s),
        EV::Json(Value::Number(n)) => Some(StdDuration::from_secs_f64(n.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;
