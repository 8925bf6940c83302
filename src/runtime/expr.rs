//! Script expressions
//!
//! Content may embed small scripts (Control Variables "script" operand,
//! Conditional Branch "script" condition, the Script command). They go through
//! the [`ExpressionEvaluator`] trait. The bundled [`SandboxEvaluator`] accepts a
//! deliberately small grammar that can only read and write game state:
//!
//! ```text
//! stmt   := target '=' expr | expr
//! target := 'v' '[' expr ']' | 's' '[' expr ']'
//! expr   := or
//! or     := and ('||' and)*
//! and    := eq ('&&' eq)*
//! eq     := cmp (('==' | '!=') cmp)*
//! cmp    := add (('<' | '<=' | '>' | '>=') add)*
//! add    := mul (('+' | '-') mul)*
//! mul    := unary (('*' | '/' | '%') unary)*
//! unary  := ('-' | '!') unary | atom
//! atom   := number | string | 'true' | 'false' | 'gold'
//!         | 'v' '[' expr ']' | 's' '[' expr ']' | '(' expr ')'
//! ```
//!
//! Statements are separated by `;` or newlines.

use crate::runtime::state::GameState;
use crate::runtime::value::Value;
use thiserror::Error;

/// Evaluation errors. Callers coerce these to a neutral value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Syntax error at {pos}: {message}")]
    Syntax { pos: usize, message: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Type error: {0}")]
    Type(String),

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Pluggable script evaluator
pub trait ExpressionEvaluator {
    /// Evaluate a single expression against read-only state
    fn evaluate(
        &self,
        expr: &str,
        state: &GameState,
    ) -> EvalResult<Value>;

    /// Run a script of statements that may assign to variables and switches
    fn execute(
        &self,
        script: &str,
        state: &mut GameState,
    ) -> EvalResult<()>;
}

/// Evaluator restricted to the grammar in the module docs
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxEvaluator;

impl ExpressionEvaluator for SandboxEvaluator {
    fn evaluate(
        &self,
        expr: &str,
        state: &GameState,
    ) -> EvalResult<Value> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser::new(tokens);
        let ast = parser.expression()?;
        parser.expect_end()?;
        eval(&ast, state)
    }

    fn execute(
        &self,
        script: &str,
        state: &mut GameState,
    ) -> EvalResult<()> {
        let tokens = tokenize(script)?;
        let mut parser = Parser::new(tokens);
        let statements = parser.statements()?;
        for stmt in &statements {
            match stmt {
                Stmt::Assign { target, value } => {
                    let value = eval(value, state)?;
                    match target {
                        Target::Variable(index) => {
                            let id = eval(index, state)?.as_int();
                            state.variables.set_value(id, value);
                        }
                        Target::Switch(index) => {
                            let id = eval(index, state)?.as_int();
                            state.switches.set_value(id, value.as_bool());
                        }
                    }
                }
                Stmt::Expr(expr) => {
                    eval(expr, state)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LBracket,
    RBracket,
    LParen,
    RParen,
    Separator,
}

const OPERATORS: &[&str] = &[
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "!", "=",
];

fn tokenize(source: &str) -> EvalResult<Vec<(usize, Token)>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        match c {
            ' ' | '\t' | '\r' => i += 1,
            '\n' | ';' => {
                tokens.push((start, Token::Separator));
                i += 1;
            }
            '[' => {
                tokens.push((start, Token::LBracket));
                i += 1;
            }
            ']' => {
                tokens.push((start, Token::RBracket));
                i += 1;
            }
            '(' => {
                tokens.push((start, Token::LParen));
                i += 1;
            }
            ')' => {
                tokens.push((start, Token::RParen));
                i += 1;
            }
            '"' | '\'' => {
                let quote = c;
                i += 1;
                let mut text = String::new();
                while i < chars.len() && chars[i] != quote {
                    text.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(EvalError::Syntax {
                        pos: start,
                        message: "unterminated string".to_string(),
                    });
                }
                i += 1;
                tokens.push((start, Token::Str(text)));
            }
            c if c.is_ascii_digit() => {
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let token = if text.contains('.') {
                    text.parse().map(Token::Float).map_err(|_| EvalError::Syntax {
                        pos: start,
                        message: format!("bad number '{}'", text),
                    })?
                } else {
                    text.parse().map(Token::Int).map_err(|_| EvalError::Syntax {
                        pos: start,
                        message: format!("bad number '{}'", text),
                    })?
                };
                tokens.push((start, token));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
            }
            _ => {
                let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let op: &'static str = *OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .ok_or_else(|| EvalError::Syntax {
                        pos: start,
                        message: format!("unexpected character '{}'", c),
                    })?;
                tokens.push((start, Token::Op(op)));
                i += op.len();
            }
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(Value),
    Variable(Box<Expr>),
    Switch(Box<Expr>),
    Gold,
    Unary(&'static str, Box<Expr>),
    Binary(&'static str, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Variable(Expr),
    Switch(Expr),
}

#[derive(Debug, Clone, PartialEq)]
enum Stmt {
    Assign { target: Target, value: Expr },
    Expr(Expr),
}

/// Binding power of binary operators
fn precedence(op: &str) -> Option<u8> {
    match op {
        "||" => Some(1),
        "&&" => Some(2),
        "==" | "!=" => Some(3),
        "<" | "<=" | ">" | ">=" => Some(4),
        "+" | "-" => Some(5),
        "*" | "/" | "%" => Some(6),
        _ => None,
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(usize, Token)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(p, _)| *p)
            .unwrap_or_else(|| self.tokens.last().map(|(p, _)| p + 1).unwrap_or(0))
    }

    fn error(
        &self,
        message: &str,
    ) -> EvalError {
        EvalError::Syntax {
            pos: self.offset(),
            message: message.to_string(),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        token
    }

    fn expect(
        &mut self,
        token: Token,
    ) -> EvalResult<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", token)))
        }
    }

    fn expect_end(&self) -> EvalResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("trailing input")),
        }
    }

    fn statements(&mut self) -> EvalResult<Vec<Stmt>> {
        let mut out = Vec::new();
        loop {
            while self.peek() == Some(&Token::Separator) {
                self.pos += 1;
            }
            if self.peek().is_none() {
                return Ok(out);
            }
            out.push(self.statement()?);
            match self.peek() {
                None | Some(Token::Separator) => {}
                Some(_) => return Err(self.error("expected end of statement")),
            }
        }
    }

    fn statement(&mut self) -> EvalResult<Stmt> {
        let expr = self.expression()?;
        if self.peek() == Some(&Token::Op("=")) {
            self.pos += 1;
            let value = self.expression()?;
            let target = match expr {
                Expr::Variable(index) => Target::Variable(*index),
                Expr::Switch(index) => Target::Switch(*index),
                _ => return Err(self.error("invalid assignment target")),
            };
            return Ok(Stmt::Assign { target, value });
        }
        Ok(Stmt::Expr(expr))
    }

    fn expression(&mut self) -> EvalResult<Expr> {
        self.binary(1)
    }

    fn binary(
        &mut self,
        min_prec: u8,
    ) -> EvalResult<Expr> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            let Some(prec) = precedence(op) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(prec + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> EvalResult<Expr> {
        match self.peek() {
            Some(Token::Op("-")) => {
                self.pos += 1;
                Ok(Expr::Unary("-", Box::new(self.unary()?)))
            }
            Some(Token::Op("!")) => {
                self.pos += 1;
                Ok(Expr::Unary("!", Box::new(self.unary()?)))
            }
            _ => self.atom(),
        }
    }

    fn indexed(&mut self) -> EvalResult<Expr> {
        self.expect(Token::LBracket)?;
        let index = self.expression()?;
        self.expect(Token::RBracket)?;
        Ok(index)
    }

    fn atom(&mut self) -> EvalResult<Expr> {
        let offset = self.offset();
        match self.next() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "gold" => Ok(Expr::Gold),
                "v" => Ok(Expr::Variable(Box::new(self.indexed()?))),
                "s" => Ok(Expr::Switch(Box::new(self.indexed()?))),
                _ => Err(EvalError::UnknownIdentifier(name)),
            },
            _ => Err(EvalError::Syntax {
                pos: offset,
                message: "expected expression".to_string(),
            }),
        }
    }
}

fn eval(
    expr: &Expr,
    state: &GameState,
) -> EvalResult<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Variable(index) => Ok(state.variables.value(eval(index, state)?.as_int())),
        Expr::Switch(index) => Ok(Value::Bool(
            state.switches.value(eval(index, state)?.as_int()),
        )),
        Expr::Gold => Ok(Value::Int(state.party.gold)),
        Expr::Unary(op, inner) => {
            let v = eval(inner, state)?;
            match *op {
                "!" => Ok(Value::Bool(!v.as_bool())),
                _ => match v {
                    Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
                    Value::Float(f) => Ok(Value::Float(-f)),
                    other => Err(EvalError::Type(format!("cannot negate {}", other))),
                },
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            // 短路求值
            if *op == "&&" {
                let l = eval(lhs, state)?;
                return if l.as_bool() { eval(rhs, state) } else { Ok(l) };
            }
            if *op == "||" {
                let l = eval(lhs, state)?;
                return if l.as_bool() { Ok(l) } else { eval(rhs, state) };
            }
            let l = eval(lhs, state)?;
            let r = eval(rhs, state)?;
            binary(op, l, r)
        }
    }
}

fn binary(
    op: &str,
    l: Value,
    r: Value,
) -> EvalResult<Value> {
    match (op, &l, &r) {
        ("+", Value::Str(a), _) => return Ok(Value::Str(format!("{}{}", a, r))),
        ("+", _, Value::Str(b)) => return Ok(Value::Str(format!("{}{}", l, b))),
        ("==", _, _) => return Ok(Value::Bool(loose_eq(&l, &r))),
        ("!=", _, _) => return Ok(Value::Bool(!loose_eq(&l, &r))),
        _ => {}
    }
    if let (Value::Str(a), Value::Str(b)) = (&l, &r) {
        return match op {
            "<" => Ok(Value::Bool(a < b)),
            "<=" => Ok(Value::Bool(a <= b)),
            ">" => Ok(Value::Bool(a > b)),
            ">=" => Ok(Value::Bool(a >= b)),
            _ => Err(EvalError::Type(format!("'{}' on strings", op))),
        };
    }
    if !is_numeric(&l) || !is_numeric(&r) {
        return Err(EvalError::Type(format!("'{}' on {} and {}", op, l, r)));
    }
    if let (Value::Int(a), Value::Int(b)) = (&l, &r) {
        let (a, b) = (*a, *b);
        return match op {
            "+" => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
            "-" => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
            "*" => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
            "/" if b == 0 => Err(EvalError::DivisionByZero),
            "/" => match (a.checked_rem(b), a.checked_div(b)) {
                (Some(0), Some(q)) => Ok(Value::Int(q)),
                (Some(_), Some(_)) => Ok(Value::Float(a as f64 / b as f64)),
                _ => Err(overflow()),
            },
            "%" if b == 0 => Err(EvalError::DivisionByZero),
            "%" => a.checked_rem(b).map(Value::Int).ok_or_else(overflow),
            "<" => Ok(Value::Bool(a < b)),
            "<=" => Ok(Value::Bool(a <= b)),
            ">" => Ok(Value::Bool(a > b)),
            ">=" => Ok(Value::Bool(a >= b)),
            _ => Err(EvalError::Type(format!("unknown operator '{}'", op))),
        };
    }
    let (a, b) = (l.as_float(), r.as_float());
    match op {
        "+" => Ok(Value::Float(a + b)),
        "-" => Ok(Value::Float(a - b)),
        "*" => Ok(Value::Float(a * b)),
        "/" | "%" if b == 0.0 => Err(EvalError::DivisionByZero),
        "/" => Ok(Value::Float(a / b)),
        "%" => Ok(Value::Float(a % b)),
        "<" => Ok(Value::Bool(a < b)),
        "<=" => Ok(Value::Bool(a <= b)),
        ">" => Ok(Value::Bool(a > b)),
        ">=" => Ok(Value::Bool(a >= b)),
        _ => Err(EvalError::Type(format!("unknown operator '{}'", op))),
    }
}

fn overflow() -> EvalError {
    EvalError::Type("integer overflow".to_string())
}

fn is_numeric(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::Float(_) | Value::Bool(_))
}

fn loose_eq(
    l: &Value,
    r: &Value,
) -> bool {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (a, b) if is_numeric(a) && is_numeric(b) => a.as_float() == b.as_float(),
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        let mut state = GameState::new();
        state.variables.set_value(1, Value::Int(5));
        state.variables.set_value(2, Value::Int(3));
        state.switches.set_value(4, true);
        state.party.gold = 250;
        state
    }

    #[test]
    fn test_precedence() {
        let ev = SandboxEvaluator;
        let st = state();
        assert_eq!(ev.evaluate("1 + 2 * 3", &st).unwrap(), Value::Int(7));
        assert_eq!(ev.evaluate("(1 + 2) * 3", &st).unwrap(), Value::Int(9));
        assert_eq!(ev.evaluate("-v[1] + 10", &st).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_state_access() {
        let ev = SandboxEvaluator;
        let st = state();
        assert_eq!(ev.evaluate("v[1] * v[2]", &st).unwrap(), Value::Int(15));
        assert_eq!(ev.evaluate("s[4] && gold >= 200", &st).unwrap(), Value::Bool(true));
        assert_eq!(ev.evaluate("v[v[2] - 2]", &st).unwrap(), Value::Int(5));
        assert_eq!(ev.evaluate("!s[9]", &st).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_division_by_zero_is_error() {
        let ev = SandboxEvaluator;
        let st = state();
        assert_eq!(ev.evaluate("v[1] / 0", &st), Err(EvalError::DivisionByZero));
        assert_eq!(ev.evaluate("v[1] % 0", &st), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_integer_overflow_is_error() {
        let ev = SandboxEvaluator;
        let st = state();
        let overflow = Err(EvalError::Type("integer overflow".to_string()));
        assert_eq!(ev.evaluate("(-9223372036854775807 - 1) / -1", &st), overflow);
        assert_eq!(ev.evaluate("(-9223372036854775807 - 1) % -1", &st), overflow);
        assert_eq!(ev.evaluate("9223372036854775807 + 1", &st), overflow);
        assert_eq!(ev.evaluate("-9223372036854775807 - 2", &st), overflow);
        assert_eq!(ev.evaluate("9223372036854775807 * 2", &st), overflow);
        assert_eq!(ev.evaluate("-(-9223372036854775807 - 1)", &st), overflow);
        assert_eq!(ev.evaluate("-9 / 3", &st).unwrap(), Value::Int(-3));
    }

    #[test]
    fn test_rejects_host_language() {
        let ev = SandboxEvaluator;
        let st = state();
        assert!(ev.evaluate("$gameParty.gainGold(1)", &st).is_err());
        assert!(matches!(
            ev.evaluate("window", &st),
            Err(EvalError::UnknownIdentifier(_))
        ));
        assert!(ev.evaluate("1 +", &st).is_err());
    }

    #[test]
    fn test_execute_assignments() {
        let ev = SandboxEvaluator;
        let mut st = state();
        ev.execute("v[10] = v[1] + 1; s[2] = v[10] == 6\nv[11] = 'name'", &mut st)
            .unwrap();
        assert_eq!(st.variables.int(10), 6);
        assert!(st.switches.value(2));
        assert_eq!(st.variables.value(11), Value::from("name"));
        assert!(ev.execute("gold = 5", &mut st).is_err());
    }

    #[test]
    fn test_string_concat_and_compare() {
        let ev = SandboxEvaluator;
        let st = state();
        assert_eq!(ev.evaluate("'a' + 1", &st).unwrap(), Value::from("a1"));
        assert_eq!(ev.evaluate("'abc' == 'abc'", &st).unwrap(), Value::Bool(true));
        assert_eq!(ev.evaluate("7 / 2", &st).unwrap(), Value::Float(3.5));
    }
}
