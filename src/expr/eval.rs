// ABOUTME: Pure interpreter for parsed expressions
// ABOUTME: Evaluates arithmetic, string operations and list transforms with no host access

use std::cell::Cell;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::{ExprError, Result};
use super::value::{format_number, Value};

/// Bytes one evaluation may produce across all of its intermediate values
pub const MAX_OUTPUT_BYTES: usize = 4 * 1024 * 1024;

// Charged per number, boolean and list slot
const SLOT_BYTES: usize = 8;

/// Evaluate a parsed expression with an empty scope
pub fn evaluate(expr: &Expr) -> Result<Value> {
    Interpreter::default().eval(expr, &mut Scope::default())
}

/// Lambda parameter bindings, innermost last
#[derive(Debug, Default)]
struct Scope {
    bindings: Vec<(String, Value)>,
}

impl Scope {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

/// Walks the tree, charging every computed value against MAX_OUTPUT_BYTES
#[derive(Debug, Default)]
struct Interpreter {
    spent: Cell<usize>,
}

impl Interpreter {
    fn eval(&self, expr: &Expr, scope: &mut Scope) -> Result<Value> {
        let value = self.eval_uncharged(expr, scope)?;
        match expr {
            // literals are bounded by the source text
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) => Ok(value),
            _ => self.charge(value),
        }
    }

    fn charge(&self, value: Value) -> Result<Value> {
        let spent = self.spent.get().saturating_add(cost(&value));
        if spent > MAX_OUTPUT_BYTES {
            return Err(too_large());
        }
        self.spent.set(spent);
        Ok(value)
    }

    fn eval_uncharged(&self, expr: &Expr, scope: &mut Scope) -> Result<Value> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Ident(name) => scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item, scope))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                match op {
                    UnaryOp::Neg => value.as_number().map(|n| Value::Number(-n)).ok_or_else(|| {
                        ExprError::InvalidArgument {
                            expected: "a number after '-'".to_string(),
                            found: value.type_name().to_string(),
                        }
                    }),
                }
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                binary(*op, left, right)
            }
            Expr::Member { target, name } => {
                let target = self.eval(target, scope)?;
                member(target, name)
            }
            Expr::Index { target, index } => {
                let target = self.eval(target, scope)?;
                let index = self.eval(index, scope)?;
                index_into(target, index)
            }
            Expr::Call {
                target,
                method,
                args,
            } => {
                let target = self.eval(target, scope)?;
                self.call(target, method, args, scope)
            }
            Expr::Lambda { .. } => Err(ExprError::StrayLambda),
        }
    }

    fn call(&self, target: Value, method: &str, args: &[Expr], scope: &mut Scope) -> Result<Value> {
        let target = match (target, method) {
            (Value::List(items), "map") => return self.map(items, args, scope),
            (target, _) => target,
        };

        let args = args
            .iter()
            .map(|arg| self.eval(arg, scope))
            .collect::<Result<Vec<_>>>()?;

        match target {
            Value::List(items) => list_method(items, method, &args),
            Value::Str(s) => string_method(&s, method, &args),
            Value::Number(n) => number_method(n, method, &args),
            Value::Bool(_) => Err(ExprError::UnknownMethod {
                method: method.to_string(),
                kind: "boolean".to_string(),
            }),
        }
    }

    /// `list.map(item => ...)` or `list.map((item, index) => ...)`
    fn map(&self, items: Vec<Value>, args: &[Expr], scope: &mut Scope) -> Result<Value> {
        let (params, body) = match args {
            [Expr::Lambda { params, body }] => (params, body),
            [other] => {
                return Err(ExprError::InvalidArgument {
                    expected: "a function".to_string(),
                    found: describe(other).to_string(),
                })
            }
            _ => return Err(arity("map", "1", args.len())),
        };

        let mut mapped = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let depth = scope.bindings.len();
            let mut names = params.iter();
            if let Some(name) = names.next() {
                scope.bindings.push((name.clone(), item));
            }
            if let Some(name) = names.next() {
                scope.bindings.push((name.clone(), Value::Number(index as f64)));
            }
            let result = self.eval(body, scope);
            scope.bindings.truncate(depth);
            mapped.push(result?);
        }
        Ok(Value::List(mapped))
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    if op == BinaryOp::Add && (left.is_textual() || right.is_textual()) {
        within_limit(cost(&left).saturating_add(cost(&right)))?;
        return Ok(Value::Str(format!("{}{}", left, right)));
    }

    let (l, r) = match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(ExprError::TypeMismatch {
                op: op.to_string(),
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            })
        }
    };

    let result = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div | BinaryOp::Rem if r == 0.0 => return Err(ExprError::DivisionByZero),
        BinaryOp::Div => l / r,
        BinaryOp::Rem => l % r,
    };
    Ok(Value::Number(result))
}

fn member(target: Value, name: &str) -> Result<Value> {
    match (&target, name) {
        (Value::List(items), "length") => Ok(Value::Number(items.len() as f64)),
        (Value::Str(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
        _ => Err(ExprError::UnknownProperty {
            property: name.to_string(),
            kind: target.type_name().to_string(),
        }),
    }
}

fn index_into(target: Value, index: Value) -> Result<Value> {
    let raw = integer(&index, "an integer index")?;
    let mut elements = match target {
        Value::List(items) => items,
        Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
        other => {
            return Err(ExprError::InvalidArgument {
                expected: "a list or string to index".to_string(),
                found: other.type_name().to_string(),
            })
        }
    };

    let len = elements.len();
    if raw < 0 || raw as usize >= len {
        return Err(ExprError::IndexOutOfRange { index: raw, len });
    }
    Ok(elements.swap_remove(raw as usize))
}

fn list_method(items: Vec<Value>, method: &str, args: &[Value]) -> Result<Value> {
    match method {
        "join" => {
            let separator = match args {
                [] => ",".to_string(),
                [sep] => sep.to_string(),
                _ => return Err(arity(method, "0 or 1", args.len())),
            };
            let parts = items.iter().map(|item| item.to_string()).collect::<Vec<_>>();
            let total = parts
                .iter()
                .fold(0usize, |sum, part| sum.saturating_add(part.len()))
                .saturating_add(separator.len().saturating_mul(parts.len().saturating_sub(1)));
            within_limit(total)?;
            Ok(Value::Str(parts.join(&separator)))
        }
        "reverse" => {
            expect_no_args(method, args)?;
            let mut items = items;
            items.reverse();
            Ok(Value::List(items))
        }
        "slice" => {
            let len = items.len() as i64;
            let (start, end) = match args {
                [start] => (integer(start, "a slice start")?, len),
                [start, end] => (
                    integer(start, "a slice start")?,
                    integer(end, "a slice end")?,
                ),
                _ => return Err(arity(method, "1 or 2", args.len())),
            };
            let start = clamp_slice_bound(start, len);
            let end = clamp_slice_bound(end, len).max(start);
            Ok(Value::List(items[start..end].to_vec()))
        }
        _ => Err(ExprError::UnknownMethod {
            method: method.to_string(),
            kind: "list".to_string(),
        }),
    }
}

fn string_method(s: &str, method: &str, args: &[Value]) -> Result<Value> {
    match method {
        "toUpperCase" => {
            expect_no_args(method, args)?;
            Ok(Value::Str(s.to_uppercase()))
        }
        "toLowerCase" => {
            expect_no_args(method, args)?;
            Ok(Value::Str(s.to_lowercase()))
        }
        "trim" => {
            expect_no_args(method, args)?;
            Ok(Value::Str(s.trim().to_string()))
        }
        "repeat" => {
            let [count] = args else {
                return Err(arity(method, "1", args.len()));
            };
            let count = integer(count, "a repeat count")?;
            if count < 0 {
                return Err(ExprError::InvalidArgument {
                    expected: "a non-negative repeat count".to_string(),
                    found: count.to_string(),
                });
            }
            let count = usize::try_from(count).map_err(|_| too_large())?;
            within_limit(s.len().saturating_mul(count))?;
            Ok(Value::Str(s.repeat(count)))
        }
        "split" => {
            let [separator] = args else {
                return Err(arity(method, "1", args.len()));
            };
            let separator = separator.to_string();
            let pieces = if separator.is_empty() {
                s.chars().count()
            } else {
                s.matches(separator.as_str()).count() + 1
            };
            within_limit(s.len().saturating_add(pieces.saturating_mul(SLOT_BYTES)))?;
            let parts = if separator.is_empty() {
                s.chars().map(|c| Value::Str(c.to_string())).collect()
            } else {
                s.split(separator.as_str()).map(Value::from).collect()
            };
            Ok(Value::List(parts))
        }
        _ => Err(ExprError::UnknownMethod {
            method: method.to_string(),
            kind: "string".to_string(),
        }),
    }
}

fn number_method(n: f64, method: &str, args: &[Value]) -> Result<Value> {
    match method {
        "toFixed" => {
            let digits = match args {
                [] => 0,
                [digits] => integer(digits, "a digit count")?,
                _ => return Err(arity(method, "0 or 1", args.len())),
            };
            if !(0..=20).contains(&digits) {
                return Err(ExprError::InvalidArgument {
                    expected: "a digit count between 0 and 20".to_string(),
                    found: digits.to_string(),
                });
            }
            if !n.is_finite() {
                return Ok(Value::Str(format_number(n)));
            }
            Ok(Value::Str(format!("{:.*}", digits as usize, n)))
        }
        _ => Err(ExprError::UnknownMethod {
            method: method.to_string(),
            kind: "number".to_string(),
        }),
    }
}

/// Upper bound on the bytes a value holds, and on its printed length
fn cost(value: &Value) -> usize {
    match value {
        Value::Str(s) => s.len(),
        Value::Number(_) | Value::Bool(_) => SLOT_BYTES,
        Value::List(items) => items
            .iter()
            .fold(SLOT_BYTES, |sum, item| sum.saturating_add(SLOT_BYTES.saturating_add(cost(item)))),
    }
}

fn within_limit(bytes: usize) -> Result<()> {
    if bytes > MAX_OUTPUT_BYTES {
        Err(too_large())
    } else {
        Ok(())
    }
}

fn too_large() -> ExprError {
    ExprError::OutputTooLarge {
        limit: MAX_OUTPUT_BYTES,
    }
}

fn integer(value: &Value, expected: &str) -> Result<i64> {
    match value.as_number() {
        Some(n) if n.fract() == 0.0 && n.is_finite() => Ok(n as i64),
        _ => Err(ExprError::InvalidArgument {
            expected: expected.to_string(),
            found: match value {
                Value::Number(n) => format_number(*n),
                other => other.type_name().to_string(),
            },
        }),
    }
}

/// Negative bounds count from the end
fn clamp_slice_bound(bound: i64, len: i64) -> usize {
    let resolved = if bound < 0 { len + bound } else { bound };
    resolved.clamp(0, len) as usize
}

fn expect_no_args(method: &str, args: &[Value]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(arity(method, "0", args.len()))
    }
}

fn arity(method: &str, expected: &str, found: usize) -> ExprError {
    ExprError::Arity {
        method: method.to_string(),
        expected: expected.to_string(),
        found,
    }
}

fn describe(expr: &Expr) -> &'static str {
    match expr {
        Expr::Number(_) => "number",
        Expr::Str(_) => "string",
        Expr::Bool(_) => "boolean",
        Expr::List(_) => "list",
        Expr::Lambda { .. } => "function",
        _ => "expression",
    }
}
