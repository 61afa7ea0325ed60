/// Expression evaluator - evaluates expressions against records
use super::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::error::{Error, Result};
use crate::types::{Record, Value};

/// Current timestamp in the `YYYY-MM-DD HH:MM:SS` text form records carry.
/// Plain string comparison then orders timestamps correctly, which is what
/// `start_date > datetime('now')` relies on.
pub fn now_text() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Evaluates expressions against a record with a bound positional-parameter
/// list. Missing columns read as Null rather than erroring; records in the
/// same table routinely have different column sets.
pub struct ExprEvaluator<'a> {
    params: &'a [Value],
}

impl<'a> ExprEvaluator<'a> {
    pub fn new(params: &'a [Value]) -> Self {
        Self { params }
    }

    /// WHERE-clause view of an expression: evaluate and take truthiness.
    /// A Null result (comparison against a missing column, say) is false.
    pub fn matches(&self, expr: &Expr, record: &Record) -> Result<bool> {
        Ok(self.eval(expr, record)?.is_truthy())
    }

    pub fn eval(&self, expr: &Expr, record: &Record) -> Result<Value> {
        match expr {
            Expr::Column(name) => Ok(record.get(name).cloned().unwrap_or(Value::Null)),

            Expr::Literal(value) => Ok(value.clone()),

            Expr::Param(ordinal) => self.params.get(*ordinal).cloned().ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "statement references parameter {} but only {} were bound",
                    ordinal + 1,
                    self.params.len()
                ))
            }),

            Expr::BinaryOp { left, op, right } => self.eval_binary(left, *op, right, record),

            Expr::UnaryOp { op, expr } => {
                let value = self.eval(expr, record)?;
                match op {
                    UnaryOperator::Not => {
                        if value.is_null() {
                            Ok(Value::Null)
                        } else {
                            Ok(Value::Bool(!value.is_truthy()))
                        }
                    }
                    UnaryOperator::Minus => match value {
                        Value::Integer(i) => Ok(Value::Integer(-i)),
                        Value::Float(f) => Ok(Value::Float(-f)),
                        other => Err(Error::Type(format!(
                            "cannot negate a {} value",
                            other.type_name()
                        ))),
                    },
                    UnaryOperator::Plus => Ok(value),
                }
            }

            Expr::Like {
                expr,
                pattern,
                negated,
            } => {
                let value = self.eval(expr, record)?;
                let pattern = self.eval(pattern, record)?;
                match (&value, &pattern) {
                    (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
                    _ => {
                        let matched = like_match(&value.to_string(), &pattern.to_string());
                        Ok(Value::Bool(matched != *negated))
                    }
                }
            }

            Expr::IsNull { expr, negated } => {
                let is_null = self.eval(expr, record)?.is_null();
                Ok(Value::Bool(is_null != *negated))
            }

            Expr::FunctionCall { name, args } => self.eval_function(name, args, record),
        }
    }

    fn eval_binary(
        &self,
        left: &Expr,
        op: BinaryOperator,
        right: &Expr,
        record: &Record,
    ) -> Result<Value> {
        // Logical operators short-circuit on truthiness
        if op == BinaryOperator::And {
            return Ok(Value::Bool(
                self.matches(left, record)? && self.matches(right, record)?,
            ));
        }
        if op == BinaryOperator::Or {
            return Ok(Value::Bool(
                self.matches(left, record)? || self.matches(right, record)?,
            ));
        }

        let lhs = self.eval(left, record)?;
        let rhs = self.eval(right, record)?;

        match op {
            BinaryOperator::Eq | BinaryOperator::Ne => {
                if lhs.is_null() || rhs.is_null() {
                    return Ok(Value::Null);
                }
                let eq = lhs.loosely_eq(&rhs);
                Ok(Value::Bool(if op == BinaryOperator::Eq { eq } else { !eq }))
            }

            BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::Le | BinaryOperator::Ge => {
                if lhs.is_null() || rhs.is_null() {
                    return Ok(Value::Null);
                }
                match lhs.loosely_cmp(&rhs) {
                    Some(ordering) => {
                        let result = match op {
                            BinaryOperator::Lt => ordering.is_lt(),
                            BinaryOperator::Gt => ordering.is_gt(),
                            BinaryOperator::Le => ordering.is_le(),
                            _ => ordering.is_ge(),
                        };
                        Ok(Value::Bool(result))
                    }
                    // Incomparable types (text vs bool, say) compare false
                    None => Ok(Value::Bool(false)),
                }
            }

            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Mod => self.eval_arithmetic(lhs, op, rhs),

            BinaryOperator::And | BinaryOperator::Or => unreachable!("handled above"),
        }
    }

    fn eval_arithmetic(&self, lhs: Value, op: BinaryOperator, rhs: Value) -> Result<Value> {
        if lhs.is_null() || rhs.is_null() {
            return Ok(Value::Null);
        }

        // Integer pairs stay integral, anything else goes through f64
        if let (Value::Integer(a), Value::Integer(b)) = (&lhs, &rhs) {
            let (a, b) = (*a, *b);
            let result = match op {
                BinaryOperator::Add => a.wrapping_add(b),
                BinaryOperator::Sub => a.wrapping_sub(b),
                BinaryOperator::Mul => a.wrapping_mul(b),
                BinaryOperator::Div => {
                    if b == 0 {
                        return Err(Error::DivisionByZero);
                    }
                    a / b
                }
                BinaryOperator::Mod => {
                    if b == 0 {
                        return Err(Error::DivisionByZero);
                    }
                    a % b
                }
                _ => unreachable!("arithmetic operator"),
            };
            return Ok(Value::Integer(result));
        }

        let a = lhs.as_f64().ok_or_else(|| {
            Error::Type(format!("cannot use a {} value in arithmetic", lhs.type_name()))
        })?;
        let b = rhs.as_f64().ok_or_else(|| {
            Error::Type(format!("cannot use a {} value in arithmetic", rhs.type_name()))
        })?;

        let result = match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            BinaryOperator::Div => {
                if b == 0.0 {
                    return Err(Error::DivisionByZero);
                }
                a / b
            }
            BinaryOperator::Mod => {
                if b == 0.0 {
                    return Err(Error::DivisionByZero);
                }
                a % b
            }
            _ => unreachable!("arithmetic operator"),
        };
        Ok(Value::Float(result))
    }

    fn eval_function(&self, name: &str, args: &[Expr], record: &Record) -> Result<Value> {
        match name.to_ascii_lowercase().as_str() {
            "datetime" => {
                let arg = match args {
                    [single] => self.eval(single, record)?,
                    _ => {
                        return Err(Error::InvalidArgument(
                            "datetime() takes exactly one argument".to_string(),
                        ))
                    }
                };
                match arg {
                    Value::Text(ref s) if s.eq_ignore_ascii_case("now") => {
                        Ok(Value::Text(now_text()))
                    }
                    other => Err(Error::InvalidArgument(format!(
                        "datetime() supports only 'now', got {}",
                        other
                    ))),
                }
            }
            _ => Err(Error::UnknownFunction(name.to_string())),
        }
    }
}

/// SQL LIKE matching with `%` (any run) and `_` (any single char),
/// case-insensitive over ASCII.
///
/// Iterative two-pointer scan: on a mismatch past a `%`, rewind to just after
/// the most recent `%` and let it absorb one more character. O(n*m) time,
/// constant stack, so arbitrarily long column values are safe to match.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_ascii_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_ascii_lowercase().chars().collect();

    let mut ti = 0;
    let mut pi = 0;
    // Resume point for the last `%` seen: (pattern index after it, text index
    // of the next character it should swallow)
    let mut resume: Option<(usize, usize)> = None;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '_' || pattern[pi] == text[ti]) {
            ti += 1;
            pi += 1;
        } else if pi < pattern.len() && pattern[pi] == '%' {
            resume = Some((pi + 1, ti));
            pi += 1;
        } else if let Some((resume_pi, resume_ti)) = resume {
            pi = resume_pi;
            ti = resume_ti + 1;
            resume = Some((resume_pi, resume_ti + 1));
        } else {
            return false;
        }
    }

    // Only trailing `%` may remain unconsumed
    while pi < pattern.len() && pattern[pi] == '%' {
        pi += 1;
    }
    pi == pattern.len()
}
