//! Module: formula
//! Responsibility: parse and evaluate the formula expression language used
//! by computed fields.
//! Does not own: when formulas run (row write hooks) or how results are
//! stored (field type normalization).

mod eval;
mod parser;

#[cfg(test)]
mod tests;

use crate::{
    model::FormulaResultType,
    types::RowId,
    value::Value,
};
use parser::{Expr, Function};
use thiserror::Error as ThisError;

pub use eval::coerce;

///
/// FormulaError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum FormulaError {
    #[error("unexpected character '{found}' at position {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { pos: usize, found: String },

    #[error("unexpected end of formula at position {pos}")]
    UnexpectedEnd { pos: usize },

    #[error("unterminated text literal starting at position {pos}")]
    UnterminatedText { pos: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unknown function '{name}' at position {pos}")]
    UnknownFunction { pos: usize, name: String },

    #[error("function '{function}' does not accept {found} argument(s)")]
    Arity {
        function: &'static str,
        found: usize,
    },

    #[error("field() expects a quoted field name")]
    FieldNameNotLiteral,

    #[error("field '{0}' does not exist")]
    UnknownField(String),

    #[error("operator '{op}' cannot be applied to {found}")]
    TypeMismatch { op: char, found: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow in '{0}'")]
    Overflow(char),

    #[error("cannot convert {found} to {target}")]
    Conversion {
        found: &'static str,
        target: &'static str,
    },
}

///
/// EvalContext
///
/// Row state a formula reads. Field values arrive already rendered to the
/// scalar a formula can work with (select options as their text).
///

pub trait EvalContext {
    fn row_id(&self) -> RowId;

    /// Current value of the field named `name`; `None` when no such field.
    fn field_value(&self, name: &str) -> Option<Value>;
}

///
/// Formula
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            source: source.to_string(),
            expr: parser::parse(source)?,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the result depends on the row's identifier, which only exists
    /// once the row has been inserted.
    #[must_use]
    pub fn references_row_id(&self) -> bool {
        fn walk(expr: &Expr) -> bool {
            match expr {
                Expr::Number(_) | Expr::Text(_) => false,
                Expr::Neg(inner) => walk(inner),
                Expr::Binary { left, right, .. } => walk(left) || walk(right),
                Expr::Call { function, args } => {
                    *function == Function::RowId || args.iter().any(walk)
                }
            }
        }

        walk(&self.expr)
    }

    /// Names passed to `field(...)`, in source order.
    #[must_use]
    pub fn referenced_fields(&self) -> Vec<&str> {
        fn walk<'a>(expr: &'a Expr, out: &mut Vec<&'a str>) {
            match expr {
                Expr::Number(_) | Expr::Text(_) => {}
                Expr::Neg(inner) => walk(inner, out),
                Expr::Binary { left, right, .. } => {
                    walk(left, out);
                    walk(right, out);
                }
                Expr::Call {
                    function: Function::Field,
                    args,
                } => {
                    if let Some(Expr::Text(name)) = args.first() {
                        out.push(name);
                    }
                }
                Expr::Call { args, .. } => {
                    for arg in args {
                        walk(arg, out);
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.expr, &mut out);

        out
    }

    /// Evaluate and coerce the result into the declared result type.
    pub fn evaluate(
        &self,
        ctx: &dyn EvalContext,
        result: FormulaResultType,
    ) -> Result<Value, FormulaError> {
        let value = eval::eval(&self.expr, ctx)?;

        coerce(value, result)
    }
}
