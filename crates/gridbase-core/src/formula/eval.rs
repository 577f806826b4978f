use crate::{
    db::predicate::DateTarget,
    field_type::{parse_date_target, parse_flag},
    formula::{
        EvalContext, FormulaError,
        parser::{BinaryOp, Expr, Function},
    },
    model::FormulaResultType,
    value::{Value, round_decimal},
};
use rust_decimal::Decimal;
use std::str::FromStr;
use time::UtcOffset;

pub(super) fn eval(expr: &Expr, ctx: &dyn EvalContext) -> Result<Value, FormulaError> {
    match expr {
        Expr::Number(number) => Ok(Value::Number(*number)),
        Expr::Text(text) => Ok(Value::Text(text.clone())),
        Expr::Neg(inner) => match eval(inner, ctx)? {
            Value::Null => Ok(Value::Null),
            Value::Number(number) => Ok(Value::Number(-number)),
            other => Err(FormulaError::TypeMismatch {
                op: '-',
                found: other.label(),
            }),
        },
        Expr::Binary { op, left, right } => {
            let left = eval(left, ctx)?;
            let right = eval(right, ctx)?;
            arithmetic(*op, &left, &right)
        }
        Expr::Call { function, args } => call(*function, args, ctx),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, FormulaError> {
    let (left, right) = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(Value::Null),
        (Value::Number(left), Value::Number(right)) => (*left, *right),
        (Value::Number(_), other) | (other, _) => {
            return Err(FormulaError::TypeMismatch {
                op: op.symbol(),
                found: other.label(),
            });
        }
    };

    let result = match op {
        BinaryOp::Add => left.checked_add(right),
        BinaryOp::Sub => left.checked_sub(right),
        BinaryOp::Mul => left.checked_mul(right),
        BinaryOp::Div => {
            if right.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            left.checked_div(right)
        }
    };

    result
        .map(Value::Number)
        .ok_or(FormulaError::Overflow(op.symbol()))
}

fn call(function: Function, args: &[Expr], ctx: &dyn EvalContext) -> Result<Value, FormulaError> {
    match function {
        Function::RowId => Ok(Value::Number(Decimal::from(ctx.row_id().get()))),
        Function::Field => {
            let Some(Expr::Text(name)) = args.first() else {
                return Err(FormulaError::FieldNameNotLiteral);
            };
            ctx.field_value(name)
                .ok_or_else(|| FormulaError::UnknownField(name.clone()))
        }
        Function::Concat => {
            let mut text = String::new();
            for arg in args {
                text.push_str(&render_text(&eval(arg, ctx)?)?);
            }
            Ok(Value::Text(text))
        }
        Function::Upper | Function::Lower | Function::ToText => {
            let Some(arg) = args.first() else {
                return Err(FormulaError::Arity {
                    function: function.name(),
                    found: 0,
                });
            };
            let value = eval(arg, ctx)?;
            if value.is_null() {
                return Ok(Value::Null);
            }
            let text = render_text(&value)?;

            Ok(Value::Text(match function {
                Function::Upper => text.to_uppercase(),
                Function::Lower => text.to_lowercase(),
                _ => text,
            }))
        }
    }
}

/// Text form of a scalar inside formulas.
pub(super) fn render_text(value: &Value) -> Result<String, FormulaError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Text(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.normalize().to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Date(day) => Ok(iso_date(*day)),
        Value::DateTime(at) => {
            let at = at.to_offset(UtcOffset::UTC);
            Ok(format!(
                "{} {:02}:{:02}",
                iso_date(at.date()),
                at.hour(),
                at.minute()
            ))
        }
        other => Err(FormulaError::Conversion {
            found: other.label(),
            target: "text",
        }),
    }
}

fn iso_date(day: time::Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}

/// Convert a raw formula result into the declared result type.
pub fn coerce(value: Value, result: FormulaResultType) -> Result<Value, FormulaError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let conversion = |target: &'static str, value: &Value| FormulaError::Conversion {
        found: value.label(),
        target,
    };

    match result {
        FormulaResultType::Text => render_text(&value).map(Value::Text),
        FormulaResultType::Number(config) => match &value {
            Value::Number(number) => Ok(*number),
            Value::Text(text) => {
                Decimal::from_str(text.trim()).map_err(|_| conversion("number", &value))
            }
            _ => Err(conversion("number", &value)),
        }
        .map(|number| Value::Number(round_decimal(number, config.decimal_places))),
        FormulaResultType::Boolean => match &value {
            Value::Bool(_) => Ok(value),
            Value::Number(number) => Ok(Value::Bool(!number.is_zero())),
            Value::Text(text) => parse_flag(text)
                .map(Value::Bool)
                .ok_or_else(|| conversion("boolean", &value)),
            _ => Err(conversion("boolean", &value)),
        },
        FormulaResultType::Date(_) => match &value {
            Value::Date(_) | Value::DateTime(_) => Ok(value),
            Value::Text(text) => match parse_date_target(text) {
                Some(DateTarget::Day(day)) => Ok(Value::Date(day)),
                Some(DateTarget::Instant(at)) => Ok(Value::DateTime(at)),
                None => Err(conversion("date", &value)),
            },
            _ => Err(conversion("date", &value)),
        },
    }
}
