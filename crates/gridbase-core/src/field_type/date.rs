use crate::{
    db::predicate::{DateOp, DateTarget, FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, common_test, unexpected},
    model::{DateConfig, DateFormat, Field, FieldKind, FieldTypeTag, TimeFormat},
    value::{SortKey, Value},
};
use std::sync::OnceLock;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{self, BorrowedFormatItem, well_known::Rfc3339},
};

const DATE_OPS: &[FilterOp] = &[
    FilterOp::DateEqual,
    FilterOp::DateNotEqual,
    FilterOp::DateBefore,
    FilterOp::DateAfter,
    FilterOp::Contains,
    FilterOp::ContainsNot,
    FilterOp::Empty,
    FilterOp::NotEmpty,
];

type Format = Option<Vec<BorrowedFormatItem<'static>>>;

static DAY_FORMAT: OnceLock<Format> = OnceLock::new();
static MINUTE_FORMAT: OnceLock<Format> = OnceLock::new();
static SECOND_FORMAT: OnceLock<Format> = OnceLock::new();
static EU_FORMAT: OnceLock<Format> = OnceLock::new();
static US_FORMAT: OnceLock<Format> = OnceLock::new();
static H24_FORMAT: OnceLock<Format> = OnceLock::new();
static H12_FORMAT: OnceLock<Format> = OnceLock::new();

fn format(
    cell: &'static OnceLock<Format>,
    description: &'static str,
) -> Option<&'static [BorrowedFormatItem<'static>]> {
    cell.get_or_init(|| format_description::parse(description).ok())
        .as_deref()
}

///
/// DateType
///

pub(super) struct DateType;

fn config(field: &Field) -> DateConfig {
    match &field.kind {
        FieldKind::Date(config) => *config,
        _ => DateConfig::default(),
    }
}

impl FieldType for DateType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::Date
    }

    fn column_spec(&self, field: &Field) -> ColumnSpec {
        if config(field).include_time {
            ColumnSpec::nullable(PhysicalType::Timestamp)
        } else {
            ColumnSpec::nullable(PhysicalType::Date)
        }
    }

    fn normalize(&self, field: &Field, value: Value) -> Result<Value, String> {
        let include_time = config(field).include_time;
        let target = match value {
            Value::Null => return Ok(Value::Null),
            Value::Date(day) => DateTarget::Day(day),
            Value::DateTime(at) => DateTarget::Instant(at),
            Value::Text(text) => {
                parse_date_target(&text).ok_or_else(|| format!("'{text}' is not a date"))?
            }
            other => return Err(unexpected("date", &other)),
        };

        Ok(match (target, include_time) {
            (DateTarget::Day(day), true) => Value::DateTime(day.midnight().assume_utc()),
            (DateTarget::Instant(at), true) => Value::DateTime(at.to_offset(UtcOffset::UTC)),
            (target, false) => Value::Date(target.day()),
        })
    }

    fn search_text(&self, field: &Field, value: &Value) -> Option<String> {
        render(config(field), value)
    }

    fn order_key(&self, _field: &Field, value: &Value) -> SortKey {
        match value {
            Value::Date(day) => SortKey::Date(*day),
            Value::DateTime(at) => SortKey::DateTime(*at),
            _ => SortKey::Null,
        }
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        DATE_OPS
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        compile_date_test(op, arg)
            .or_else(|| common_test(op, arg))
            .unwrap_or(ValueTest::Never)
    }
}

/// Compile one of the `date_*` operators; `None` for any other operator.
pub(crate) fn compile_date_test(op: FilterOp, arg: &str) -> Option<ValueTest> {
    let op = match op {
        FilterOp::DateEqual => DateOp::Equal,
        FilterOp::DateNotEqual => DateOp::NotEqual,
        FilterOp::DateBefore => DateOp::Before,
        FilterOp::DateAfter => DateOp::After,
        _ => return None,
    };

    Some(
        parse_date_target(arg)
            .map_or(ValueTest::Never, |target| ValueTest::Date { op, target }),
    )
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` (UTC), or RFC 3339.
pub(crate) fn parse_date_target(input: &str) -> Option<DateTarget> {
    let input = input.trim();

    if let Some(day) =
        format(&DAY_FORMAT, "[year]-[month]-[day]").and_then(|items| Date::parse(input, items).ok())
    {
        return Some(DateTarget::Day(day));
    }

    parse_timestamp(input).map(DateTarget::Instant)
}

/// Parse a timestamp with a time component; naive inputs are UTC.
fn parse_timestamp(input: &str) -> Option<OffsetDateTime> {
    let input = input.trim();

    let naive = [
        (&MINUTE_FORMAT, "[year]-[month]-[day] [hour]:[minute]"),
        (&SECOND_FORMAT, "[year]-[month]-[day] [hour]:[minute]:[second]"),
    ];
    for (cell, description) in naive {
        if let Some(at) = format(cell, description)
            .and_then(|items| PrimitiveDateTime::parse(input, items).ok())
        {
            return Some(at.assume_utc());
        }
    }

    OffsetDateTime::parse(input, &Rfc3339)
        .ok()
        .map(|at| at.to_offset(UtcOffset::UTC))
}

/// Render a date cell the way the field displays it (UTC).
pub(super) fn render(config: DateConfig, value: &Value) -> Option<String> {
    let (day, time) = match value {
        Value::Date(day) => (*day, None),
        Value::DateTime(at) => {
            let at = at.to_offset(UtcOffset::UTC);
            (at.date(), config.include_time.then(|| at.time()))
        }
        _ => return None,
    };

    let day_items = match config.format {
        DateFormat::Eu => format(&EU_FORMAT, "[day]/[month]/[year]"),
        DateFormat::Us => format(&US_FORMAT, "[month]/[day]/[year]"),
        DateFormat::Iso => format(&DAY_FORMAT, "[year]-[month]-[day]"),
    }?;
    let mut text = day.format(day_items).ok()?;

    if let Some(time) = time {
        let time_items = match config.time_format {
            TimeFormat::H24 => format(&H24_FORMAT, "[hour]:[minute]"),
            TimeFormat::H12 => format(&H12_FORMAT, "[hour repr:12]:[minute] [period]"),
        }?;
        text.push(' ');
        text.push_str(&time.format(time_items).ok()?);
    }

    Some(text)
}
