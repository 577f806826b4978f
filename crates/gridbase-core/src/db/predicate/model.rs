use crate::{
    schema::SystemColumn,
    types::{FieldId, OptionId, RowId},
    value::{Value, casefold},
};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use time::{Date, OffsetDateTime, UtcOffset};

///
/// Predicate
///
/// Row restriction built by search and filtering. Pure data: two builds from
/// the same schema and inputs compare equal and share a fingerprint.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Test { column: ColumnKey, test: ValueTest },
    /// The row's own identifier equals the given id.
    RowIdEq(RowId),
}

impl Predicate {
    /// Conjunction that drops `True` operands and collapses on `False`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, other) | (other, Self::True) => other,
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Combine children with AND, simplifying the trivial shapes.
    #[must_use]
    pub fn all(children: Vec<Self>) -> Self {
        match children.len() {
            0 => Self::True,
            1 => children.into_iter().next().unwrap_or(Self::True),
            _ => Self::And(children),
        }
    }

    /// Combine children with OR, simplifying the trivial shapes.
    #[must_use]
    pub fn any(children: Vec<Self>) -> Self {
        match children.len() {
            0 => Self::False,
            1 => children.into_iter().next().unwrap_or(Self::False),
            _ => Self::Or(children),
        }
    }

    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }
}

///
/// ColumnKey
/// Column a test reads: a user field by stable id, or a system column.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ColumnKey {
    Field(FieldId),
    System(SystemColumn),
}

///
/// ValueTest
///
/// One compiled operator applied to one cell. Argument parsing happens when
/// the test is compiled; a test never fails at evaluation time.
///
/// Negative tests (`NotEquals`, `ContainsNot`, `LacksOption`, date
/// `NotEqual`) match empty cells.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValueTest {
    Always,
    Never,
    Empty,
    NotEmpty,
    Equals(Value),
    NotEquals(Value),
    HigherThan(Decimal),
    LowerThan(Decimal),
    /// Case-folded needle tested against the column's search text.
    Contains(String),
    ContainsNot(String),
    LengthBelow(usize),
    Flag(bool),
    Date { op: DateOp, target: DateTarget },
    HasOption(OptionId),
    LacksOption(OptionId),
    /// Case-folded needle tested against each file's visible name.
    FilenameContains(String),
}

impl ValueTest {
    /// Evaluate against one cell. `render` yields the cell's search text and
    /// is only called by the containment tests.
    pub fn matches(&self, value: &Value, render: impl FnOnce() -> Option<String>) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Empty => value.is_empty(),
            Self::NotEmpty => !value.is_empty(),
            Self::Equals(expected) => value == expected,
            Self::NotEquals(expected) => value != expected,
            Self::HigherThan(bound) => value.as_number().is_some_and(|number| number > *bound),
            Self::LowerThan(bound) => value.as_number().is_some_and(|number| number < *bound),
            Self::Contains(needle) => contains_folded(render(), needle),
            Self::ContainsNot(needle) => !contains_folded(render(), needle),
            Self::LengthBelow(limit) => {
                value.as_text().map_or(0, |text| text.chars().count()) < *limit
            }
            Self::Flag(expected) => value.as_bool().unwrap_or(false) == *expected,
            Self::Date { op, target } => op.matches(value, *target),
            Self::HasOption(id) => has_option(value, *id),
            Self::LacksOption(id) => !has_option(value, *id),
            Self::FilenameContains(needle) => match value {
                Value::Files(files) => files
                    .iter()
                    .any(|file| casefold(&file.visible_name).contains(needle.as_str())),
                _ => false,
            },
        }
    }
}

fn contains_folded(text: Option<String>, needle: &str) -> bool {
    text.is_some_and(|text| casefold(&text).contains(needle))
}

fn has_option(value: &Value, id: OptionId) -> bool {
    match value {
        Value::SelectOption(selected) => *selected == id,
        Value::SelectOptions(selected) => selected.contains(&id),
        _ => false,
    }
}

///
/// DateOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DateOp {
    Equal,
    NotEqual,
    Before,
    After,
}

impl DateOp {
    fn matches(self, value: &Value, target: DateTarget) -> bool {
        let Some(ordering) = compare_date(self, value, target) else {
            return matches!(self, Self::NotEqual);
        };

        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Before => ordering == Ordering::Less,
            Self::After => ordering == Ordering::Greater,
        }
    }
}

// Equality works on calendar days; before/after compare instants when both
// sides carry a time.
fn compare_date(op: DateOp, value: &Value, target: DateTarget) -> Option<Ordering> {
    let by_day = matches!(op, DateOp::Equal | DateOp::NotEqual);

    let ordering = match (value, target) {
        (Value::DateTime(at), DateTarget::Instant(bound)) if !by_day => at.cmp(&bound),
        (Value::DateTime(at), _) => utc_date(*at).cmp(&target.day()),
        (Value::Date(day), _) => day.cmp(&target.day()),
        _ => return None,
    };

    Some(ordering)
}

fn utc_date(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

///
/// DateTarget
/// Parsed date filter argument: a whole day or an exact instant (UTC).
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DateTarget {
    Day(Date),
    Instant(OffsetDateTime),
}

impl DateTarget {
    #[must_use]
    pub fn day(self) -> Date {
        match self {
            Self::Day(day) => day,
            Self::Instant(at) => utc_date(at),
        }
    }
}
