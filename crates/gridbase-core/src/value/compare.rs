use rust_decimal::Decimal;
use std::cmp::Ordering;
use time::{Date, OffsetDateTime};

///
/// SortKey
///
/// Comparison key derived from one cell for ordering.
///
/// Keys of one column always share a variant (or are `Null`). `Null` sorts
/// before every other key, so ascending order puts empty cells first and
/// descending order puts them last.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SortKey {
    Null,
    Bool(bool),
    Date(Date),
    DateTime(OffsetDateTime),
    Number(Decimal),
    /// Ordinal of one select option within its field.
    Position(u32),
    /// Sorted ordinals of a set of select options.
    Positions(Vec<u32>),
    /// Case-folded text followed by the raw text as tie-break.
    Text { folded: String, raw: String },
}

impl SortKey {
    #[must_use]
    pub fn text(raw: &str) -> Self {
        Self::Text {
            folded: super::casefold(raw),
            raw: raw.to_string(),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Date(_) => 3,
            Self::DateTime(_) => 4,
            Self::Position(_) => 5,
            Self::Positions(_) => 6,
            Self::Text { .. } => 7,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Position(a), Self::Position(b)) => a.cmp(b),
            (Self::Positions(a), Self::Positions(b)) => a.cmp(b),
            (
                Self::Text {
                    folded: left_folded,
                    raw: left_raw,
                },
                Self::Text {
                    folded: right_folded,
                    raw: right_raw,
                },
            ) => left_folded
                .cmp(right_folded)
                .then_with(|| left_raw.cmp(right_raw)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
