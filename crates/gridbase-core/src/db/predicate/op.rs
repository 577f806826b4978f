use std::{fmt, str::FromStr};

///
/// FilterOp
///
/// Named filter operators accepted in filter keys. Which operators a column
/// accepts is decided by its field type.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FilterOp {
    Equal,
    NotEqual,
    Contains,
    ContainsNot,
    LengthIsLowerThan,
    HigherThan,
    LowerThan,
    Empty,
    NotEmpty,
    Boolean,
    DateEqual,
    DateNotEqual,
    DateBefore,
    DateAfter,
    FilenameContains,
    SingleSelectEqual,
    SingleSelectNotEqual,
    MultipleSelectHas,
    MultipleSelectHasNot,
}

impl FilterOp {
    pub const ALL: [Self; 19] = [
        Self::Equal,
        Self::NotEqual,
        Self::Contains,
        Self::ContainsNot,
        Self::LengthIsLowerThan,
        Self::HigherThan,
        Self::LowerThan,
        Self::Empty,
        Self::NotEmpty,
        Self::Boolean,
        Self::DateEqual,
        Self::DateNotEqual,
        Self::DateBefore,
        Self::DateAfter,
        Self::FilenameContains,
        Self::SingleSelectEqual,
        Self::SingleSelectNotEqual,
        Self::MultipleSelectHas,
        Self::MultipleSelectHasNot,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::Contains => "contains",
            Self::ContainsNot => "contains_not",
            Self::LengthIsLowerThan => "length_is_lower_than",
            Self::HigherThan => "higher_than",
            Self::LowerThan => "lower_than",
            Self::Empty => "empty",
            Self::NotEmpty => "not_empty",
            Self::Boolean => "boolean",
            Self::DateEqual => "date_equal",
            Self::DateNotEqual => "date_not_equal",
            Self::DateBefore => "date_before",
            Self::DateAfter => "date_after",
            Self::FilenameContains => "filename_contains",
            Self::SingleSelectEqual => "single_select_equal",
            Self::SingleSelectNotEqual => "single_select_not_equal",
            Self::MultipleSelectHas => "multiple_select_has",
            Self::MultipleSelectHasNot => "multiple_select_has_not",
        }
    }

    /// Whether the operator ignores its argument.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::Empty | Self::NotEmpty)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// UnknownFilterOp
///

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("filter type '{0}' does not exist")]
pub struct UnknownFilterOp(pub String);

impl FromStr for FilterOp {
    type Err = UnknownFilterOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownFilterOp(s.to_string()))
    }
}
