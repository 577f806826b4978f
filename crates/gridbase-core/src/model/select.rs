use crate::types::OptionId;
use serde::{Deserialize, Serialize};

///
/// SelectOption
///
/// One choice of a single or multiple select field. Rows reference options
/// by `id`, never by display value; the position in the owning field's option
/// list is the option's ordinal for ordering.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SelectOption {
    pub id: OptionId,
    pub value: String,
    pub color: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(id: OptionId, value: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            color: color.into(),
        }
    }
}
