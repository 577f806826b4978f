use crate::{
    model::select::SelectOption,
    types::{FieldId, OptionId, TableId},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

///
/// Field
///
/// Metadata of one user-defined column. `id` is immutable; `name` may change
/// at any time but is unique within its table at any instant.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub table_id: TableId,
    pub name: String,
    /// Position among the table's fields; ties break on `id`.
    pub order: u32,
    #[serde(default)]
    pub primary: bool,
    pub kind: FieldKind,
}

impl Field {
    #[must_use]
    pub const fn tag(&self) -> FieldTypeTag {
        self.kind.tag()
    }

    /// Storage column name (`field_<id>`).
    #[must_use]
    pub fn column_name(&self) -> String {
        self.id.column_name()
    }

    /// Options of a select field, in their configured order.
    #[must_use]
    pub fn select_options(&self) -> &[SelectOption] {
        match &self.kind {
            FieldKind::SingleSelect { options } | FieldKind::MultipleSelect { options } => options,
            _ => &[],
        }
    }

    /// Ordinal position of an option among this field's options.
    #[must_use]
    pub fn option_position(&self, id: OptionId) -> Option<u32> {
        self.select_options()
            .iter()
            .position(|option| option.id == id)
            .and_then(|index| u32::try_from(index).ok())
    }

    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&SelectOption> {
        self.select_options().iter().find(|option| option.id == id)
    }
}

///
/// FieldKind
///
/// Type tag plus type-specific configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text {
        #[serde(default)]
        text_default: Option<String>,
    },
    LongText,
    Number(NumberConfig),
    Boolean,
    Date(DateConfig),
    File,
    SingleSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    MultipleSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    LinkRow {
        link_table_id: TableId,
    },
    Formula(FormulaConfig),
    PhoneNumber,
    Ai(AiConfig),
}

impl FieldKind {
    #[must_use]
    pub const fn tag(&self) -> FieldTypeTag {
        match self {
            Self::Text { .. } => FieldTypeTag::Text,
            Self::LongText => FieldTypeTag::LongText,
            Self::Number(_) => FieldTypeTag::Number,
            Self::Boolean => FieldTypeTag::Boolean,
            Self::Date(_) => FieldTypeTag::Date,
            Self::File => FieldTypeTag::File,
            Self::SingleSelect { .. } => FieldTypeTag::SingleSelect,
            Self::MultipleSelect { .. } => FieldTypeTag::MultipleSelect,
            Self::LinkRow { .. } => FieldTypeTag::LinkRow,
            Self::Formula(_) => FieldTypeTag::Formula,
            Self::PhoneNumber => FieldTypeTag::PhoneNumber,
            Self::Ai(_) => FieldTypeTag::Ai,
        }
    }

    #[must_use]
    pub const fn text() -> Self {
        Self::Text { text_default: None }
    }

    #[must_use]
    pub fn text_with_default(default: impl Into<String>) -> Self {
        Self::Text {
            text_default: Some(default.into()),
        }
    }

    #[must_use]
    pub const fn number(decimal_places: u32) -> Self {
        Self::Number(NumberConfig {
            decimal_places,
            negative: false,
        })
    }

    #[must_use]
    pub const fn single_select() -> Self {
        Self::SingleSelect {
            options: Vec::new(),
        }
    }

    #[must_use]
    pub const fn multiple_select() -> Self {
        Self::MultipleSelect {
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn formula(source: impl Into<String>, result: FormulaResultType) -> Self {
        Self::Formula(FormulaConfig {
            formula: source.into(),
            result,
        })
    }
}

///
/// NumberConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NumberConfig {
    #[serde(default)]
    pub decimal_places: u32,
    #[serde(default)]
    pub negative: bool,
}

///
/// DateConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DateConfig {
    #[serde(default)]
    pub format: DateFormat,
    #[serde(default)]
    pub include_time: bool,
    #[serde(default)]
    pub time_format: TimeFormat,
}

///
/// DateFormat
/// Display format used when rendering dates as text.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateFormat {
    /// DD/MM/YYYY
    #[default]
    Eu,
    /// MM/DD/YYYY
    Us,
    /// YYYY-MM-DD
    Iso,
}

///
/// TimeFormat
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "24")]
    H24,
    #[serde(rename = "12")]
    H12,
}

///
/// FormulaConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FormulaConfig {
    pub formula: String,
    pub result: FormulaResultType,
}

///
/// FormulaResultType
/// Declared type of the value a formula computes.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaResultType {
    Text,
    Number(NumberConfig),
    Boolean,
    Date(DateConfig),
}

///
/// AiConfig
/// Generation settings; values are produced outside the engine.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AiConfig {
    #[serde(default)]
    pub prompt: String,
}

///
/// FieldTypeTag
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTypeTag {
    Text,
    LongText,
    Number,
    Boolean,
    Date,
    File,
    SingleSelect,
    MultipleSelect,
    LinkRow,
    Formula,
    PhoneNumber,
    Ai,
}

impl FieldTypeTag {
    pub const ALL: [Self; 12] = [
        Self::Text,
        Self::LongText,
        Self::Number,
        Self::Boolean,
        Self::Date,
        Self::File,
        Self::SingleSelect,
        Self::MultipleSelect,
        Self::LinkRow,
        Self::Formula,
        Self::PhoneNumber,
        Self::Ai,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::File => "file",
            Self::SingleSelect => "single_select",
            Self::MultipleSelect => "multiple_select",
            Self::LinkRow => "link_row",
            Self::Formula => "formula",
            Self::PhoneNumber => "phone_number",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for FieldTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// UnknownFieldType
///

#[derive(Debug, thiserror::Error)]
#[error("unknown field type '{0}'")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldTypeTag {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}
