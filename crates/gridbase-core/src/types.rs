//! Identifier newtypes shared by metadata, storage, and query layers.
//!
//! Every identifier is a plain positive integer assigned by the owner of the
//! entity (catalog for metadata, store for rows). Identifiers never change
//! for the lifetime of the entity they name.

use derive_more::{Display, From, FromStr};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            Deserialize,
            Display,
            Eq,
            From,
            FromStr,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

id_type!(
    ///
    /// WorkspaceId
    ///
    WorkspaceId
);

id_type!(
    ///
    /// DatabaseId
    /// Identifier of a database application inside a workspace.
    ///
    DatabaseId
);

id_type!(
    ///
    /// TableId
    ///
    TableId
);

id_type!(
    ///
    /// FieldId
    ///
    /// Stable field identifier. The only name of a field that survives
    /// renames; storage columns are always derived from it.
    ///
    FieldId
);

id_type!(
    ///
    /// OptionId
    /// Identifier of one select option.
    ///
    OptionId
);

id_type!(
    ///
    /// RowId
    ///
    RowId
);

impl FieldId {
    /// Storage column name for this field (`field_<id>`).
    #[must_use]
    pub fn column_name(self) -> String {
        format!("field_{}", self.0)
    }
}
