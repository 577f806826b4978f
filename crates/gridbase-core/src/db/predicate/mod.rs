//! Module: db::predicate
//! Responsibility: the row-restriction tree built by search and filtering,
//! its runtime evaluation, and its structural fingerprint.
//! Does not own: name resolution or operator validation (query layer).

pub(crate) mod fingerprint;
mod model;
mod op;
pub(crate) mod runtime;

#[cfg(test)]
mod tests;

pub use model::{ColumnKey, DateOp, DateTarget, Predicate, ValueTest};
pub use op::{FilterOp, UnknownFilterOp};

use sha2::{Digest, Sha256};

impl Predicate {
    /// Stable hex digest of the predicate structure.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        fingerprint::hash_predicate(&mut hasher, self);

        fingerprint::to_hex(&hasher.finalize())
    }
}
