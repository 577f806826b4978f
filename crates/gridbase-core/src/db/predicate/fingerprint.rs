use crate::{
    db::predicate::{ColumnKey, DateOp, DateTarget, Predicate, ValueTest},
    value::Value,
};
use sha2::{Digest, Sha256};

/// Hash predicate structure into the query hash stream.
pub(in crate::db) fn hash_predicate(hasher: &mut Sha256, predicate: &Predicate) {
    match predicate {
        Predicate::True => write_tag(hasher, 0x21),
        Predicate::False => write_tag(hasher, 0x22),
        Predicate::And(children) => {
            write_tag(hasher, 0x23);
            write_len_u32(hasher, children.len());
            for child in children {
                hash_predicate(hasher, child);
            }
        }
        Predicate::Or(children) => {
            write_tag(hasher, 0x24);
            write_len_u32(hasher, children.len());
            for child in children {
                hash_predicate(hasher, child);
            }
        }
        Predicate::Not(inner) => {
            write_tag(hasher, 0x25);
            hash_predicate(hasher, inner);
        }
        Predicate::Test { column, test } => {
            write_tag(hasher, 0x26);
            hash_column(hasher, *column);
            hash_test(hasher, test);
        }
        Predicate::RowIdEq(id) => {
            write_tag(hasher, 0x27);
            write_u64(hasher, id.get());
        }
    }
}

pub(in crate::db) fn hash_column(hasher: &mut Sha256, column: ColumnKey) {
    match column {
        ColumnKey::Field(id) => {
            write_tag(hasher, 0x31);
            write_u64(hasher, id.get());
        }
        ColumnKey::System(system) => {
            write_tag(hasher, 0x32);
            write_tag(hasher, system.tag());
        }
    }
}

fn hash_test(hasher: &mut Sha256, test: &ValueTest) {
    match test {
        ValueTest::Always => write_tag(hasher, 0x41),
        ValueTest::Never => write_tag(hasher, 0x42),
        ValueTest::Empty => write_tag(hasher, 0x43),
        ValueTest::NotEmpty => write_tag(hasher, 0x44),
        ValueTest::Equals(value) => {
            write_tag(hasher, 0x45);
            write_value(hasher, value);
        }
        ValueTest::NotEquals(value) => {
            write_tag(hasher, 0x46);
            write_value(hasher, value);
        }
        ValueTest::HigherThan(bound) => {
            write_tag(hasher, 0x47);
            write_value(hasher, &Value::Number(*bound));
        }
        ValueTest::LowerThan(bound) => {
            write_tag(hasher, 0x48);
            write_value(hasher, &Value::Number(*bound));
        }
        ValueTest::Contains(needle) => {
            write_tag(hasher, 0x49);
            write_str(hasher, needle);
        }
        ValueTest::ContainsNot(needle) => {
            write_tag(hasher, 0x4a);
            write_str(hasher, needle);
        }
        ValueTest::LengthBelow(limit) => {
            write_tag(hasher, 0x4b);
            write_u64(hasher, u64::try_from(*limit).unwrap_or(u64::MAX));
        }
        ValueTest::Flag(flag) => {
            write_tag(hasher, 0x4c);
            write_tag(hasher, u8::from(*flag));
        }
        ValueTest::Date { op, target } => {
            write_tag(hasher, 0x4d);
            write_tag(
                hasher,
                match op {
                    DateOp::Equal => 1,
                    DateOp::NotEqual => 2,
                    DateOp::Before => 3,
                    DateOp::After => 4,
                },
            );
            match target {
                DateTarget::Day(day) => write_value(hasher, &Value::Date(*day)),
                DateTarget::Instant(at) => write_value(hasher, &Value::DateTime(*at)),
            }
        }
        ValueTest::HasOption(id) => {
            write_tag(hasher, 0x4e);
            write_u64(hasher, id.get());
        }
        ValueTest::LacksOption(id) => {
            write_tag(hasher, 0x4f);
            write_u64(hasher, id.get());
        }
        ValueTest::FilenameContains(needle) => {
            write_tag(hasher, 0x50);
            write_str(hasher, needle);
        }
    }
}

///
/// Encode one value into the query hash stream.
/// Numbers are normalized so that scale never changes the digest.
///

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x60),
        Value::Bool(flag) => {
            write_tag(hasher, 0x61);
            write_tag(hasher, u8::from(*flag));
        }
        Value::Date(day) => {
            write_tag(hasher, 0x62);
            hasher.update(day.to_julian_day().to_be_bytes());
        }
        Value::DateTime(at) => {
            write_tag(hasher, 0x63);
            hasher.update(at.unix_timestamp_nanos().to_be_bytes());
        }
        Value::Files(files) => {
            write_tag(hasher, 0x64);
            write_len_u32(hasher, files.len());
            for file in files {
                write_str(hasher, &file.name);
                write_str(hasher, &file.visible_name);
            }
        }
        Value::Links(ids) => {
            write_tag(hasher, 0x65);
            write_len_u32(hasher, ids.len());
            for id in ids {
                write_u64(hasher, id.get());
            }
        }
        Value::Number(number) => {
            write_tag(hasher, 0x66);
            hasher.update(number.normalize().serialize());
        }
        Value::SelectOption(id) => {
            write_tag(hasher, 0x67);
            write_u64(hasher, id.get());
        }
        Value::SelectOptions(ids) => {
            write_tag(hasher, 0x68);
            write_len_u32(hasher, ids.len());
            for id in ids {
                write_u64(hasher, id.get());
            }
        }
        Value::Text(text) => {
            write_tag(hasher, 0x69);
            write_str(hasher, text);
        }
    }
}

///
/// Encode one string with length prefix into the query hash stream.
///

pub(in crate::db) fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

/// Encode a platform-sized length as u32 with deterministic saturation.
pub(in crate::db) fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

fn write_u64(hasher: &mut Sha256, value: u64) {
    hasher.update(value.to_be_bytes());
}

///
/// Encode one tag byte into the query hash stream.
///

pub(in crate::db) fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

/// Lowercase hex rendering of a finished digest.
pub(in crate::db) fn to_hex(digest: &[u8]) -> String {
    use std::fmt::Write as _;

    digest
        .iter()
        .fold(String::with_capacity(digest.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
