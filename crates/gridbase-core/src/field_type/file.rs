use crate::{
    db::predicate::{FilterOp, ValueTest},
    field_type::{ColumnSpec, FieldType, PhysicalType, common_test, unexpected},
    model::{Field, FieldTypeTag},
    value::{SortKey, Value, casefold},
};

const FILE_OPS: &[FilterOp] = &[FilterOp::FilenameContains, FilterOp::Empty, FilterOp::NotEmpty];

///
/// FileType
///
/// A list of attached files. Searchable by visible name, never orderable.
///

pub(super) struct FileType;

impl FieldType for FileType {
    fn tag(&self) -> FieldTypeTag {
        FieldTypeTag::File
    }

    fn column_spec(&self, _field: &Field) -> ColumnSpec {
        ColumnSpec::required(PhysicalType::Json, Value::Files(Vec::new()))
    }

    fn normalize(&self, _field: &Field, value: Value) -> Result<Value, String> {
        match value {
            Value::Null => Ok(Value::Files(Vec::new())),
            Value::Files(files) => {
                if let Some(file) = files.iter().find(|file| file.name.is_empty()) {
                    return Err(format!(
                        "file '{}' has no stored name",
                        file.visible_name
                    ));
                }
                Ok(Value::Files(files))
            }
            other => Err(unexpected("files", &other)),
        }
    }

    fn search_text(&self, _field: &Field, value: &Value) -> Option<String> {
        match value {
            Value::Files(files) if !files.is_empty() => Some(
                files
                    .iter()
                    .map(|file| file.visible_name.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }

    fn can_order(&self, _field: &Field) -> bool {
        false
    }

    fn order_key(&self, _field: &Field, _value: &Value) -> SortKey {
        SortKey::Null
    }

    fn filter_ops(&self, _field: &Field) -> &'static [FilterOp] {
        FILE_OPS
    }

    fn compile_filter(&self, _field: &Field, op: FilterOp, arg: &str) -> ValueTest {
        match op {
            FilterOp::FilenameContains => ValueTest::FilenameContains(casefold(arg)),
            _ => common_test(op, arg).unwrap_or(ValueTest::Never),
        }
    }
}
