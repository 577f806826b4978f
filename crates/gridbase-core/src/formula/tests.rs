use crate::{
    formula::{EvalContext, Formula, FormulaError},
    model::{FormulaResultType, NumberConfig},
    types::RowId,
    value::Value,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

struct Ctx {
    id: u64,
    fields: BTreeMap<&'static str, Value>,
}

impl Ctx {
    fn new(id: u64) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value.into());
        self
    }
}

impl EvalContext for Ctx {
    fn row_id(&self) -> RowId {
        RowId::new(self.id)
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

const NUMBER: FormulaResultType = FormulaResultType::Number(NumberConfig {
    decimal_places: 2,
    negative: true,
});

fn eval(source: &str, ctx: &Ctx, result: FormulaResultType) -> Result<Value, FormulaError> {
    Formula::parse(source)?.evaluate(ctx, result)
}

#[test]
fn arithmetic_respects_precedence() {
    let ctx = Ctx::new(1);

    assert_eq!(eval("1 + 2 * 3", &ctx, NUMBER), Ok(Value::from(7)));
    assert_eq!(eval("(1 + 2) * 3", &ctx, NUMBER), Ok(Value::from(9)));
    assert_eq!(eval("-2 - -3", &ctx, NUMBER), Ok(Value::from(1)));
    assert_eq!(
        eval("10 / 4", &ctx, NUMBER),
        Ok(Value::Number(Decimal::new(25, 1)))
    );
}

#[test]
fn row_id_and_field_references_read_the_context() {
    let ctx = Ctx::new(42).with("Price", 1000).with("Name", "BMW");

    assert_eq!(eval("row_id() + 1", &ctx, NUMBER), Ok(Value::from(43)));
    assert_eq!(
        eval("field('Price') * 2", &ctx, NUMBER),
        Ok(Value::from(2000))
    );
    assert_eq!(
        eval("concat(field('Name'), ' #', row_id())", &ctx, FormulaResultType::Text),
        Ok(Value::from("BMW #42"))
    );
    assert_eq!(
        eval("upper(field('Name'))", &ctx, FormulaResultType::Text),
        Ok(Value::from("BMW"))
    );
    assert_eq!(
        eval("lower('ABC')", &ctx, FormulaResultType::Text),
        Ok(Value::from("abc"))
    );
}

#[test]
fn null_operands_propagate() {
    let ctx = Ctx::new(1).with("Empty", Value::Null);

    assert_eq!(eval("field('Empty') + 1", &ctx, NUMBER), Ok(Value::Null));
    assert_eq!(
        eval("concat('a', field('Empty'), 'b')", &ctx, FormulaResultType::Text),
        Ok(Value::from("ab"))
    );
}

#[test]
fn evaluation_errors_are_reported() {
    let ctx = Ctx::new(1).with("Name", "BMW");

    assert_eq!(
        eval("1 / 0", &ctx, NUMBER),
        Err(FormulaError::DivisionByZero)
    );
    assert_eq!(
        eval("field('Missing')", &ctx, NUMBER),
        Err(FormulaError::UnknownField("Missing".to_string()))
    );
    assert!(matches!(
        eval("field('Name') + 1", &ctx, NUMBER),
        Err(FormulaError::TypeMismatch { op: '+', .. })
    ));
    assert!(matches!(
        eval("'abc'", &ctx, NUMBER),
        Err(FormulaError::Conversion { .. })
    ));
}

#[test]
fn parse_errors_name_the_problem() {
    assert!(matches!(
        Formula::parse("1 +"),
        Err(FormulaError::UnexpectedEnd { .. })
    ));
    assert!(matches!(
        Formula::parse("nope()"),
        Err(FormulaError::UnknownFunction { .. })
    ));
    assert!(matches!(
        Formula::parse("'open"),
        Err(FormulaError::UnterminatedText { pos: 0 })
    ));
    assert!(matches!(
        Formula::parse("row_id(1)"),
        Err(FormulaError::Arity { function: "row_id", found: 1 })
    ));
    assert!(matches!(
        Formula::parse("field(1)"),
        Err(FormulaError::FieldNameNotLiteral)
    ));
    assert!(matches!(
        Formula::parse("1 2"),
        Err(FormulaError::UnexpectedToken { pos: 2, .. })
    ));
    assert!(matches!(
        Formula::parse("1 # 2"),
        Err(FormulaError::UnexpectedChar { found: '#', .. })
    ));
}

#[test]
fn introspection_finds_row_id_and_field_references() {
    let formula = Formula::parse("concat(field('A'), totext(row_id()), field('B'))")
        .expect("formula parses");
    assert!(formula.references_row_id());
    assert_eq!(formula.referenced_fields(), vec!["A", "B"]);

    let formula = Formula::parse("field('A') * 2").expect("formula parses");
    assert!(!formula.references_row_id());
}

#[test]
fn results_coerce_to_declared_type() {
    let ctx = Ctx::new(7);

    assert_eq!(
        eval("row_id()", &ctx, FormulaResultType::Text),
        Ok(Value::from("7"))
    );
    assert_eq!(
        eval("'12.5'", &ctx, NUMBER),
        Ok(Value::Number(Decimal::new(125, 1)))
    );
    assert_eq!(
        eval("10 / 3", &ctx, NUMBER),
        Ok(Value::Number(Decimal::new(333, 2)))
    );
    assert_eq!(
        eval("0", &ctx, FormulaResultType::Boolean),
        Ok(Value::Bool(false))
    );
    assert_eq!(
        eval("'yes'", &ctx, FormulaResultType::Boolean),
        Ok(Value::Bool(true))
    );
    assert!(matches!(
        eval("'2021-01-02'", &ctx, FormulaResultType::Date(Default::default())),
        Ok(Value::Date(_))
    ));
}
