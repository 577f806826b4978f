use crate::{
    db::predicate::{ColumnKey, DateOp, DateTarget, FilterOp, Predicate, ValueTest},
    types::{FieldId, OptionId, RowId},
    value::{FileValue, Value},
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use time::{Date, Duration, Month, OffsetDateTime};

fn day(dom: u8) -> Date {
    Date::from_calendar_date(2024, Month::March, dom).expect("valid date")
}

// 2024-03-01 12:00 UTC
fn noon() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_709_294_400).expect("valid timestamp")
}

fn check(test: &ValueTest, value: &Value) -> bool {
    test.matches(value, || value.as_text().map(str::to_string))
}

fn field_test(id: u64, test: ValueTest) -> Predicate {
    Predicate::Test {
        column: ColumnKey::Field(FieldId::new(id)),
        test,
    }
}

// ----------------------------------------------------------------------
// Value tests
// ----------------------------------------------------------------------

#[test]
fn emptiness_covers_null_text_and_collections() {
    for value in [
        Value::Null,
        Value::from(""),
        Value::SelectOptions(Vec::new()),
        Value::Files(Vec::new()),
        Value::Links(Vec::new()),
    ] {
        assert!(check(&ValueTest::Empty, &value), "{value:?}");
        assert!(!check(&ValueTest::NotEmpty, &value), "{value:?}");
    }

    for value in [Value::from("x"), Value::from(0), Value::from(false)] {
        assert!(check(&ValueTest::NotEmpty, &value), "{value:?}");
    }
}

#[test]
fn negative_tests_match_empty_cells() {
    let target = DateTarget::Day(day(1));

    assert!(check(&ValueTest::NotEquals(Value::from("BMW")), &Value::Null));
    assert!(check(&ValueTest::ContainsNot("bmw".to_string()), &Value::Null));
    assert!(check(&ValueTest::LacksOption(OptionId::new(1)), &Value::Null));
    assert!(check(
        &ValueTest::Date {
            op: DateOp::NotEqual,
            target
        },
        &Value::Null
    ));

    assert!(!check(&ValueTest::Equals(Value::from("BMW")), &Value::Null));
    assert!(!check(&ValueTest::Contains("bmw".to_string()), &Value::Null));
    assert!(!check(&ValueTest::HasOption(OptionId::new(1)), &Value::Null));
    for op in [DateOp::Equal, DateOp::Before, DateOp::After] {
        assert!(!check(&ValueTest::Date { op, target }, &Value::Null));
    }
}

#[test]
fn numeric_bounds_are_strict() {
    let ten = Value::Number(Decimal::from(10));

    assert!(check(&ValueTest::HigherThan(Decimal::from(9)), &ten));
    assert!(!check(&ValueTest::HigherThan(Decimal::from(10)), &ten));
    assert!(check(&ValueTest::LowerThan(Decimal::new(1001, 2)), &ten));
    assert!(!check(&ValueTest::LowerThan(Decimal::from(10)), &ten));
    assert!(!check(&ValueTest::LowerThan(Decimal::from(10)), &Value::Null));
}

#[test]
fn length_counts_characters_and_null_as_zero() {
    let test = ValueTest::LengthBelow(4);

    assert!(check(&test, &Value::from("äöü")));
    assert!(!check(&test, &Value::from("abcd")));
    assert!(check(&test, &Value::Null));
}

#[test]
fn flags_treat_missing_values_as_false() {
    assert!(check(&ValueTest::Flag(true), &Value::from(true)));
    assert!(check(&ValueTest::Flag(false), &Value::from(false)));
    assert!(check(&ValueTest::Flag(false), &Value::Null));
    assert!(!check(&ValueTest::Flag(true), &Value::Null));
}

#[test]
fn options_match_single_and_multiple_selects() {
    let red = OptionId::new(1);
    let blue = OptionId::new(2);

    assert!(check(&ValueTest::HasOption(red), &Value::SelectOption(red)));
    assert!(check(&ValueTest::HasOption(blue), &Value::SelectOptions(vec![red, blue])));
    assert!(check(&ValueTest::LacksOption(blue), &Value::SelectOption(red)));
    assert!(!check(&ValueTest::LacksOption(red), &Value::SelectOptions(vec![red])));
}

#[test]
fn filename_contains_reads_visible_names() {
    let files = Value::Files(vec![
        FileValue::new("a1b2c3.png", "Holiday Photo.png"),
        FileValue::new("d4e5f6.pdf", "Invoice.pdf"),
    ]);

    assert!(check(&ValueTest::FilenameContains("photo".to_string()), &files));
    assert!(!check(&ValueTest::FilenameContains("a1b2".to_string()), &files));
    assert!(!check(&ValueTest::FilenameContains("photo".to_string()), &Value::Null));
}

#[test]
fn containment_uses_rendered_text() {
    let test = ValueTest::Contains("000".to_string());
    let number = Value::Number(Decimal::from(5_000));

    assert!(test.matches(&number, || Some("5000".to_string())));
    assert!(!test.matches(&number, || None));
}

#[test]
fn date_equality_compares_calendar_days() {
    let late_evening = Value::DateTime(noon() + Duration::hours(11));
    let equal_noon = ValueTest::Date {
        op: DateOp::Equal,
        target: DateTarget::Instant(noon()),
    };
    let equal_day = ValueTest::Date {
        op: DateOp::Equal,
        target: DateTarget::Day(day(1)),
    };

    assert!(check(&equal_noon, &late_evening));
    assert!(check(&equal_day, &late_evening));
    assert!(check(&equal_day, &Value::Date(day(1))));
    assert!(!check(&equal_day, &Value::Date(day(2))));
}

#[test]
fn date_bounds_compare_instants_when_both_have_time() {
    let morning = Value::DateTime(noon() - Duration::hours(3));
    let before_noon = ValueTest::Date {
        op: DateOp::Before,
        target: DateTarget::Instant(noon()),
    };
    let before_day = ValueTest::Date {
        op: DateOp::Before,
        target: DateTarget::Day(day(1)),
    };
    let after_day = ValueTest::Date {
        op: DateOp::After,
        target: DateTarget::Day(day(1)),
    };

    assert!(check(&before_noon, &morning));
    assert!(!check(&before_day, &morning));
    assert!(!check(&after_day, &morning));
    assert!(check(&after_day, &Value::Date(day(2))));
    assert!(!check(&before_noon, &Value::Date(day(1))));
}

// ----------------------------------------------------------------------
// Combinators
// ----------------------------------------------------------------------

#[test]
fn and_drops_true_and_collapses_on_false() {
    let test = field_test(1, ValueTest::Empty);

    assert_eq!(Predicate::True.and(test.clone()), test);
    assert_eq!(test.clone().and(Predicate::True), test);
    assert_eq!(test.clone().and(Predicate::False), Predicate::False);

    let nested = test
        .clone()
        .and(field_test(2, ValueTest::NotEmpty))
        .and(field_test(3, ValueTest::Always));
    assert!(matches!(nested, Predicate::And(ref children) if children.len() == 3));
}

#[test]
fn all_and_any_simplify_trivial_shapes() {
    let test = field_test(1, ValueTest::Empty);

    assert_eq!(Predicate::all(Vec::new()), Predicate::True);
    assert_eq!(Predicate::any(Vec::new()), Predicate::False);
    assert_eq!(Predicate::all(vec![test.clone()]), test);
    assert_eq!(Predicate::any(vec![test.clone()]), test);
    assert!(matches!(
        Predicate::any(vec![test.clone(), Predicate::RowIdEq(RowId::new(1))]),
        Predicate::Or(_)
    ));
}

// ----------------------------------------------------------------------
// Operators
// ----------------------------------------------------------------------

#[test]
fn operator_names_parse_back() {
    for op in FilterOp::ALL {
        assert_eq!(FilterOp::from_str(op.as_str()), Ok(op));
        assert_eq!(op.to_string(), op.as_str());
    }

    assert!(FilterOp::from_str("Equal").is_err());
    assert!(FilterOp::from_str("").is_err());
    assert!(FilterOp::Empty.is_unary());
    assert!(!FilterOp::Equal.is_unary());
}

// ----------------------------------------------------------------------
// Fingerprints
// ----------------------------------------------------------------------

#[test]
fn fingerprint_ignores_number_scale() {
    let one = field_test(1, ValueTest::Equals(Value::Number(Decimal::from(1))));
    let one_scaled = field_test(1, ValueTest::Equals(Value::Number(Decimal::new(100, 2))));

    assert_eq!(one.fingerprint(), one_scaled.fingerprint());
}

#[test]
fn fingerprint_separates_structure() {
    let left = field_test(1, ValueTest::Contains("ab".to_string()));
    let right = field_test(2, ValueTest::Contains("ab".to_string()));

    let fingerprints = [
        left.fingerprint(),
        right.fingerprint(),
        Predicate::all(vec![left.clone(), right.clone()]).fingerprint(),
        Predicate::any(vec![left.clone(), right.clone()]).fingerprint(),
        Predicate::all(vec![right, left.clone()]).fingerprint(),
        Predicate::Not(Box::new(left)).fingerprint(),
        Predicate::True.fingerprint(),
        Predicate::False.fingerprint(),
    ];

    for (i, a) in fingerprints.iter().enumerate() {
        assert_eq!(a.len(), 64);
        for b in &fingerprints[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(field in 1u64..1_000, needle in "[a-z]{0,12}") {
        let build = || Predicate::all(vec![
            field_test(field, ValueTest::Contains(needle.clone())),
            Predicate::RowIdEq(RowId::new(field)),
        ]);

        prop_assert_eq!(build().fingerprint(), build().fingerprint());
    }

    #[test]
    fn fingerprint_separates_text_arguments(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        prop_assume!(a != b);

        let left = field_test(1, ValueTest::Equals(Value::from(a)));
        let right = field_test(1, ValueTest::Equals(Value::from(b)));
        prop_assert_ne!(left.fingerprint(), right.fingerprint());
    }
}
