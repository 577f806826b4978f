mod common;

use common::Cars;
use gridbase_core::{
    config::EngineConfig,
    db::{
        RowInput,
        query::{FilterObject, QueryError},
    },
    model::FieldKind,
    types::RowId,
    value::Value,
};
use rust_decimal::Decimal;
use serde_json::{Value as JsonValue, json};

fn filters(entries: Vec<(String, JsonValue)>) -> FilterObject {
    let object: serde_json::Map<String, JsonValue> = entries.into_iter().collect();

    serde_json::from_value(JsonValue::Object(object)).expect("filter object")
}

#[test]
fn and_filter_finds_the_bmw() {
    let cars = Cars::new();
    let schema = cars.schema();
    let object = filters(vec![
        (cars.key(cars.name, "equal"), json!("BMW")),
        (cars.key(cars.price, "equal"), json!(10000)),
    ]);

    let response = cars
        .db
        .query(&schema)
        .filter_by_fields_object(&object, "AND")
        .expect("valid filter")
        .execute();

    assert_eq!(response.display_values(), ["BMW"]);
    assert_eq!(response.ids(), [cars.rows[0]]);
}

#[test]
fn or_filter_keeps_insertion_order() {
    let cars = Cars::new();
    let schema = cars.schema();
    let object = filters(vec![(cars.key(cars.name, "equal"), json!(["BMW", "Audi"]))]);

    let response = cars
        .db
        .query(&schema)
        .filter_by_fields_object(&object, "OR")
        .expect("valid filter")
        .execute();

    assert_eq!(response.display_values(), ["BMW", "Audi"]);
}

#[test]
fn list_values_are_alternatives_under_and() {
    let cars = Cars::new();
    let schema = cars.schema();
    let object = filters(vec![
        (cars.key(cars.name, "equal"), json!(["BMW", "Volkswagen"])),
        (cars.key(cars.price, "lower_than"), json!("6000")),
    ]);

    let response = cars
        .db
        .query(&schema)
        .filter_by_fields_object(&object, "AND")
        .expect("valid filter")
        .execute();

    assert_eq!(response.ids(), [cars.rows[2], cars.rows[3]]);
}

#[test]
fn empty_description_is_the_green_volkswagen() {
    let cars = Cars::new();
    let schema = cars.schema();
    let object = filters(vec![(cars.key(cars.description, "empty"), json!(""))]);

    let response = cars
        .db
        .query(&schema)
        .filter_by_fields_object(&object, "AND")
        .expect("valid filter")
        .execute();

    let record = response.record().expect("exactly one row");
    assert_eq!(record.id(), cars.rows[3]);
    assert_eq!(record.field(cars.color), Some(&Value::from("Green")));
}

#[test]
fn unrecognized_keys_leave_rows_unaffected() {
    let cars = Cars::new();
    let schema = cars.schema();
    let object = filters(vec![
        ("filter__not__equal".to_string(), json!("BMW")),
        (format!("filters__field_{}__equal", cars.name), json!("BMW")),
        ("page".to_string(), json!(2)),
    ]);

    for filter_type in ["AND", "OR"] {
        let count = cars
            .db
            .query(&schema)
            .filter_by_fields_object(&object, filter_type)
            .expect("nothing to reject")
            .count();
        assert_eq!(count, 4);
    }
}

#[test]
fn descending_price() {
    let cars = Cars::new();
    let schema = cars.schema();

    let response = cars
        .db
        .query(&schema)
        .order_by_fields_string(&format!("-{}", cars.price.column_name()))
        .expect("valid order")
        .execute();

    assert_eq!(
        response.ids(),
        [cars.rows[1], cars.rows[0], cars.rows[2], cars.rows[3]]
    );
}

#[test]
fn ties_are_stable_across_evaluations() {
    let cars = Cars::new();
    let schema = cars.schema();
    // Inserted between the two Volkswagens by order value.
    cars.db
        .rows(&schema)
        .create(
            RowInput::new()
                .set_field(cars.name, "Volkswagen")
                .order(Decimal::new(35, 1)),
        )
        .expect("valid row");

    let run = || {
        cars.db
            .query(&schema)
            .order_by_fields_string(&cars.name.column_name())
            .expect("valid order")
            .execute()
            .ids()
    };

    let first = run();
    assert_eq!(
        first,
        [
            cars.rows[1],
            cars.rows[0],
            cars.rows[2],
            RowId::new(5),
            cars.rows[3]
        ]
    );
    for _ in 0..5 {
        assert_eq!(run(), first);
    }
}

#[test]
fn attribute_mode_escapes_leading_signs() {
    let mut cars = Cars::new();
    let rank = cars
        .catalog
        .add_field(cars.table, "-Rank", FieldKind::number(0))
        .expect("unique name");
    let schema = cars.attribute_schema();
    let rows = cars.db.rows(&schema);
    for (id, rank_value) in cars.rows.iter().zip([3, 1, 4, 2]) {
        rows.update(*id, RowInput::new().set_field(rank, rank_value))
            .expect("row exists");
    }

    let order = |spec: &str| {
        cars.db
            .query(&schema)
            .order_by_fields_string(spec)
            .map(|query| query.execute().ids())
    };

    let descending = order("--Rank").expect("descending on '-Rank'");
    assert_eq!(
        descending,
        [cars.rows[2], cars.rows[0], cars.rows[3], cars.rows[1]]
    );

    let ascending = order("+-Rank").expect("ascending on '-Rank'");
    assert_eq!(
        ascending,
        [cars.rows[1], cars.rows[3], cars.rows[0], cars.rows[2]]
    );

    assert!(matches!(
        order("-Rank"),
        Err(QueryError::OrderByFieldNotFound { .. })
    ));
}

#[test]
fn select_fields_order_by_option_position() {
    let mut cars = Cars::new();
    let size = cars
        .catalog
        .add_field(cars.table, "Size", FieldKind::single_select())
        .expect("unique name");
    // Created out of display order: ids grow, positions do not follow text.
    let large = cars.catalog.add_select_option(size, "Large", "red").expect("select");
    let small = cars.catalog.add_select_option(size, "Small", "blue").expect("select");
    let medium = cars.catalog.add_select_option(size, "Medium", "green").expect("select");

    let schema = cars.schema();
    let rows = cars.db.rows(&schema);
    for (id, option) in cars.rows.iter().zip([small, large, medium, small]) {
        rows.update(*id, RowInput::new().set_field(size, option))
            .expect("valid option");
    }

    let ids = cars
        .db
        .query(&schema)
        .order_by_fields_string(&size.column_name())
        .expect("selects can be ordered")
        .execute()
        .ids();
    assert_eq!(ids, [cars.rows[1], cars.rows[0], cars.rows[3], cars.rows[2]]);

    let object = filters(vec![(
        cars.key(size, "single_select_equal"),
        json!(small.get()),
    )]);
    let ids = cars
        .db
        .query(&schema)
        .filter_by_fields_object(&object, "AND")
        .expect("valid filter")
        .execute()
        .ids();
    assert_eq!(ids, [cars.rows[0], cars.rows[3]]);

    let matches = cars.db.query(&schema).search("medium").execute().ids();
    assert_eq!(matches, [cars.rows[2]]);
}

#[test]
fn link_fields_are_rejected_for_ordering_and_filtering() {
    let mut cars = Cars::new();
    let owners = cars
        .catalog
        .add_field(
            cars.table,
            "Owners",
            FieldKind::LinkRow {
                link_table_id: cars.table,
            },
        )
        .expect("unique name");
    let schema = cars.schema();

    let order = cars
        .db
        .query(&schema)
        .order_by_fields_string(&owners.column_name())
        .map(|query| query.count());
    assert!(matches!(order, Err(QueryError::OrderByFieldNotPossible { .. })));

    let object = filters(vec![(cars.key(owners, "equal"), json!("1"))]);
    let filter = cars
        .db
        .query(&schema)
        .filter_by_fields_object(&object, "AND")
        .map(|query| query.count());
    assert!(matches!(
        filter,
        Err(QueryError::ViewFilterTypeNotAllowedForField { .. })
    ));
}

#[test]
fn search_config_can_disable_row_id_matches() {
    let config = EngineConfig::from_toml_str("[search]\nmatch_row_id = false\n").expect("valid");
    let cars = Cars::with_config(config);
    let schema = cars.schema();

    assert!(cars.db.query(&schema).search("3").execute().is_empty());

    let default = Cars::new();
    let schema = default.schema();
    assert_eq!(
        default.db.query(&schema).search("3").execute().ids(),
        [default.rows[2]]
    );
}

#[test]
fn rows_handle_queries_over_their_schema() {
    let cars = Cars::new();
    let schema = cars.attribute_schema();
    let rows = cars.db.rows(&schema);

    let page = rows
        .query()
        .order_by_fields_string("-price")
        .expect("attribute name")
        .page(0, Some(3));

    assert_eq!(page.total, 4);
    assert!(page.has_next());
    assert_eq!(page.response.display_values(), ["Audi", "BMW", "Volkswagen"]);

    let json = page.to_json();
    assert_eq!(json["results"][0]["name"], json!("Audi"));
    assert_eq!(json["results"][0]["price"], json!("20000"));
    assert_eq!(json["has_next"], json!(true));
}
