use crate::{
    config::EngineConfig,
    db::{Db, RowError, RowInput},
    model::{Catalog, FieldKind, FormulaResultType, Node, NumberConfig},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    schema::ComposeOptions,
    test_fixtures::{Cars, start_of_fixture},
    types::{RowId, TableId},
    value::Value,
};
use rust_decimal::Decimal;
use std::{cell::RefCell, rc::Rc};
use time::Duration;

#[test]
fn create_appends_rows_with_clock_timestamps() {
    let cars = Cars::new();
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);

    let orders: Vec<Decimal> = rows.all().iter().map(|record| record.order()).collect();
    assert_eq!(
        orders,
        vec![
            Decimal::from(1),
            Decimal::from(2),
            Decimal::from(3),
            Decimal::from(4)
        ]
    );

    cars.clock.advance(Duration::hours(1));
    let record = rows
        .create(RowInput::new().set_field(cars.name, "Tesla"))
        .expect("valid row");

    assert_eq!(record.id(), RowId::new(5));
    assert_eq!(record.order(), Decimal::from(5));
    assert_eq!(record.created_on(), start_of_fixture() + Duration::hours(1));
    assert_eq!(record.field(cars.price), Some(&Value::Null));
}

#[test]
fn explicit_order_is_kept() {
    let cars = Cars::new();
    let schema = cars.schema();

    let record = cars
        .db
        .rows(&schema)
        .create(
            RowInput::new()
                .set_field(cars.name, "Fiat")
                .order(Decimal::new(15, 1)),
        )
        .expect("valid row");

    assert_eq!(record.order(), Decimal::new(15, 1));
    let names: Vec<String> = cars.db.rows(&schema).all().iter().map(|r| r.display()).collect();
    assert_eq!(names, ["BMW", "Fiat", "Audi", "Volkswagen", "Volkswagen"]);
}

#[test]
fn update_touches_only_updated_on() {
    let cars = Cars::new();
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);

    cars.clock.advance(Duration::minutes(5));
    let record = rows
        .update(
            cars.rows[0],
            RowInput::new().set(cars.price.column_name(), Decimal::from(12_000)),
        )
        .expect("row exists");

    assert_eq!(record.created_on(), start_of_fixture());
    assert_eq!(record.updated_on(), start_of_fixture() + Duration::minutes(5));
    assert_eq!(
        record.field(cars.price),
        Some(&Value::Number(Decimal::from(12_000)))
    );
    assert_eq!(record.field(cars.name), Some(&Value::from("BMW")));
}

#[test]
fn missing_rows_and_fields_are_reported() {
    let cars = Cars::new();
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);
    let missing = RowId::new(99);

    assert_eq!(
        rows.get(missing).map(|record| record.id()),
        Err(RowError::RowDoesNotExist {
            table: cars.table,
            row: missing
        })
    );
    assert!(matches!(rows.delete(missing), Err(RowError::RowDoesNotExist { .. })));

    // Stable schemas do not resolve attribute names.
    assert_eq!(
        rows.create(RowInput::new().set("name", "Seat")).map(|r| r.id()),
        Err(RowError::UnknownField {
            name: "name".to_string()
        })
    );
}

#[test]
fn invalid_values_reject_the_whole_write() {
    let cars = Cars::new();
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);

    let err = rows
        .update(
            cars.rows[0],
            RowInput::new()
                .set_field(cars.name, "Changed")
                .set_field(cars.price, true),
        )
        .map(|record| record.id())
        .expect_err("bool is not a number");
    assert!(matches!(err, RowError::InvalidValue { .. }));

    let record = rows.get(cars.rows[0]).expect("row exists");
    assert_eq!(record.field(cars.name), Some(&Value::from("BMW")));
}

#[test]
fn delete_removes_the_row() {
    let cars = Cars::new();
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);

    rows.delete(cars.rows[1]).expect("row exists");

    assert_eq!(rows.all().len(), 3);
    assert_eq!(cars.db.store().row_count(cars.table), 3);
    assert!(rows.get(cars.rows[1]).is_err());
}

#[test]
fn attribute_schema_reads_and_writes_by_attribute_name() {
    let cars = Cars::new();
    let schema = cars.attribute_schema();
    let rows = cars.db.rows(&schema);

    let record = rows
        .create(RowInput::new().set("name", "Skoda").set("price", Decimal::from(7_000)))
        .expect("valid row");

    assert_eq!(record.get("name"), Some(&Value::from("Skoda")));
    assert_eq!(record.attribute("name"), record.stable(&cars.name.column_name()));
    assert_eq!(record.get(&cars.name.column_name()), None);

    let keys: Vec<&str> = record.values().into_iter().map(|(key, _)| key).collect();
    assert_eq!(keys, ["name", "color", "price", "description"]);
}

#[test]
fn display_uses_primary_field_or_falls_back() {
    let cars = Cars::new();
    let schema = cars.schema();
    let record = cars.db.rows(&schema).get(cars.rows[1]).expect("row exists");
    assert_eq!(record.display(), "Audi");
    assert_eq!(record.to_string(), "Audi");

    let without_primary = cars.schema_with(ComposeOptions::new().fields([cars.price]));
    let record = cars
        .db
        .rows(&without_primary)
        .get(cars.rows[1])
        .expect("row exists");
    assert_eq!(record.display(), "unnamed row 2");
}

#[test]
fn record_hierarchy_walks_to_workspace() {
    let cars = Cars::new();
    let schema = cars.schema();
    let record = cars.db.rows(&schema).get(cars.rows[0]).expect("row exists");

    assert_eq!(
        record.node(),
        Node::Row {
            table_id: cars.table,
            row_id: cars.rows[0]
        }
    );
    assert_eq!(record.parent(), Node::Table(cars.table));

    let database = cars.catalog.parent(record.parent()).expect("table has a parent");
    assert_eq!(database, schema.parent());
    assert!(matches!(
        cars.catalog.root(record.node()),
        Some(Node::Workspace(_))
    ));
}

#[test]
fn formulas_compute_inside_the_write() {
    let mut cars = Cars::new();
    let label = cars
        .catalog
        .add_field(
            cars.table,
            "Label",
            FieldKind::formula(
                "concat(upper(field('Name')), ' #', totext(row_id()))",
                FormulaResultType::Text,
            ),
        )
        .expect("unique name");
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);

    assert_eq!(rows.fields_requiring_refresh_after_insert(), [label.column_name()]);
    assert_eq!(rows.fields_requiring_refresh_after_update(), [label.column_name()]);

    // Rows written before the field existed are computed by reconciliation.
    assert_eq!(rows.get(cars.rows[0]).expect("row").field(label), Some(&Value::Null));
    assert_eq!(rows.reconcile().expect("reconcile"), 4);
    assert_eq!(
        rows.get(cars.rows[0]).expect("row").field(label),
        Some(&Value::from("BMW #1"))
    );
    assert_eq!(rows.reconcile().expect("reconcile"), 0);

    let record = rows
        .create(RowInput::new().set_field(cars.name, "Opel"))
        .expect("valid row");
    assert_eq!(record.field(label), Some(&Value::from("OPEL #5")));

    let record = rows
        .update(record.id(), RowInput::new().set_field(cars.name, "Mini"))
        .expect("row exists");
    assert_eq!(record.field(label), Some(&Value::from("MINI #5")));

    assert_eq!(
        rows.update(record.id(), RowInput::new().set_field(label, "x"))
            .map(|record| record.id()),
        Err(RowError::ReadOnlyField {
            field: label.column_name()
        })
    );
}

#[test]
fn failing_formulas_store_null() {
    let mut cars = Cars::new();
    let ratio = cars
        .catalog
        .add_field(
            cars.table,
            "Ratio",
            FieldKind::formula(
                "field('Price') / 0",
                FormulaResultType::Number(NumberConfig::default()),
            ),
        )
        .expect("unique name");
    let halved = cars
        .catalog
        .add_field(
            cars.table,
            "Half",
            FieldKind::formula(
                "field('Price') / 2",
                FormulaResultType::Number(NumberConfig {
                    decimal_places: 1,
                    negative: false,
                }),
            ),
        )
        .expect("unique name");
    let schema = cars.schema();
    let rows = cars.db.rows(&schema);

    let record = rows
        .create(RowInput::new().set_field(cars.price, Decimal::from(25)))
        .expect("a broken formula never blocks a write");

    assert_eq!(record.field(ratio), Some(&Value::Null));
    assert_eq!(record.field(halved), Some(&Value::Number(Decimal::new(125, 1))));
    assert!(rows.fields_requiring_refresh_after_insert().is_empty());
}

#[test]
fn reconcile_drops_cells_of_removed_fields() {
    let mut cars = Cars::new();
    cars.catalog.remove_field(cars.color).expect("field exists");

    let schema = cars.schema();
    let rows = cars.db.rows(&schema);
    assert_eq!(rows.reconcile().expect("reconcile"), 4);

    for record in rows.all() {
        assert!(record.stored().cell(cars.color).is_none());
        assert!(record.stored().cell(cars.name).is_some());
    }
}

#[test]
fn update_record_rejects_rows_of_other_tables() {
    let mut cars = Cars::new();
    let database = match cars.catalog.parent(Node::Table(cars.table)) {
        Some(Node::Database(id)) => id,
        other => panic!("unexpected parent {other:?}"),
    };
    let other = cars
        .catalog
        .create_table(database, "Drivers")
        .expect("database exists");
    cars.catalog
        .add_field(other, "Name", FieldKind::text())
        .expect("unique name");

    let cars_schema = cars.schema();
    let drivers_schema = cars
        .db
        .compose(cars.catalog.table(other).expect("table"), ComposeOptions::new());

    let record = cars.db.rows(&cars_schema).get(cars.rows[0]).expect("row exists");
    let result = cars
        .db
        .rows(&drivers_schema)
        .update_record(&record, RowInput::new())
        .map(|record| record.id());

    assert_eq!(
        result,
        Err(RowError::TableMismatch {
            expected: other,
            found: cars.table
        })
    );
}

#[test]
fn tables_keep_independent_row_ids() {
    let mut cars = Cars::new();
    let database = match cars.catalog.parent(Node::Table(cars.table)) {
        Some(Node::Database(id)) => id,
        other => panic!("unexpected parent {other:?}"),
    };
    let other = cars
        .catalog
        .create_table(database, "Drivers")
        .expect("database exists");
    let schema = cars
        .db
        .compose(cars.catalog.table(other).expect("table"), ComposeOptions::new());

    let record = cars.db.rows(&schema).create(RowInput::new()).expect("empty row");
    assert_eq!(record.id(), RowId::new(1));
    assert_eq!(record.display(), "unnamed row 1");

    assert_eq!(cars.db.store().drop_table(other).expect("drop"), 1);
    assert_eq!(cars.db.store().row_count(other), 0);
    assert_eq!(cars.db.store().row_count(cars.table), 4);
}

#[test]
fn writes_through_a_subset_refresh_every_formula() {
    let mut cars = Cars::new();
    let label = cars
        .catalog
        .add_field(
            cars.table,
            "Label",
            FieldKind::formula("upper(field('Name'))", FormulaResultType::Text),
        )
        .expect("unique name");
    let full = cars.schema();
    cars.db.rows(&full).reconcile().expect("reconcile");

    // The formula is exposed, the field it reads is not.
    let without_name = cars.schema_with(ComposeOptions::new().fields([label, cars.color]));
    let record = cars
        .db
        .rows(&without_name)
        .update(cars.rows[0], RowInput::new().set_field(cars.color, "Red"))
        .expect("row exists");
    assert_eq!(record.field(label), Some(&Value::from("BMW")));

    // The field is exposed, the formula reading it is not.
    let only_name = cars.schema_with(ComposeOptions::new().fields([cars.name]));
    let rows = cars.db.rows(&only_name);
    rows.update(cars.rows[0], RowInput::new().set_field(cars.name, "Saab"))
        .expect("row exists");
    let created = rows
        .create(RowInput::new().set_field(cars.name, "Kia"))
        .expect("valid row")
        .id();

    let full_rows = cars.db.rows(&full);
    let saab = full_rows.get(cars.rows[0]).expect("row exists");
    assert_eq!(saab.field(label), Some(&Value::from("SAAB")));
    assert_eq!(saab.field(cars.color), Some(&Value::from("Red")));

    let kia = full_rows.get(created).expect("row exists");
    assert_eq!(kia.field(label), Some(&Value::from("KIA")));
    assert_eq!(kia.stored().cell(cars.price), Some(&Value::Null));
}

#[test]
fn reconcile_through_a_subset_covers_the_whole_table() {
    let mut cars = Cars::new();
    let label = cars
        .catalog
        .add_field(
            cars.table,
            "Label",
            FieldKind::formula("lower(field('Color'))", FormulaResultType::Text),
        )
        .expect("unique name");

    let only_name = cars.schema_with(ComposeOptions::new().field_ids([cars.name]));
    assert_eq!(cars.db.rows(&only_name).reconcile().expect("reconcile"), 4);

    let full = cars.schema();
    let record = cars.db.rows(&full).get(cars.rows[1]).expect("row exists");
    assert_eq!(record.field(label), Some(&Value::from("orange")));
}

struct StoreReadingSink {
    db: Rc<Db>,
    table: TableId,
    counts: RefCell<Vec<usize>>,
}

impl MetricsSink for StoreReadingSink {
    fn record(&self, event: MetricsEvent) {
        if matches!(event, MetricsEvent::RowWrite { .. }) {
            self.counts
                .borrow_mut()
                .push(self.db.store().row_count(self.table));
        }
    }
}

#[test]
fn reconcile_reports_to_sinks_outside_the_write_lock() {
    let mut catalog = Catalog::new();
    let workspace = catalog.create_workspace("Group");
    let database = catalog
        .create_database(workspace, "Application")
        .expect("workspace exists");
    let table = catalog.create_table(database, "Notes").expect("database exists");
    let title = catalog
        .add_field(table, "Title", FieldKind::text())
        .expect("unique name");

    let db = Rc::new(Db::new(EngineConfig::default()));
    let schema = db.compose(catalog.table(table).expect("table exists"), ComposeOptions::new());
    for text in ["one", "two"] {
        db.rows(&schema)
            .create(RowInput::new().set_field(title, text))
            .expect("valid row");
    }

    catalog
        .add_field(
            table,
            "Shout",
            FieldKind::formula("upper(field('Title'))", FormulaResultType::Text),
        )
        .expect("unique name");
    let schema = db.compose(catalog.table(table).expect("table exists"), ComposeOptions::new());

    let sink = Rc::new(StoreReadingSink {
        db: Rc::clone(&db),
        table,
        counts: RefCell::new(Vec::new()),
    });
    let changed = with_metrics_sink(sink.clone(), || db.rows(&schema).reconcile())
        .expect("reconcile");

    assert_eq!(changed, 2);
    assert_eq!(*sink.counts.borrow(), [2, 2]);
}
