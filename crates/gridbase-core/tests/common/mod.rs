//! Shared fixture for integration tests: the "Cars" table.
#![allow(dead_code)]

use gridbase_core::{
    config::EngineConfig,
    db::{Db, ManualClock, RowInput},
    model::{Catalog, FieldKind},
    schema::{ComposeOptions, Schema},
    types::{FieldId, RowId, TableId},
};
use rust_decimal::Decimal;
use std::sync::Arc;
use time::OffsetDateTime;

pub struct Cars {
    pub catalog: Catalog,
    pub db: Db,
    pub clock: Arc<ManualClock>,
    pub table: TableId,
    pub name: FieldId,
    pub color: FieldId,
    pub price: FieldId,
    pub description: FieldId,
    pub rows: Vec<RowId>,
}

impl Cars {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut catalog = Catalog::new();
        let workspace = catalog.create_workspace("Group");
        let database = catalog
            .create_database(workspace, "Application")
            .expect("workspace exists");
        let table = catalog.create_table(database, "Cars").expect("database exists");

        let name = catalog
            .add_field(table, "Name", FieldKind::text())
            .expect("unique name");
        let color = catalog
            .add_field(table, "Color", FieldKind::text())
            .expect("unique name");
        let price = catalog
            .add_field(table, "Price", FieldKind::number(0))
            .expect("unique name");
        let description = catalog
            .add_field(table, "Description", FieldKind::LongText)
            .expect("unique name");
        catalog.set_primary(name).expect("field exists");

        let clock = Arc::new(ManualClock::new(start()));
        let db = Db::with_clock(config, clock.clone());

        let mut cars = Self {
            catalog,
            db,
            clock,
            table,
            name,
            color,
            price,
            description,
            rows: Vec::new(),
        };

        for (name, color, price, description) in [
            ("BMW", "Blue", 10_000, "Sports car."),
            ("Audi", "Orange", 20_000, "This is the most expensive car we have."),
            ("Volkswagen", "White", 5_000, "A very old car."),
            ("Volkswagen", "Green", 4_000, ""),
        ] {
            let id = cars.insert(
                RowInput::new()
                    .set_field(cars.name, name)
                    .set_field(cars.color, color)
                    .set_field(cars.price, Decimal::from(price))
                    .set_field(cars.description, description),
            );
            cars.rows.push(id);
        }

        cars
    }

    pub fn schema(&self) -> Schema {
        self.schema_with(ComposeOptions::new())
    }

    pub fn attribute_schema(&self) -> Schema {
        self.schema_with(ComposeOptions::new().attribute_names(true))
    }

    pub fn schema_with(&self, options: ComposeOptions) -> Schema {
        let table = self.catalog.table(self.table).expect("table exists");

        self.db.compose(table, options)
    }

    pub fn insert(&self, input: RowInput) -> RowId {
        let schema = self.schema();

        self.db
            .rows(&schema)
            .create(input)
            .expect("valid row")
            .id()
    }

    pub fn key(&self, field: FieldId, op: &str) -> String {
        format!("filter__field_{field}__{op}")
    }
}

/// 2024-03-01 12:00 UTC.
pub fn start() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_709_294_400).expect("valid timestamp")
}
