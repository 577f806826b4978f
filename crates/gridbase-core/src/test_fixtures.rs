//! Shared in-crate fixture: a "Cars" table with a handful of rows.

use crate::{
    db::{Db, ManualClock, RowInput},
    model::{Catalog, FieldKind, Table},
    schema::{ComposeOptions, Schema},
    types::{FieldId, RowId, TableId},
};
use rust_decimal::Decimal;
use std::sync::Arc;
use time::OffsetDateTime;

pub(crate) struct Cars {
    pub(crate) catalog: Catalog,
    pub(crate) db: Db,
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) table: TableId,
    pub(crate) name: FieldId,
    pub(crate) color: FieldId,
    pub(crate) price: FieldId,
    pub(crate) description: FieldId,
    pub(crate) rows: Vec<RowId>,
}

impl Cars {
    /// BMW, Audi, White VW, Green VW, in that row order.
    pub(crate) fn new() -> Self {
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

        let clock = Arc::new(ManualClock::new(start_of_fixture()));
        let db = Db::with_clock(Default::default(), clock.clone());

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
            let input = RowInput::new()
                .set_field(cars.name, name)
                .set_field(cars.color, color)
                .set_field(cars.price, Decimal::from(price))
                .set_field(cars.description, description);
            let schema = cars.schema();
            let id = cars
                .db
                .rows(&schema)
                .create(input)
                .expect("fixture row is valid")
                .id();
            cars.rows.push(id);
        }

        cars
    }

    pub(crate) fn table(&self) -> &Table {
        self.catalog.table(self.table).expect("table exists")
    }

    pub(crate) fn schema(&self) -> Schema {
        self.schema_with(ComposeOptions::new())
    }

    pub(crate) fn attribute_schema(&self) -> Schema {
        self.schema_with(ComposeOptions::new().attribute_names(true))
    }

    pub(crate) fn schema_with(&self, options: ComposeOptions) -> Schema {
        self.db.compose(self.table(), options)
    }
}

/// 2024-03-01 12:00 UTC.
pub(crate) fn start_of_fixture() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_709_294_400).expect("valid timestamp")
}
