pub mod migrations;
pub mod store;

pub use migrations::{SchemaStep, latest_schema_version, schema_steps};
pub use store::SqliteStore;
