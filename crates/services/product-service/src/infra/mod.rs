//! Infrastructure layer - database connection and schema.

pub mod migrations;

pub use migrations::Migrator;

/// Connection handle bound to the products schema.
pub type Database = common::db::Database<Migrator>;
