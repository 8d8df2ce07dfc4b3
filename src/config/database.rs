//! Database configuration module for the wallet ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! The ledger keeps all of its state in a single key/value table whose schema is
//! generated from the entity definition with `Schema::create_table_from_entity`,
//! so the table always matches the Rust struct.

use crate::entities::LocalState;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/wallet_ledger.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// A `.env` file is loaded first if present; a missing file is not an error.
#[must_use]
pub fn get_database_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::info!("Connecting to {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the key/value table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut local_state_table = schema.create_table_from_entity(LocalState);
    local_state_table.if_not_exists();

    db.execute(builder.build(&local_state_table)).await?;

    Ok(())
}

/// Connects and prepares the schema in one step.
pub async fn init_database() -> Result<DatabaseConnection> {
    let db = create_connection().await?;
    create_tables(&db).await?;
    Ok(db)
}
