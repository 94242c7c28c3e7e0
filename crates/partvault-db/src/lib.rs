//! Database repositories for the reference index
//!
//! The reference index is the persistent many-to-many mapping between
//! component identifiers and stored files, plus a registry of stored-file
//! metadata. Repositories use runtime sqlx queries over SQLite; all
//! multi-statement mutations run inside transactions.

pub mod db;

pub use db::files::FileRepository;
pub use db::references::{ComponentFileRow, ReferenceRepository};

/// Run the embedded schema migrations.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
