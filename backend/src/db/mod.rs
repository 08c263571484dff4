pub mod models;
pub mod repo;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::time::Duration;

/// Opens the pool and makes sure the schema exists.
///
/// Every connection to an in-memory SQLite URL (`sqlite::memory:` or
/// `mode=memory`) is its own database, so those get a single connection that
/// is never recycled.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    let pool = options.connect(url).await?;
    repo::create_user_table(&pool).await?;

    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
