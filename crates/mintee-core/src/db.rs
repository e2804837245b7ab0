use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::error::CoreError;

pub type DbPool = SqlitePool;

/// Opens (creating if missing) the SQLite database at `database_url` and
/// runs pending migrations. Accepts plain paths, `sqlite:` URLs, and
/// `sqlite::memory:`.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, CoreError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(CoreError::Database)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_creates_and_migrates() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        let pool = establish_connection(&db_path.to_string_lossy())
            .await
            .unwrap();
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 0);
    }
}
