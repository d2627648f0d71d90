use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::Character;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum FavoritesError {
    /// Another instance holds the database lock
    #[error("Another instance of roster appears to be running. Please close it and try again.")]
    InstanceLocked,

    #[error("Favorites migration failed: {0}")]
    Migration(String),

    #[error("Favorites database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored favorite is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

impl FavoritesError {
    fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
        {
            return FavoritesError::InstanceLocked;
        }
        FavoritesError::Database(err)
    }
}

// ============================================================================
// Database
// ============================================================================

/// SQLite persistence for favorites.
///
/// Each row stores the full character as JSON so the favorites set can be
/// rebuilt at startup without a network round trip.
#[derive(Clone)]
pub struct FavoritesDb {
    pool: SqlitePool,
}

impl FavoritesDb {
    /// Open (creating if needed) the favorites database and run migrations.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub async fn open(path: &str) -> Result<Self, FavoritesError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(FavoritesError::from_sqlx)?
            .pragma("busy_timeout", "5000");

        // Every in-memory connection is its own database, so pin to one.
        let max_connections = if path == ":memory:" { 1 } else { 2 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(FavoritesError::from_sqlx)?;

        let db = Self { pool };
        db.migrate().await.map_err(|e| match FavoritesError::from_sqlx(e) {
            FavoritesError::Database(inner) => FavoritesError::Migration(inner.to_string()),
            locked => locked,
        })?;
        tracing::debug!(path = %path, "Opened favorites database");
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id INTEGER PRIMARY KEY,
                payload TEXT NOT NULL,
                added_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_favorites_added ON favorites(added_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All stored favorites, oldest first.
    pub async fn load_all(&self) -> Result<Vec<Character>, FavoritesError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT payload FROM favorites ORDER BY added_at, rowid")
                .fetch_all(&self.pool)
                .await?;

        let mut characters = Vec::with_capacity(rows.len());
        for (payload,) in rows {
            match serde_json::from_str::<Character>(&payload) {
                Ok(character) => characters.push(character),
                // One corrupt row should not hide every other favorite
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable favorite row"),
            }
        }
        Ok(characters)
    }

    /// Store a favorite. Re-inserting an id keeps its original `added_at`.
    pub async fn insert(&self, character: &Character) -> Result<(), FavoritesError> {
        let payload = serde_json::to_string(character)?;
        sqlx::query(
            r#"
            INSERT INTO favorites (id, payload, added_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET payload = excluded.payload
        "#,
        )
        .bind(character.id as i64)
        .bind(payload)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), FavoritesError> {
        sqlx::query("DELETE FROM favorites WHERE id = ?")
            .bind(id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every favorite, returning how many rows went away.
    pub async fn clear(&self) -> Result<u64, FavoritesError> {
        let result = sqlx::query("DELETE FROM favorites")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> FavoritesDb {
        FavoritesDb::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_on_open() {
        let db = test_db().await;
        assert!(db.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let db = test_db().await;
        db.insert(&Character::new(1, "Rick Sanchez")).await.unwrap();
        db.insert(&Character::new(2, "Morty Smith")).await.unwrap();

        let loaded = db.load_all().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], Character::new(1, "Rick Sanchez"));
        assert_eq!(loaded[1].id, 2);
    }

    #[tokio::test]
    async fn test_insert_same_id_upserts() {
        let db = test_db().await;
        db.insert(&Character::new(1, "Rick")).await.unwrap();
        db.insert(&Character::new(1, "Rick Sanchez")).await.unwrap();

        let loaded = db.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Rick Sanchez");
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let db = test_db().await;
        for id in 1..=3 {
            db.insert(&Character::new(id, format!("Character {id}")))
                .await
                .unwrap();
        }

        db.delete(2).await.unwrap();
        let ids: Vec<u64> = db.load_all().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(db.clear().await.unwrap(), 2);
        assert!(db.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_skipped() {
        let db = test_db().await;
        db.insert(&Character::new(1, "Rick Sanchez")).await.unwrap();
        sqlx::query("INSERT INTO favorites (id, payload, added_at) VALUES (5, 'not json', 0)")
            .execute(&db.pool)
            .await
            .unwrap();

        let loaded = db.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 1);
    }
}
