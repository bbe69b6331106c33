//! Durable original↔tag mapping table

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use tracing::{debug, warn};

use veil_core::{Error, Result, mint_tag};

/// How many fresh tags to try before giving up on a UNIQUE collision.
/// With 8 hex chars per tag, more than one retry is already vanishingly rare.
const MAX_MINT_ATTEMPTS: u32 = 8;

/// Key-indexed table of (original value ↔ tag), queryable in both directions.
///
/// `original` is the primary key: re-redacting the same value updates its tag
/// instead of creating a duplicate. `tag` carries a UNIQUE constraint so two
/// originals can never share a tag, which keeps reverse lookup unambiguous.
pub struct MappingStore {
    pool: SqlitePool,
}

impl MappingStore {
    /// Open (and if needed create) the mapping database at `db_path`.
    ///
    /// Schema creation is idempotent; opening an existing database verifies
    /// the schema version.
    ///
    /// # Errors
    /// - `Error::Database` if the database cannot be opened or created
    pub async fn open(db_path: &Path) -> Result<Self> {
        // Create directory if needed
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(db_path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal),
            )
            .await
            .map_err(|e| Error::Database(format!("Failed to open mapping store: {}", e)))?;

        Self::initialize_schema(&pool).await?;

        // Verify schema version
        let version: i32 = sqlx::query_scalar("SELECT version FROM schema_version")
            .fetch_one(&pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if version != 1 {
            return Err(Error::Database(format!(
                "Unsupported schema version: {}",
                version
            )));
        }

        debug!("Opened mapping store at {:?}", db_path);
        Ok(Self { pool })
    }

    async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (1)")
            .execute(pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS redactions (
                original TEXT PRIMARY KEY,
                tag TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Exact-string lookup: the tag assigned to `original`, if any.
    pub async fn get_tag(&self, original: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT tag FROM redactions WHERE original = ?1")
            .bind(original)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Exact-string reverse lookup: the original behind `tag`, if known.
    pub async fn get_original(&self, tag: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT original FROM redactions WHERE tag = ?1")
            .bind(tag)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Insert a new record or replace the tag for an existing original.
    pub async fn upsert(&self, original: &str, tag: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO redactions (original, tag) VALUES (?1, ?2)
            ON CONFLICT(original) DO UPDATE SET tag = excluded.tag
            "#,
        )
        .bind(original)
        .bind(tag)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomic lookup-or-create: return the existing tag for `original`, or
    /// mint, persist and return a fresh one.
    ///
    /// This is a single INSERT .. ON CONFLICT .. RETURNING statement, so two
    /// concurrent callers assigning a tag to the same unseen original both
    /// receive whichever tag the statement-level winner inserted. A minted
    /// tag that collides with another row's tag fails the UNIQUE constraint
    /// and is retried with a fresh mint.
    pub async fn assign_tag(&self, original: &str) -> Result<String> {
        for attempt in 0..MAX_MINT_ATTEMPTS {
            let candidate = mint_tag();
            let result: std::result::Result<String, sqlx::Error> = sqlx::query_scalar(
                r#"
                INSERT INTO redactions (original, tag) VALUES (?1, ?2)
                ON CONFLICT(original) DO UPDATE SET tag = redactions.tag
                RETURNING tag
                "#,
            )
            .bind(original)
            .bind(&candidate)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(tag) => return Ok(tag),
                Err(e) => {
                    let is_tag_collision = e
                        .as_database_error()
                        .is_some_and(|db| db.is_unique_violation());
                    if is_tag_collision {
                        warn!(
                            attempt,
                            "Minted tag collided with an existing tag, re-minting"
                        );
                        continue;
                    }
                    return Err(Error::Database(e.to_string()));
                }
            }
        }

        Err(Error::Database(format!(
            "Could not mint a unique tag after {} attempts",
            MAX_MINT_ATTEMPTS
        )))
    }

    /// Every original ever stored, in implementation-defined order.
    pub async fn list_originals(&self) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT original FROM redactions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Release the connection pool. Dropping the store has the same effect;
    /// this just makes the release point explicit.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
