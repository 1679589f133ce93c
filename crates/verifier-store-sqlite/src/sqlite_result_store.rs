//! `SqliteResultStore` — `ResultStore` implementation backed by `sqlx::SqlitePool`.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::Row;
use tracing::{debug, info};

use verifier_core::{model::ModelRef, result::VerificationResult, Error, Result, ResultStore};

const SCHEMA_VERSION: i32 = 1;

/// A SQLite-backed `ResultStore`. One database file holds every run this
/// process has ever persisted; `verification_results` rows are never
/// mutated after insert, matching `VerificationResult`'s immutability.
pub struct SqliteResultStore {
    pool: SqlitePool,
}

impl SqliteResultStore {
    /// # Errors
    /// - `Error::Store` if the database cannot be opened or migrated.
    pub async fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = expand_tilde(db_path.into())?;
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(Error::Io)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&db_path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal),
            )
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        Self::initialize_schema(&pool).await?;
        info!("opened sqlite result store at {:?}", db_path);
        Ok(Self { pool })
    }

    /// In-memory store, for tests: `sqlite::memory:` persists only for the
    /// lifetime of this pool's single connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().filename(":memory:"))
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        Self::initialize_schema(&pool).await?;
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
        .map_err(|e| Error::Store(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
            .bind(SCHEMA_VERSION)
            .execute(pool)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        let version: i32 = sqlx::query_scalar("SELECT version FROM schema_version")
            .fetch_one(pool)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        if version != SCHEMA_VERSION {
            return Err(Error::Store(format!(
                "unsupported result store schema version: {version}"
            )));
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS verification_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL,
                provider_name TEXT NOT NULL,
                model_id TEXT NOT NULL,
                discovered_at TIMESTAMP NOT NULL,
                finished_at TIMESTAMP NOT NULL,
                overall_score REAL NOT NULL,
                result_json TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_results_run ON verification_results(run_id)",
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_results_model \
             ON verification_results(provider_name, model_id, finished_at DESC)",
        )
        .execute(pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        debug!("result store schema ready (version {SCHEMA_VERSION})");
        Ok(())
    }
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    async fn save_run(&self, run_id: &str, results: &[VerificationResult]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Store(e.to_string()))?;

        for result in results {
            let result_json = serde_json::to_string(result)?;
            sqlx::query(
                r#"
                INSERT INTO verification_results
                    (run_id, provider_name, model_id, discovered_at, finished_at, overall_score, result_json)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(run_id)
            .bind(&result.model_ref.provider_name)
            .bind(&result.model_ref.model_id)
            .bind(result.model_ref.discovered_at)
            .bind(result.finished_at)
            .bind(result.overall_score)
            .bind(result_json)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        }

        tx.commit().await.map_err(|e| Error::Store(e.to_string()))?;
        debug!("saved {} results for run {run_id}", results.len());
        Ok(())
    }

    async fn load_latest(&self, model_ref: &ModelRef) -> Result<Option<VerificationResult>> {
        let row = sqlx::query(
            r#"
            SELECT result_json FROM verification_results
            WHERE provider_name = ? AND model_id = ?
            ORDER BY finished_at DESC
            LIMIT 1
            "#,
        )
        .bind(&model_ref.provider_name)
        .bind(&model_ref.model_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        match row {
            Some(row) => {
                let json: String = row.get("result_json");
                let result: VerificationResult = serde_json::from_str(&json)?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelRef>> {
        let rows = sqlx::query(
            r#"
            SELECT
                provider_name,
                model_id,
                MIN(discovered_at) AS discovered_at,
                MAX(finished_at) AS last_verified_at
            FROM verification_results
            GROUP BY provider_name, model_id
            ORDER BY provider_name, model_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Store(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ModelRef {
                provider_name: row.get("provider_name"),
                model_id: row.get("model_id"),
                discovered_at: row.get("discovered_at"),
                last_verified_at: row.get("last_verified_at"),
            })
            .collect())
    }
}

fn expand_tilde(path: PathBuf) -> Result<PathBuf> {
    if path.starts_with("~") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Store("could not determine home directory".to_string()))?;
        Ok(home.join(path.strip_prefix("~").expect("checked by starts_with")))
    } else {
        Ok(path)
    }
}
