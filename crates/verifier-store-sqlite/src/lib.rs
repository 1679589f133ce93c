//! SQLite-backed `ResultStore` for single-host verifier deployments.
//!
//! Persists each run's `VerificationResult`s as JSON blobs alongside the
//! indexed columns (`provider_name`, `model_id`, `finished_at`, `run_id`)
//! needed to serve `load_latest` and `list_models` without deserializing
//! every row.
//!
//! ```no_run
//! # use verifier_store_sqlite::SqliteResultStore;
//! # use verifier_core::ResultStore;
//! # async fn example() -> verifier_core::Result<()> {
//! let store = SqliteResultStore::new("~/.verifier/results.db").await?;
//! let models = store.list_models().await?;
//! # Ok(())
//! # }
//! ```

mod sqlite_result_store;

pub use sqlite_result_store::SqliteResultStore;
