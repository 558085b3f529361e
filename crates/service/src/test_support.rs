#![cfg(test)]
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tokio::sync::OnceCell;

use configs::AppConfig;
use models::db::connect_with_config;

// Ensure the table exists only once across the entire test process
static SCHEMA_READY: OnceCell<()> = OnceCell::const_new();

/// Connection to the database named by `DATABASE_URL` (or `PSQL_*`), with the
/// `subscriptions` table created. `None` when no database is configured or
/// `SKIP_DB_TESTS` is set.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() && std::env::var("PSQL_NAME").is_err() {
        eprintln!("skip: no DATABASE_URL or PSQL_NAME configured");
        return Ok(None);
    }

    let mut cfg = AppConfig::default();
    cfg.apply_env_with(|key| std::env::var(key).ok())?;
    cfg.normalize_and_validate()?;
    let mut db_cfg = cfg.database;
    db_cfg.max_connections = db_cfg.max_connections.max(10);
    db_cfg.acquire_timeout_secs = 10;

    let db = connect_with_config(&db_cfg).await?;
    SCHEMA_READY
        .get_or_try_init(|| async {
            db.execute_unprepared(models::SCHEMA_SQL).await.map(|_| ())
        })
        .await?;
    Ok(Some(db))
}
