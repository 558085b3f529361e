use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::{info, warn};

/// Open a pool with the sizing and timeouts from `cfg`. Single attempt.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opt).await?;
    Ok(db)
}

/// Bootstrap the pool: up to `connect_attempts` tries, each bounded by
/// `connect_timeout_secs`, with a fixed delay in between, then a ping.
pub async fn connect_with_retry(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    info!(url = %cfg.redacted_url(), "connecting to database");
    let attempt_timeout = Duration::from_secs(cfg.connect_timeout_secs);
    let delay = Duration::from_secs(cfg.connect_retry_delay_secs);

    let db = with_tries(cfg.connect_attempts, delay, || async move {
        tokio::time::timeout(attempt_timeout, connect_with_config(cfg))
            .await
            .map_err(|_| anyhow!("connect attempt timed out after {}s", attempt_timeout.as_secs()))?
    })
    .await?;
    info!("creating new pool OK");

    db.ping().await?;
    info!(backend = ?db.get_database_backend(), "database ping OK");
    Ok(db)
}

/// Run `op` until it succeeds or `attempts` runs out, sleeping `delay`
/// between failures. Returns the last error.
pub async fn with_tries<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt, attempts, error = %e, "attempt failed");
                last_err = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("no attempts configured")))
}
