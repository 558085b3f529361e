use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use sea_orm::DatabaseConnection;
use service::subscription::{SeaOrmSubscriptionRepository, SubscriptionService};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// A bound listener plus the router and pool it serves.
pub struct Application {
    listener: TcpListener,
    router: Router,
    db: DatabaseConnection,
}

impl Application {
    /// Bootstrap the pool (with retries), wire the service and bind the listener.
    pub async fn build(cfg: &AppConfig) -> anyhow::Result<Self> {
        let db = models::db::connect_with_retry(&cfg.database).await?;

        let repo = SeaOrmSubscriptionRepository::new(db.clone());
        let state = ServerState { subscriptions: SubscriptionService::new(Arc::new(repo)) };
        let router = routes::build_router(state, build_cors());

        let addr = cfg.server.bind_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening");
        Ok(Self { listener, router, db })
    }

    /// Handle to the pool, for closing it at shutdown.
    pub fn db(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Serve until the listener fails.
    pub async fn serve(self) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}

/// Build from the given config and serve; for callers that do not need the pool handle.
pub async fn run(cfg: &AppConfig) -> anyhow::Result<()> {
    Application::build(cfg).await?.serve().await
}
