use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging() {
    // Load .env first so RUST_LOG / LOG_FORMAT and the PSQL_* settings apply
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "subscriptions", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "subscriptions",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    info!(service = "subscriptions", event = "config_load", "reading app configuration");
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "subscriptions", event = "config_failed", error = %e, "read app configuration error");
            return ExitCode::FAILURE;
        }
    };
    info!(service = "subscriptions", event = "config_ok", db = %cfg.database.redacted_url(), "reading config OK");

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "subscriptions", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "subscriptions",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "subscription service starting"
    );

    rt.block_on(async move {
        let app = match server::Application::build(&cfg).await {
            Ok(app) => app,
            Err(e) => {
                error!(service = "subscriptions", event = "bootstrap_failed", error = %e, "failed to start");
                return ExitCode::FAILURE;
            }
        };
        let db = app.db();

        tokio::select! {
            res = app.serve() => {
                match res {
                    Ok(()) => {
                        info!(service = "subscriptions", event = "stop", %service_id, pid, "server stopped normally");
                        ExitCode::SUCCESS
                    }
                    Err(e) => {
                        error!(service = "subscriptions", event = "run_failed", error = %e, "server returned error");
                        ExitCode::FAILURE
                    }
                }
            }
            signal = common::shutdown::shutdown_signal() => {
                info!(service = "subscriptions", event = "shutdown_signal", signal, %service_id, pid, "Interrupt signal received. Exiting...");
                // In-flight requests are dropped with the runtime; only the pool is closed.
                if let Err(e) = db.close().await {
                    error!(service = "subscriptions", event = "pool_close_failed", error = %e, "failed to close database pool");
                }
                ExitCode::SUCCESS
            }
        }
    })
}
