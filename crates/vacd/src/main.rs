use std::sync::Arc;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vac_api::{ApiOptions, AppState};
use vac_observe::init_logger;
use vac_prometheus::PrometheusMetrics;
use vac_store::Store;

mod config;
use config::Config;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) config + logger
    let config = Config::from_env()?;
    init_logger(&config.logger)?;
    info!(bind = %config.bind, backend = config.auth_backend.as_str(), "starting");

    // 2) session secret
    let secret = match config.secret {
        Some(secret) => secret,
        None => {
            warn!("VACD_SECRET is not set; using a generated secret, sessions will not survive a restart");
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(48)
                .map(char::from)
                .collect()
        }
    };

    // 3) store + migrations
    let store = Arc::new(Store::open(&config.db_path)?);
    info!(path = %config.db_path.display(), "store ready");

    // 4) metrics
    let prometheus = Arc::new(PrometheusMetrics::new()?);

    // 5) application
    let state = AppState::new(
        store,
        ApiOptions {
            secret,
            auth_backend: config.auth_backend,
            pam_service: config.pam_service,
            admin_users: config.admin_users,
            registration_token: config.registration_token,
            public_url: config.public_url,
        },
        Some(prometheus),
    );
    let app = vac_api::router(state);

    // 6) serve until ctrl-c
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("stopped");
    Ok(())
}
