use anyhow::Context;
use tokio::net::TcpListener;

use bloodconnect_config::ServerConfig;

use super::seeder::{bootstrap_admin, seed_users};
use crate::server::init_router;
use crate::state::init_app_state;

/// Runs the reference backend until the process is stopped.
pub async fn run(seed: usize, admin: Option<String>) -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env();
    let state = init_app_state();

    if seed > 0 {
        seed_users(&state.users, seed).await?;
    }
    if let Some(admin) = admin.as_deref() {
        bootstrap_admin(&state.users, admin).await?;
    }

    let app = init_router(state);

    #[cfg(feature = "observability")]
    let app = match bloodconnect_observability::init_metrics() {
        Some(handle) => app.merge(bloodconnect_observability::metrics_app(handle)),
        None => app,
    };

    let listener = TcpListener::bind(&server_config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.bind_addr))?;
    tracing::info!(addr = %server_config.bind_addr, "Backend listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
