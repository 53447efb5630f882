use std::sync::Arc;

use cinedex::{AppState, config::Config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinedex=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.addr;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let state = Arc::new(AppState::new(config, db));

    let promoted = state.store.promote_staff(&state.config.staff_emails).await?;
    if promoted > 0 {
        tracing::info!(promoted, "granted staff to configured accounts");
    }
    let purged = state.store.purge_expired_sessions().await?;
    tracing::debug!(purged, "expired sessions removed");

    let app = cinedex::app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
