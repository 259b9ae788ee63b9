use std::net::SocketAddr;
use std::sync::Arc;

use roost_api::{app, worker, AppState, AuthSettings};
use roost_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost_api=debug,roost_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = roost_store::Config::load()?;
    if config.auth.jwt_secret.len() < 32 {
        anyhow::bail!("auth.jwt_secret must be at least 32 characters");
    }

    tracing::info!(port = config.server.port, "starting roost api");

    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store,
        AuthSettings {
            secret: config.auth.jwt_secret.clone(),
            expiration_seconds: config.auth.jwt_expiration_seconds,
        },
        &config.booking,
    );

    let _sweeper = worker::spawn_expiration_sweeper(&state, &config.booking);

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
