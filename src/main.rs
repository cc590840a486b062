use anyhow::Context;
use std::sync::Arc;

use entitybroker::{
    config::{load_providers, CliArgs},
    create_router, observability,
    services::EntityBroker,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init()?;

    let args = CliArgs::parse()?;
    let broker = EntityBroker::new(args.server_url.clone());
    let registered = load_providers(&broker, args.providers.as_deref())?;
    tracing::info!(providers = registered, server_url = %args.server_url, "Loaded entity providers");

    let app = create_router(Arc::new(AppState::new(broker)));

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
