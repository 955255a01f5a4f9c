//! Agora server binary: assembles configuration, storage, and the HTTP
//! surface based on compile-time features.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api_adapters::build_router;
use services::ForumService;
use storage_adapters::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configs::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log.filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let service = build_service(&config).await?;
    let app = build_router(service);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "agora listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

async fn build_service(config: &configs::AppConfig) -> anyhow::Result<Arc<ForumService>> {
    #[cfg(feature = "db-postgres")]
    if let Some(url) = &config.database.url {
        use secrecy::ExposeSecret;
        use storage_adapters::PgStore;

        let store = Arc::new(PgStore::connect(url.expose_secret()).await?);
        return Ok(Arc::new(ForumService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )));
    }

    #[cfg(not(feature = "db-postgres"))]
    if config.database.url.is_some() {
        tracing::warn!("database.url is set but the db-postgres feature is not compiled in");
    }

    let store = Arc::new(MemoryStore::new());
    Ok(Arc::new(ForumService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
    )))
}
