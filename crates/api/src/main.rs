use std::sync::Arc;

use anyhow::Context;

use catalog_api::app::{AppServices, build_app};
use catalog_infra::CatalogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = CatalogConfig::from_env().context("refusing to start with invalid configuration")?;
    let services = Arc::new(
        AppServices::from_config(&config).context("failed to wire catalogue services")?,
    );

    // Expired pages would otherwise linger until their key is requested again.
    let _janitor = services.catalog().cache().spawn_janitor(config.cache_ttl);

    let app = build_app(Arc::clone(&services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        max_page_size = config.max_page_size,
        currencies = ?services.catalog().currencies().codes(),
        "catalogue listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
