//! Server binary: load configuration, initialize tracing, serve

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use wellmarket::config::AppConfig;
use wellmarket::server::ServerBuilder;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Config is validated at load; a bad split section stops startup here
    let config = match std::env::var("WELLMARKET_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::default(),
    };

    let builder = build_for(&config).await?;

    builder
        .with_split(config.revenue_split())
        .serve(&config.bind_addr())
        .await
}

#[cfg(feature = "postgres")]
async fn build_for(config: &AppConfig) -> Result<ServerBuilder> {
    use wellmarket::storage::postgres;

    match &config.database {
        Some(db) => {
            let pool = postgres::connect(&db.url).await?;
            postgres::migrate(&pool).await?;
            Ok(ServerBuilder::postgres(pool))
        }
        None => Ok(ServerBuilder::in_memory()),
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_for(config: &AppConfig) -> Result<ServerBuilder> {
    if config.database.is_some() {
        tracing::warn!("database configured but the 'postgres' feature is disabled; using the in-memory backend");
    }
    Ok(ServerBuilder::in_memory())
}
