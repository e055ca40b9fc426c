use database::Database;
use reddit_client::RedditSearchClient;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use web_api::AppState;
use zenith_core::{AppConfig, CoreError, ErrorExt};

const DEFAULT_LOG_FILTER: &str =
    "zenith=info,web_api=info,database=info,reddit_client=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Zenith Feed");
    tracing::debug!("Configuration: {:?}", config);

    let mut db = Database::new(config.database_url.clone());
    db.connect().await.map_err(|e| {
        e.log_error();
        e
    })?;
    db.run_migrations().await.map_err(|e| {
        e.log_error();
        e
    })?;
    let db = Arc::new(db);

    let posts = RedditSearchClient::from_config(&config)?;
    let state = AppState::new(db.clone(), Arc::new(posts));

    let listener = TcpListener::bind(config.socket_addr()?).await?;
    let result = web_api::serve(listener, state).await;

    db.close().await;
    result
}
