mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smart_scheduler::session::{LogNavigator, SessionStore, SqliteTokenStore, TokenCell};
use smart_scheduler::{ClientConfig, HttpApiClient, SchedulerApi};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "smart_scheduler=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new_from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.as_str());
    }

    let token_cell = TokenCell::default();
    let api: Arc<dyn SchedulerApi> =
        Arc::new(HttpApiClient::new(&config, Arc::new(token_cell.clone()))?);
    let tokens = Arc::new(SqliteTokenStore::connect(&config.token_db_url).await?);
    let session = SessionStore::new(api.clone(), tokens, token_cell, Arc::new(LogNavigator));

    cli::run(cli.command, api, &session).await
}
