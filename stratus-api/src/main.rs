use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use stratus_api::{app, AppState};
use stratus_core::EmptyLegSearch;
use stratus_store::{app_config::Config, DbClient, PostgresEmptyLegRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stratus_api=debug,stratus_core=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting StratusConnect matching API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let matching = db
        .fetch_matching_rules(config.matching.clone())
        .await
        .context("Failed to load matching rules")?;
    matching.validate().map_err(anyhow::Error::msg)?;

    let repo = Arc::new(PostgresEmptyLegRepository::new(db.pool.clone()));
    let search = EmptyLegSearch::new(repo, matching).with_fetch_timeout(config.search.fetch_timeout());

    let app = app(AppState::new(search));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
