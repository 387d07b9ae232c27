use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use stratus_core::MatchingConfig;
use tracing::{info, warn};
use serde_json::Value;

use crate::app_config::DatabaseConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    rule_key: String,
    rule_value: Value,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Layer `matching_rules` rows over the file-based matching settings
    pub async fn fetch_matching_rules(&self, defaults: MatchingConfig) -> Result<MatchingConfig, sqlx::Error> {
        let rows: Vec<RuleRow> = sqlx::query_as("SELECT rule_key, rule_value FROM matching_rules")
            .fetch_all(&self.pool)
            .await?;

        Ok(apply_rules(defaults, rows.into_iter().map(|r| (r.rule_key, r.rule_value))))
    }
}

/// Expected row format: {"value": <number>}
fn apply_rules(defaults: MatchingConfig, rows: impl IntoIterator<Item = (String, Value)>) -> MatchingConfig {
    let mut rules = defaults;

    for (key, value) in rows {
        match value.get("value").and_then(Value::as_f64) {
            Some(v) => {
                if !rules.set(&key, v) {
                    warn!("Ignoring unknown matching rule '{}'", key);
                }
            }
            None => warn!("Matching rule '{}' has no numeric value", key),
        }
    }

    rules
}
