use serde::Deserialize;
use std::env;
use std::time::Duration;
use stratus_core::MatchingConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout_secs() -> u64 { 3 }

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_fetch_timeout_ms() -> u64 { 5000 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self { fetch_timeout_ms: default_fetch_timeout_ms() }
    }
}

impl SearchConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment overlay is optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. STRATUS__MATCHING__FUEL_COST_PER_KM=6.5
            .add_source(config::Environment::with_prefix("STRATUS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse(
            r#"
            [server]
            port = 9000

            [database]
            url = "postgres://localhost/stratus"
            "#,
        );
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.search.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.matching.exact_radius_km, 50.0);
        assert_eq!(cfg.matching.cruise_speed_kmh, 420.0);
    }

    #[test]
    fn test_matching_overrides_from_file() {
        let cfg = parse(
            r#"
            [server]
            port = 9000

            [database]
            url = "postgres://localhost/stratus"

            [search]
            fetch_timeout_ms = 750

            [matching]
            fuel_cost_per_km = 7.25
            backhaul_radius_km = 150.0
            "#,
        );
        assert_eq!(cfg.search.fetch_timeout(), Duration::from_millis(750));
        assert_eq!(cfg.matching.fuel_cost_per_km, 7.25);
        assert_eq!(cfg.matching.backhaul_radius_km, 150.0);
        assert_eq!(cfg.matching.reroute_revenue_share, 0.70);
    }
}
