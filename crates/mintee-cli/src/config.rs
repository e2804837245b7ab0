use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    /// Database file path; MINTEE_DATABASE_PATH overrides the TOML value.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Defaults for the stats command's date range
#[derive(Deserialize, Debug)]
pub struct StatsConfig {
    /// How many days before today the default range starts
    pub window_days: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("MINTEE_"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            stats: StatsConfig::default(),
        }
    }
}
