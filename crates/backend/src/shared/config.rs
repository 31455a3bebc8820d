use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dashboards::d402_sales_dashboard::pipeline::EmptySelectionPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FiltersConfig {
    #[serde(default)]
    pub empty_selection: EmptySelectionPolicy,
    #[serde(default = "default_top_states")]
    pub top_states: usize,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            empty_selection: EmptySelectionPolicy::default(),
            top_states: default_top_states(),
        }
    }
}

fn default_top_states() -> usize {
    20
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[dataset]
path = "data/superstore.csv"

[server]
host = "0.0.0.0"
port = 3000

[filters]
empty_selection = "exclude_all"
top_states = 20
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Get the dataset file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_dataset_path(config: &Config) -> PathBuf {
    let dataset_path = Path::new(&config.dataset.path);

    if dataset_path.is_absolute() {
        return dataset_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(dataset_path);
        }
    }

    // Fallback: relative to current directory
    dataset_path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.dataset.path, "data/superstore.csv");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.filters.empty_selection, EmptySelectionPolicy::ExcludeAll);
        assert_eq!(config.filters.top_states, 20);
    }

    #[test]
    fn test_optional_sections_fall_back_to_defaults() {
        let config = parse_config(
            r#"
            [dataset]
            path = "/srv/data/orders.csv"

            [filters]
            empty_selection = "no_constraint"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.filters.empty_selection, EmptySelectionPolicy::NoConstraint);
        assert_eq!(config.filters.top_states, 20);
        assert_eq!(get_dataset_path(&config), PathBuf::from("/srv/data/orders.csv"));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = parse_config(
            r#"
            [dataset]
            path = "x.csv"

            [filters]
            empty_selection = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }
}
