use serde::Deserialize;
use std::env;

use crate::network::DEFAULT_EDGE_THRESHOLD;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Like [`parse_env_or`], but also falls back when the parsed value fails `valid`.
fn parse_env_checked<T>(var: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = parse_env_or(var, default);
    if valid(&value) {
        value
    } else {
        tracing::warn!("Out of range value '{}' for {}. Using default {}.", value, var, default);
        default
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub layout: LayoutConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Minimum strength (exclusive) for a pair to become an edge
    pub edge_threshold: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
        }
    }
}

/// Force-directed simulation parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutConfig {
    pub iterations: usize,
    /// Ideal edge length `k`
    pub spring_length: f64,
    pub damping: f64,
    /// Per-iteration cap on how far a node may move
    pub max_displacement: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            spring_length: 50.0,
            damping: 0.9,
            max_displacement: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum number of cached analysis reports
    pub cache_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { cache_size: 256 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "boardnet=info".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let network = NetworkConfig::default();
        let layout = LayoutConfig::default();
        let analysis = AnalysisConfig::default();
        let logging = LoggingConfig::default();

        Self {
            network: NetworkConfig {
                edge_threshold: parse_env_checked(
                    "BOARDNET_EDGE_THRESHOLD",
                    network.edge_threshold,
                    |t| (0.0..1.0).contains(t),
                ),
            },
            layout: LayoutConfig {
                iterations: parse_env_or("BOARDNET_LAYOUT_ITERATIONS", layout.iterations),
                spring_length: parse_env_checked(
                    "BOARDNET_LAYOUT_SPRING_LENGTH",
                    layout.spring_length,
                    |k| k.is_finite() && *k > 0.0,
                ),
                damping: parse_env_checked("BOARDNET_LAYOUT_DAMPING", layout.damping, |d| {
                    *d > 0.0 && *d <= 1.0
                }),
                max_displacement: parse_env_checked(
                    "BOARDNET_LAYOUT_MAX_DISPLACEMENT",
                    layout.max_displacement,
                    |m| m.is_finite() && *m > 0.0,
                ),
            },
            analysis: AnalysisConfig {
                cache_size: parse_env_checked(
                    "BOARDNET_ANALYSIS_CACHE_SIZE",
                    analysis.cache_size,
                    |size| *size > 0,
                ),
            },
            logging: LoggingConfig {
                filter: env::var("BOARDNET_LOG").unwrap_or(logging.filter),
                json: parse_env_or("BOARDNET_LOG_JSON", logging.json),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BOARDNET_EDGE_THRESHOLD",
        "BOARDNET_LAYOUT_ITERATIONS",
        "BOARDNET_LAYOUT_SPRING_LENGTH",
        "BOARDNET_LAYOUT_DAMPING",
        "BOARDNET_LAYOUT_MAX_DISPLACEMENT",
        "BOARDNET_ANALYSIS_CACHE_SIZE",
        "BOARDNET_LOG",
        "BOARDNET_LOG_JSON",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_without_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        let config = Config::from_env();
        assert_eq!(config.network.edge_threshold, 0.3);
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.layout.iterations, 100);
        assert_eq!(config.analysis.cache_size, 256);
        assert_eq!(config.logging.filter, "boardnet=info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_values_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var("BOARDNET_EDGE_THRESHOLD", "0.45");
        std::env::set_var("BOARDNET_LAYOUT_ITERATIONS", "250");
        std::env::set_var("BOARDNET_LAYOUT_DAMPING", "0.5");
        std::env::set_var("BOARDNET_ANALYSIS_CACHE_SIZE", "8");
        std::env::set_var("BOARDNET_LOG", "boardnet=debug");
        std::env::set_var("BOARDNET_LOG_JSON", "true");

        let config = Config::from_env();
        assert_eq!(config.network.edge_threshold, 0.45);
        assert_eq!(config.layout.iterations, 250);
        assert_eq!(config.layout.damping, 0.5);
        assert_eq!(config.layout.spring_length, 50.0);
        assert_eq!(config.analysis.cache_size, 8);
        assert_eq!(config.logging.filter, "boardnet=debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var("BOARDNET_EDGE_THRESHOLD", "1.5");
        std::env::set_var("BOARDNET_LAYOUT_ITERATIONS", "many");
        std::env::set_var("BOARDNET_LAYOUT_DAMPING", "0");
        std::env::set_var("BOARDNET_LAYOUT_MAX_DISPLACEMENT", "-3");
        std::env::set_var("BOARDNET_ANALYSIS_CACHE_SIZE", "0");

        let config = Config::from_env();
        assert_eq!(config.network.edge_threshold, DEFAULT_EDGE_THRESHOLD);
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.analysis.cache_size, 256);

        clear_env();
    }
}
