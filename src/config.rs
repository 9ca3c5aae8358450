// Configuration management for the mock broker

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Underlying price feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_price_seed")]
    pub price_seed: i32,
    #[serde(default = "default_initial_base")]
    pub initial_base: f64,
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    #[serde(default = "default_time_step")]
    pub time_step: f64,          // Noise coordinate advance per tick
    #[serde(default = "default_drift_scale")]
    pub drift_scale: f64,        // Base level drift per tick
    #[serde(default = "default_fast_frequency")]
    pub fast_frequency: f64,     // Coordinate multiplier for the oscillating term
    #[serde(default = "default_price_floor")]
    pub price_floor: f64,
    #[serde(default = "default_price_ceiling")]
    pub price_ceiling: f64,
}

/// Option chain synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_seed")]
    pub noise_seed: i32,
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default = "default_min_spread")]
    pub min_premium_spread: f64,
}

/// Half-open latency window `[min_ms, max_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

/// Order execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_cancel_success_rate")]
    pub cancel_success_rate: f64,
    #[serde(default = "default_open_latency")]
    pub open_latency: LatencyRange,
    #[serde(default = "default_cancel_latency")]
    pub cancel_latency: LatencyRange,
}

/// Collaborator-side quote display settings (PAS derivation and filters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(default = "default_commission")]
    pub commission: f64,
    #[serde(default = "default_min_prob_itm")]
    pub min_prob_itm: u8,
    #[serde(default = "default_min_bid_size")]
    pub min_bid_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub log_ticks: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub quotes: QuoteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default value functions
fn default_tick_interval() -> u64 { 600 }
fn default_price_seed() -> i32 { 42 }
fn default_initial_base() -> f64 { 100.0 }
fn default_volatility() -> f64 { 1.2 }
fn default_time_step() -> f64 { 0.05 }
fn default_drift_scale() -> f64 { 0.35 }
fn default_fast_frequency() -> f64 { 0.25 }
fn default_price_floor() -> f64 { 5.0 }
fn default_price_ceiling() -> f64 { 2000.0 }
fn default_chain_seed() -> i32 { 9001 }
fn default_depth() -> usize { 12 }
fn default_min_spread() -> f64 { 7.0 }
fn default_open_latency() -> LatencyRange { LatencyRange { min_ms: 350, max_ms: 850 } }
fn default_cancel_latency() -> LatencyRange { LatencyRange { min_ms: 250, max_ms: 650 } }
fn default_cancel_success_rate() -> f64 { 0.95 }
fn default_commission() -> f64 { 0.75 }
fn default_min_prob_itm() -> u8 { 80 }
fn default_min_bid_size() -> u32 { 1 }
fn default_log_level() -> String { "info".to_string() }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            price_seed: default_price_seed(),
            initial_base: default_initial_base(),
            volatility: default_volatility(),
            time_step: default_time_step(),
            drift_scale: default_drift_scale(),
            fast_frequency: default_fast_frequency(),
            price_floor: default_price_floor(),
            price_ceiling: default_price_ceiling(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            noise_seed: default_chain_seed(),
            depth: default_depth(),
            min_premium_spread: default_min_spread(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            cancel_success_rate: default_cancel_success_rate(),
            open_latency: default_open_latency(),
            cancel_latency: default_cancel_latency(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            commission: default_commission(),
            min_prob_itm: default_min_prob_itm(),
            min_bid_size: default_min_bid_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_ticks: false,
        }
    }
}

impl BrokerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileRead(format!("{}: {}", path.as_ref().display(), e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BrokerConfig = toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, content)
            .map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// Load configuration from file, or create default if file doesn't exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.to_file(&path)?;
            info!("📁 Created default config file: {}", path.as_ref().display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feed = &self.feed;
        if feed.tick_interval_ms == 0 {
            return Err(ConfigError::Validation("tick_interval_ms must be greater than 0".to_string()));
        }

        let finite_fields = [
            ("feed.initial_base", feed.initial_base),
            ("feed.volatility", feed.volatility),
            ("feed.time_step", feed.time_step),
            ("feed.drift_scale", feed.drift_scale),
            ("feed.fast_frequency", feed.fast_frequency),
            ("feed.price_floor", feed.price_floor),
            ("feed.price_ceiling", feed.price_ceiling),
            ("chain.min_premium_spread", self.chain.min_premium_spread),
        ];
        for (name, value) in finite_fields {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!("{} must be finite, got {}", name, value)));
            }
        }

        if feed.price_floor >= feed.price_ceiling {
            return Err(ConfigError::Validation("price_floor must be below price_ceiling".to_string()));
        }

        if feed.volatility < 0.0 || feed.drift_scale < 0.0 {
            return Err(ConfigError::Validation(
                "volatility and drift_scale must be non-negative".to_string(),
            ));
        }

        if feed.time_step <= 0.0 || feed.fast_frequency <= 0.0 {
            return Err(ConfigError::Validation("time_step and fast_frequency must be positive".to_string()));
        }

        if self.chain.depth == 0 {
            return Err(ConfigError::Validation("chain depth must be greater than 0".to_string()));
        }

        if self.chain.min_premium_spread <= 0.0 {
            return Err(ConfigError::Validation("min_premium_spread must be positive".to_string()));
        }

        for (name, range) in [
            ("open_latency", self.execution.open_latency),
            ("cancel_latency", self.execution.cancel_latency),
        ] {
            if range.min_ms > range.max_ms {
                return Err(ConfigError::Validation(format!(
                    "{}: min_ms ({}) exceeds max_ms ({})",
                    name, range.min_ms, range.max_ms
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.execution.cancel_success_rate) {
            return Err(ConfigError::Validation("cancel_success_rate must be within [0, 1]".to_string()));
        }

        if self.quotes.min_prob_itm > 100 {
            return Err(ConfigError::Validation("min_prob_itm must be a percentage".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(String),

    #[error("Failed to write config file: {0}")]
    FileWrite(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = BrokerConfig::default();
        assert_eq!(config.feed.tick_interval_ms, 600);
        assert_eq!(config.feed.price_seed, 42);
        assert_eq!(config.chain.noise_seed, 9001);
        assert_eq!(config.chain.depth, 12);
        assert_eq!(config.chain.min_premium_spread, 7.0);
        assert_eq!(config.quotes.commission, 0.75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = BrokerConfig::from_toml_str("[chain]\ndepth = 6\n").unwrap();
        assert_eq!(config.chain.depth, 6);
        assert_eq!(config.chain.noise_seed, 9001);
        assert_eq!(config.execution.open_latency, LatencyRange { min_ms: 350, max_ms: 850 });
    }

    #[test]
    fn test_rejects_inverted_latency() {
        let mut config = BrokerConfig::default();
        config.execution.cancel_latency = LatencyRange { min_ms: 700, max_ms: 100 };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_zero_depth_and_bad_rate() {
        let mut config = BrokerConfig::default();
        config.chain.depth = 0;
        assert!(config.validate().is_err());

        let mut config = BrokerConfig::default();
        config.execution.cancel_success_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let result = BrokerConfig::from_toml_str("[feed\nprice_seed = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_non_finite_and_non_positive_frequency() {
        let mut config = BrokerConfig::default();
        config.feed.volatility = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = BrokerConfig::default();
        config.feed.fast_frequency = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = BrokerConfig::default();
        config.feed.drift_scale = f64::INFINITY;
        assert!(config.validate().is_err());
    }
}
