// Mock Broker Library
//
// Simulated brokerage feed: a noise-driven underlying price, a synthetic put chain
// derived from it, and order placement/cancellation with latency and probabilistic fills

pub mod config;
pub mod error;       // Unified error handling
pub mod simulation;
pub mod pas;         // Collaborator-side PAS derivation
pub mod progress;

// Re-export simulation types
pub use simulation::{
    fill_probability, Broker, CancelOutcome, ChainSynthesizer, ExecutionSimulator, NoiseSource,
    OpenOutcome, OptionQuote, Order, OrderRequest, PriceProcess, RandomSource, ScriptedRandom,
    SharedRandom, Subscription, Tick,
};

// Re-export error types
pub use error::{BrokerError, BrokerResult};

// Re-export configuration
pub use config::{
    BrokerConfig, ChainConfig, ConfigError, ExecutionConfig, FeedConfig, LatencyRange,
    LoggingConfig, QuoteConfig,
};

pub use pas::{derive_pas, filter_quotes, pas_bounds, PasBounds, PasQuote};
