// Simulation Engine Module
// Synthetic underlying feed, option chain and order execution behind one broker facade

pub mod noise;
pub mod random;
pub mod price_process;
pub mod chain;
pub mod execution_simulator;
pub mod subscribers;
pub mod broker;

pub use noise::NoiseSource;
pub use random::{RandomSource, ScriptedRandom, SharedRandom};
pub use price_process::PriceProcess;
pub use chain::{ChainSynthesizer, OptionQuote};
pub use execution_simulator::{
    fill_probability, CancelOutcome, ExecutionSimulator, OpenOutcome, Order, OrderRequest,
};
pub use subscribers::{SubscriberRegistry, Subscription, TickHandler};
pub use broker::{Broker, Tick};
