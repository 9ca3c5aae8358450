// Common test utilities and helpers

use mock_broker::{BrokerConfig, OptionQuote, SharedRandom};

/// Default configuration; latencies are real but tests run on tokio's paused clock
pub fn create_test_config() -> BrokerConfig {
    BrokerConfig::default()
}

/// Quote with a given bid/ask and size, struck at 101
pub fn make_quote(bid: f64, ask: f64, bid_size: u32) -> OptionQuote {
    OptionQuote {
        id: OptionQuote::id_for_strike(101.0),
        strike: 101.0,
        bid_size,
        prob_itm: 90,
        ask_premium: ask,
        bid_premium: bid,
    }
}

/// Random source replaying `values` in a loop
pub fn scripted(values: &[f64]) -> SharedRandom {
    SharedRandom::scripted(values.to_vec())
}

/// Underlying prices spanning the clamp band
pub fn sample_underlyings() -> Vec<f64> {
    vec![5.0, 12.34, 49.99, 100.0, 101.5, 250.0, 777.77, 1_234.5, 2_000.0]
}
