// Underlying price process
// Slow unbounded drift on a base level plus a faster oscillating term, clamped to a price band

use crate::config::FeedConfig;
use crate::simulation::noise::NoiseSource;

#[derive(Debug, Clone)]
pub struct PriceProcess {
    noise: NoiseSource,
    t: f64,
    base: f64,
    last_price: Option<f64>,
    config: FeedConfig,
}

impl PriceProcess {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            noise: NoiseSource::new(config.price_seed),
            t: 0.0,
            base: config.initial_base,
            last_price: None,
            config,
        }
    }

    /// Advance one tick and return the new clamped price.
    ///
    /// `base` keeps accumulating drift with no mean reversion and is never
    /// pulled back by the clamp, so it may sit outside the visible band.
    pub fn advance(&mut self) -> f64 {
        self.t += self.config.time_step;
        self.base += self.noise.sample(self.t) * self.config.drift_scale;

        let fast = self.noise.sample(self.t * self.config.fast_frequency) * self.config.volatility;
        let price = (self.base + fast).clamp(self.config.price_floor, self.config.price_ceiling);

        self.last_price = Some(price);
        price
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn clock(&self) -> f64 {
        self.t
    }

    /// Price from the most recent `advance`, if any
    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_advances_clock_and_drifts_base() {
        let mut process = PriceProcess::new(FeedConfig::default());
        let noise = NoiseSource::new(42);

        let price = process.advance();

        let expected_base = 100.0 + noise.sample(0.05) * 0.35;
        let expected = (expected_base + noise.sample(0.05 * 0.25) * 1.2).clamp(5.0, 2000.0);
        assert!((process.clock() - 0.05).abs() < 1e-12);
        assert!((process.base() - expected_base).abs() < 1e-12);
        assert!((price - expected).abs() < 1e-12);
        assert_eq!(process.last_price(), Some(price));
    }

    #[test]
    fn test_same_seed_same_path() {
        let mut a = PriceProcess::new(FeedConfig::default());
        let mut b = PriceProcess::new(FeedConfig::default());
        for _ in 0..500 {
            assert_eq!(a.advance(), b.advance());
        }
    }

    #[test]
    fn test_clamp_does_not_touch_base() {
        let config = FeedConfig {
            initial_base: 3_000.0,
            ..FeedConfig::default()
        };
        let mut process = PriceProcess::new(config);
        for _ in 0..50 {
            assert_eq!(process.advance(), 2_000.0);
        }
        assert!(process.base() > 2_000.0);
    }

    #[test]
    fn test_floor_clamp() {
        let config = FeedConfig {
            initial_base: -50.0,
            ..FeedConfig::default()
        };
        let mut process = PriceProcess::new(config);
        assert_eq!(process.advance(), 5.0);
    }
}
