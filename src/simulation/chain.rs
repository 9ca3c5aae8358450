// Option chain synthesis
// Builds a ladder of put contracts struck above the underlying with a guaranteed minimum spread

use crate::config::ChainConfig;
use crate::error::{BrokerError, BrokerResult};
use crate::simulation::noise::NoiseSource;
use crate::simulation::random::RandomSource;
use serde::{Deserialize, Serialize};

const STRIKE_OFFSET: f64 = 1.01;
const ASK_CEILING: f64 = 1000.0;
const ASK_FLOOR: f64 = 0.05;
const BID_FLOOR: f64 = 0.01;
const TICK: f64 = 0.01;
const PROB_ITM_PCT_MIN: u8 = 50;
const PROB_ITM_PCT_MAX: u8 = 99;

/// One quoted contract. Regenerated every tick; `id` is derived from the strike only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub id: String,
    pub strike: f64,
    pub bid_size: u32,
    pub prob_itm: u8,
    pub ask_premium: f64,
    pub bid_premium: f64,
}

impl OptionQuote {
    pub fn id_for_strike(strike: f64) -> String {
        format!("put-{}", strike)
    }

    /// Reject snapshots the execution simulator cannot price
    pub fn validate(&self) -> BrokerResult<()> {
        if self.id.is_empty() {
            return Err(BrokerError::invalid("option.id", "must not be empty"));
        }
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(BrokerError::invalid("option.strike", format!("{} is not a positive price", self.strike)));
        }
        if !self.ask_premium.is_finite() || !self.bid_premium.is_finite() {
            return Err(BrokerError::invalid("option.premium", "bid and ask must be finite"));
        }
        if self.bid_premium < 0.0 || self.ask_premium < 0.0 {
            return Err(BrokerError::invalid("option.premium", "bid and ask must be non-negative"));
        }
        if self.bid_premium >= self.ask_premium {
            return Err(BrokerError::invalid(
                "option.premium",
                format!("bid {} must be below ask {}", self.bid_premium, self.ask_premium),
            ));
        }
        if self.prob_itm > 100 {
            return Err(BrokerError::invalid("option.prob_itm", format!("{} is not a percentage", self.prob_itm)));
        }
        Ok(())
    }

    pub fn spread(&self) -> f64 {
        self.ask_premium - self.bid_premium
    }
}

/// Deterministic chain builder; the only non-seeded input is the per-strike size draw
#[derive(Debug, Clone)]
pub struct ChainSynthesizer {
    noise: NoiseSource,
    depth: usize,
    min_spread: f64,
}

impl ChainSynthesizer {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            noise: NoiseSource::new(config.noise_seed),
            depth: config.depth,
            min_spread: config.min_premium_spread,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn first_strike(underlying: f64) -> f64 {
        (underlying * STRIKE_OFFSET).ceil()
    }

    /// Build `depth` quotes with ascending consecutive strikes.
    ///
    /// Floors and clamps are applied in a fixed order; later steps may undo
    /// earlier soft targets, the final clamp always leaves `bid < ask`.
    pub fn synthesize<R: RandomSource + ?Sized>(
        &self,
        underlying: f64,
        now_ms: i64,
        rng: &mut R,
    ) -> Vec<OptionQuote> {
        let start_strike = Self::first_strike(underlying);
        let depth = self.depth as f64;

        (0..self.depth)
            .map(|i| {
                let idx = i as f64;
                let strike = start_strike + idx;
                let intrinsic = (strike - underlying).max(0.0);
                let time_extrinsic = (0.35 + idx / depth).clamp(0.1, 3.0);
                let n = self.noise.sample(now_ms as f64 * 0.0008 + idx * 0.2);

                let mut ask = intrinsic + 0.1 + time_extrinsic * 0.5 + n * 0.15;
                if ask < self.min_spread + TICK {
                    ask = self.min_spread + TICK;
                }

                let mut bid = ask - (0.05 + 0.15 * (-idx / 3.0).exp()) + n * 0.05;
                if ask - bid < self.min_spread {
                    bid = ask - self.min_spread;
                }

                ask = ask.clamp(ASK_FLOOR, ASK_CEILING);
                bid = bid.max(BID_FLOOR).min(ask - TICK);

                let bid_size = ((depth - idx) * (0.5 + rng.next_f64())).round().max(1.0) as u32;

                let moneyness = (strike - underlying) / (underlying * 0.01).max(0.5);
                let prob = (0.65 + 0.35 * sigmoid(0.6 * moneyness) + 0.05 * (f64::from(bid_size) / 20.0))
                    .clamp(0.5, 0.995);
                let prob_itm = ((prob * 100.0).round() as u8).clamp(PROB_ITM_PCT_MIN, PROB_ITM_PCT_MAX);

                let (ask_premium, bid_premium) = self.round_quote(ask, bid);

                OptionQuote {
                    id: OptionQuote::id_for_strike(strike),
                    strike,
                    bid_size,
                    prob_itm,
                    ask_premium,
                    bid_premium,
                }
            })
            .collect()
    }

    /// Round both sides to cents; re-derive the bid if rounding ate into the minimum spread
    fn round_quote(&self, ask: f64, bid: f64) -> (f64, f64) {
        let ask = round2(ask);
        let mut bid = round2(bid);
        if ask - bid < self.min_spread - 1e-9 && ask - self.min_spread >= BID_FLOOR {
            bid = round2(ask - self.min_spread);
        }
        (ask, bid)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}
