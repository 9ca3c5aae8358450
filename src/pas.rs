// Price-adjusted strike (PAS) derivation
// Collaborator-side view helpers: the tick loop never calls into this module

use crate::config::QuoteConfig;
use crate::simulation::OptionQuote;
use serde::{Deserialize, Serialize};

/// Quote annotated with PAS on both sides: `strike - premium + commission`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasQuote {
    pub option: OptionQuote,
    pub ask_pas: f64,
    pub bid_pas: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PasBounds {
    pub min: f64,
    pub max: f64,
}

pub fn price_adjusted_strike(strike: f64, premium: f64, commission: f64) -> f64 {
    strike - premium + commission
}

pub fn derive_pas(option: &OptionQuote, commission: f64) -> PasQuote {
    PasQuote {
        ask_pas: price_adjusted_strike(option.strike, option.ask_premium, commission),
        bid_pas: price_adjusted_strike(option.strike, option.bid_premium, commission),
        option: option.clone(),
    }
}

/// Keep quotes meeting the probability and size thresholds, annotated with PAS
pub fn filter_quotes(options: &[OptionQuote], settings: &QuoteConfig) -> Vec<PasQuote> {
    options
        .iter()
        .filter(|o| o.prob_itm >= settings.min_prob_itm && o.bid_size >= settings.min_bid_size)
        .map(|o| derive_pas(o, settings.commission))
        .collect()
}

/// Range covering every ask and bid PAS; `None` for an empty slice
pub fn pas_bounds(quotes: &[PasQuote]) -> Option<PasBounds> {
    quotes
        .iter()
        .flat_map(|q| [q.ask_pas, q.bid_pas])
        .fold(None, |acc: Option<PasBounds>, v| match acc {
            None => Some(PasBounds { min: v, max: v }),
            Some(b) => Some(PasBounds { min: b.min.min(v), max: b.max.max(v) }),
        })
}
