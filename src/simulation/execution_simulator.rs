// Execution Simulator
// Simulates order placement and cancellation with artificial latency and probabilistic outcomes

use crate::config::{ExecutionConfig, LatencyRange};
use crate::error::{BrokerError, BrokerResult};
use crate::simulation::chain::OptionQuote;
use crate::simulation::random::SharedRandom;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

const BASE_FILL_PROBABILITY: f64 = 0.15;
const CLOSENESS_WEIGHT: f64 = 0.6;
const SIZE_WEIGHT: f64 = 0.25;
const FULL_SIZE: f64 = 50.0;
const MIN_SPREAD_DENOMINATOR: f64 = 0.01;
const ID_SUFFIX_LEN: u32 = 5;

/// Order-open request; `option` is a copy, decoupled from later ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub option: OptionQuote,
    pub limit_price: f64,
    pub qty: u32,
}

/// Resting order in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub option: OptionQuote,
    pub limit_price: f64,
    pub qty: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OpenOutcome {
    Filled { order_id: String },
    NoFill,
}

impl OpenOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, OpenOutcome::Filled { .. })
    }

    pub fn order_id(&self) -> Option<&str> {
        match self {
            OpenOutcome::Filled { order_id } => Some(order_id),
            OpenOutcome::NoFill => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelOutcome {
    Cancelled,
    /// Simulated upstream reject; the order stays resting
    Rejected,
    NotFound,
}

impl CancelOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CancelOutcome::Cancelled)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            CancelOutcome::NotFound => Some("not_found"),
            _ => None,
        }
    }
}

/// Fill probability for a limit order against the quoted option.
///
/// The spread term is `bid - ask`, negative for any valid quote, so the
/// denominator collapses to its 0.01 floor. Kept as-is for compatibility
/// with existing quote consumers.
pub fn fill_probability(option: &OptionQuote, limit_price: f64) -> f64 {
    let spread = (option.bid_premium - option.ask_premium).max(MIN_SPREAD_DENOMINATOR);
    let closeness = (1.0 - (option.bid_premium - limit_price) / spread).clamp(0.0, 1.0);
    let size_factor = (f64::from(option.bid_size) / FULL_SIZE).clamp(0.0, 1.0);
    BASE_FILL_PROBABILITY + CLOSENESS_WEIGHT * closeness + SIZE_WEIGHT * size_factor
}

/// Execution simulator owning the order ledger
#[derive(Debug)]
pub struct ExecutionSimulator {
    config: ExecutionConfig,
    ledger: Mutex<HashMap<String, Order>>,
    rng: SharedRandom,
}

impl ExecutionSimulator {
    pub fn new(config: ExecutionConfig, rng: SharedRandom) -> Self {
        Self {
            config,
            ledger: Mutex::new(HashMap::new()),
            rng,
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(ExecutionConfig::default(), SharedRandom::from_entropy())
    }

    /// Submit a limit order. Resolves after the open latency window.
    pub async fn open_order(&self, request: OrderRequest) -> BrokerResult<OpenOutcome> {
        validate_request(&request)?;

        let probability = fill_probability(&request.option, request.limit_price);
        let latency = self.simulate_latency(self.config.open_latency);
        debug!("⏳ open {} x{} @ {:.2}: p_fill={:.3}, latency={}ms",
            request.option.id,
            request.qty,
            request.limit_price,
            probability,
            latency.as_millis()
        );
        tokio::time::sleep(latency).await;

        if self.rng.next_f64() >= probability {
            warn!("❌ NO FILL: {} x{} @ {:.2}", request.option.id, request.qty, request.limit_price);
            return Ok(OpenOutcome::NoFill);
        }

        let created_at = Utc::now();
        let order_id = self.generate_order_id(created_at);
        info!("✅ ORDER OPEN: {} {} x{} @ {:.2}",
            order_id,
            request.option.id,
            request.qty,
            request.limit_price
        );

        let order = Order {
            order_id: order_id.clone(),
            option: request.option,
            limit_price: request.limit_price,
            qty: request.qty,
            created_at,
        };
        self.ledger().insert(order_id.clone(), order);

        Ok(OpenOutcome::Filled { order_id })
    }

    /// Cancel a resting order. Resolves after the cancel latency window.
    pub async fn cancel_order(&self, order_id: &str) -> BrokerResult<CancelOutcome> {
        let latency = self.simulate_latency(self.config.cancel_latency);
        tokio::time::sleep(latency).await;

        if !self.ledger().contains_key(order_id) {
            warn!("⚠️  Cancel for unknown order {}", order_id);
            return Ok(CancelOutcome::NotFound);
        }

        if self.rng.next_f64() >= self.config.cancel_success_rate {
            warn!("❌ CANCEL REJECTED: {}", order_id);
            return Ok(CancelOutcome::Rejected);
        }

        // a concurrent cancel may have won the race during the draw
        match self.ledger().remove(order_id) {
            Some(_) => {
                info!("🗑️  ORDER CANCELLED: {}", order_id);
                Ok(CancelOutcome::Cancelled)
            }
            None => Ok(CancelOutcome::NotFound),
        }
    }

    pub fn get_order(&self, order_id: &str) -> Option<Order> {
        self.ledger().get(order_id).cloned()
    }

    /// Snapshot of resting orders, oldest first
    pub fn open_orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.ledger().values().cloned().collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.order_id.cmp(&b.order_id)));
        orders
    }

    pub fn order_count(&self) -> usize {
        self.ledger().len()
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    fn ledger(&self) -> MutexGuard<'_, HashMap<String, Order>> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Uniform draw from the half-open window
    fn simulate_latency(&self, range: LatencyRange) -> Duration {
        let span = range.max_ms.saturating_sub(range.min_ms) as f64;
        let ms = range.min_ms as f64 + self.rng.next_f64() * span;
        Duration::from_micros((ms * 1_000.0) as u64)
    }

    /// `ORD-<base36 millis>-<5 base36 chars>`. Not guaranteed unique.
    fn generate_order_id(&self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis().max(0) as u64;
        let space = 36_u64.pow(ID_SUFFIX_LEN);
        let suffix = ((self.rng.next_f64() * space as f64) as u64).min(space - 1);
        format!("ORD-{}-{:0>5}", to_base36(millis), to_base36(suffix))
    }
}

fn validate_request(request: &OrderRequest) -> BrokerResult<()> {
    request.option.validate()?;

    if request.qty == 0 {
        return Err(BrokerError::invalid("qty", "must be at least 1"));
    }
    if !request.limit_price.is_finite() || request.limit_price < 0.0 {
        return Err(BrokerError::invalid(
            "limit_price",
            format!("{} is not a non-negative price", request.limit_price),
        ));
    }
    Ok(())
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(bid: f64, ask: f64, bid_size: u32) -> OptionQuote {
        OptionQuote {
            id: "put-101".to_string(),
            strike: 101.0,
            bid_size,
            prob_itm: 90,
            ask_premium: ask,
            bid_premium: bid,
        }
    }

    #[test]
    fn test_fill_probability_extremes() {
        let option = quote(1.01, 8.01, 60);
        assert!((fill_probability(&option, 1.01) - 1.0).abs() < 1e-12);

        // far below the bid: closeness bottoms out
        let small = quote(1.01, 8.01, 0);
        assert!((fill_probability(&small, 0.0) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_fill_probability_size_factor() {
        let option = quote(1.01, 8.01, 25);
        assert!((fill_probability(&option, 1.01) - (0.15 + 0.6 + 0.125)).abs() < 1e-12);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_order_id_format() {
        let sim = ExecutionSimulator::new(ExecutionConfig::default(), SharedRandom::scripted(vec![0.0]));
        let id = sim.generate_order_id(Utc::now());
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[2], "00000");
    }

    #[test]
    fn test_validate_request() {
        let good = OrderRequest { option: quote(1.01, 8.01, 10), limit_price: 1.0, qty: 1 };
        assert!(validate_request(&good).is_ok());

        let zero_qty = OrderRequest { qty: 0, ..good.clone() };
        assert!(matches!(validate_request(&zero_qty), Err(BrokerError::InvalidArgument(p, _)) if p == "qty"));

        let negative = OrderRequest { limit_price: -1.0, ..good.clone() };
        assert!(validate_request(&negative).is_err());

        let nan = OrderRequest { limit_price: f64::NAN, ..good };
        assert!(validate_request(&nan).is_err());
    }

    #[test]
    fn test_cancel_outcome_reason() {
        assert_eq!(CancelOutcome::NotFound.reason(), Some("not_found"));
        assert_eq!(CancelOutcome::Rejected.reason(), None);
        assert!(CancelOutcome::Cancelled.is_ok());
        assert!(!CancelOutcome::Rejected.is_ok());
    }
}
