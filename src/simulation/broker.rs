// Broker facade
// Drives the periodic price/chain tick, fans ticks out to subscribers and exposes the order API

use crate::config::BrokerConfig;
use crate::error::{BrokerError, BrokerResult};
use crate::simulation::chain::{ChainSynthesizer, OptionQuote};
use crate::simulation::execution_simulator::{
    CancelOutcome, ExecutionSimulator, OpenOutcome, Order, OrderRequest,
};
use crate::simulation::price_process::PriceProcess;
use crate::simulation::random::SharedRandom;
use crate::simulation::subscribers::{SubscriberRegistry, Subscription};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// One market snapshot: underlying price plus the freshly synthesized chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub price: f64,
    pub timestamp_ms: i64,
    pub options: Vec<OptionQuote>,
}

struct MarketFeed {
    process: PriceProcess,
    chain: ChainSynthesizer,
    latest: Option<Tick>,
}

/// State shared between the broker and its tick task
struct TickEngine {
    feed: Mutex<MarketFeed>,
    subscribers: SubscriberRegistry,
    rng: SharedRandom,
    log_ticks: bool,
}

impl TickEngine {
    fn tick(&self) -> Tick {
        let tick = {
            let mut feed = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
            let price = feed.process.advance();
            let timestamp_ms = Utc::now().timestamp_millis();
            let options = {
                let mut rng = self.rng.lock();
                feed.chain.synthesize(price, timestamp_ms, &mut **rng)
            };
            let tick = Tick { price, timestamp_ms, options };
            feed.latest = Some(tick.clone());
            tick
        };

        if self.log_ticks {
            info!("📈 {:.2} | {} strikes from {}",
                tick.price,
                tick.options.len(),
                tick.options.first().map(|o| o.strike).unwrap_or_default()
            );
        } else {
            debug!("📈 tick {:.4} @ {}", tick.price, tick.timestamp_ms);
        }

        self.subscribers.publish(&tick);
        tick
    }
}

/// Independently owned simulator instance; two brokers never share state
pub struct Broker {
    config: BrokerConfig,
    engine: Arc<TickEngine>,
    execution: ExecutionSimulator,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Broker {
    /// Broker with an entropy-seeded random source
    pub fn new(config: BrokerConfig) -> BrokerResult<Self> {
        Self::with_random(config, SharedRandom::from_entropy())
    }

    /// Broker drawing every random outcome from `rng`
    pub fn with_random(config: BrokerConfig, rng: SharedRandom) -> BrokerResult<Self> {
        config.validate()?;

        let feed = MarketFeed {
            process: PriceProcess::new(config.feed.clone()),
            chain: ChainSynthesizer::new(&config.chain),
            latest: None,
        };

        let engine = TickEngine {
            feed: Mutex::new(feed),
            subscribers: SubscriberRegistry::new(),
            rng: rng.clone(),
            log_ticks: config.logging.log_ticks,
        };

        Ok(Self {
            execution: ExecutionSimulator::new(config.execution.clone(), rng),
            engine: Arc::new(engine),
            ticker: Mutex::new(None),
            config,
        })
    }

    /// Start the tick loop. Emits one tick immediately, then one per interval.
    /// No-op while already running. Must be called inside a tokio runtime.
    pub fn start(&self) -> BrokerResult<()> {
        {
            let mut ticker = self.ticker();
            if ticker.as_ref().is_some_and(|task| !task.is_finished()) {
                debug!("Tick loop already running");
                return Ok(());
            }

            let runtime = Handle::try_current().map_err(|_| BrokerError::RuntimeUnavailable)?;
            let period = Duration::from_millis(self.config.feed.tick_interval_ms);
            let engine = Arc::clone(&self.engine);

            *ticker = Some(runtime.spawn(async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    engine.tick();
                }
            }));
        }

        info!("🚀 Broker feed started ({}ms ticks)", self.config.feed.tick_interval_ms);
        self.engine.tick();
        Ok(())
    }

    /// Stop the tick loop. No-op when not running.
    pub fn stop(&self) {
        if let Some(task) = self.ticker().take() {
            task.abort();
            info!("🛑 Broker feed stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker().as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Produce one tick outside the timer (manual stepping)
    pub fn tick(&self) -> Tick {
        self.engine.tick()
    }

    /// Most recently emitted tick
    pub fn latest(&self) -> Option<Tick> {
        self.engine
            .feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .clone()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Tick) + Send + Sync + 'static,
    {
        self.engine.subscribers.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.engine.subscribers.len()
    }

    pub async fn open_order(&self, request: OrderRequest) -> BrokerResult<OpenOutcome> {
        self.execution.open_order(request).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> BrokerResult<CancelOutcome> {
        self.execution.cancel_order(order_id).await
    }

    pub fn open_orders(&self) -> Vec<Order> {
        self.execution.open_orders()
    }

    pub fn execution(&self) -> &ExecutionSimulator {
        &self.execution
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    fn ticker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        if let Some(task) = self.ticker().take() {
            task.abort();
        }
    }
}
