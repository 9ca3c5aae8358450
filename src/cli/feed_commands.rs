// Feed command implementations: chain snapshots and tick streaming
use tracing::{info, warn};
use mock_broker::progress::TickProgress;
use mock_broker::{
    derive_pas, filter_quotes, pas_bounds, Broker, BrokerConfig, BrokerResult, ChainSynthesizer,
    PasQuote, SharedRandom, Tick,
};

/// Print one synthesized chain for a given underlying, with PAS columns
pub fn show_chain(
    price: f64,
    now_ms: Option<i64>,
    all: bool,
    json: bool,
    config: &BrokerConfig,
) -> BrokerResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(mock_broker::BrokerError::invalid("price", "must be a positive number"));
    }

    let now_ms = now_ms.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let synth = ChainSynthesizer::new(&config.chain);
    let rng = SharedRandom::from_entropy();
    let options = {
        let mut draws = rng.lock();
        synth.synthesize(price, now_ms, &mut **draws)
    };

    let quotes: Vec<PasQuote> = if all {
        options.iter().map(|o| derive_pas(o, config.quotes.commission)).collect()
    } else {
        filter_quotes(&options, &config.quotes)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&quotes)?);
        return Ok(());
    }

    info!("🧾 Chain for underlying {:.2} @ {}ms ({} of {} shown)",
        price, now_ms, quotes.len(), options.len());
    println!("{:<10} {:>8} {:>8} {:>8} {:>6} {:>5} {:>9} {:>9}",
        "id", "strike", "bid", "ask", "size", "itm%", "bid PAS", "ask PAS");
    for q in &quotes {
        println!("{:<10} {:>8.0} {:>8.2} {:>8.2} {:>6} {:>5} {:>9.2} {:>9.2}",
            q.option.id,
            q.option.strike,
            q.option.bid_premium,
            q.option.ask_premium,
            q.option.bid_size,
            q.option.prob_itm,
            q.bid_pas,
            q.ask_pas
        );
    }

    match pas_bounds(&quotes) {
        Some(bounds) => info!("📏 PAS range {:.2} to {:.2}", bounds.min, bounds.max),
        None => warn!("⚠️  No quotes pass the filters (min itm {}%, min size {})",
            config.quotes.min_prob_itm, config.quotes.min_bid_size),
    }

    Ok(())
}

/// Stream ticks from a live broker until `ticks` have been received
pub async fn run_feed(ticks: u64, json: bool, config: BrokerConfig) -> BrokerResult<()> {
    let broker = Broker::new(config)?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Tick>();
    let subscription = broker.subscribe(move |tick| {
        let _ = tx.send(tick.clone());
    });

    if !json {
        info!("📡 Streaming {} ticks every {}ms", ticks, broker.config().feed.tick_interval_ms);
    }
    broker.start()?;

    let mut progress = (!json).then(|| TickProgress::new(ticks));
    let mut received = 0;
    while received < ticks {
        let Some(tick) = rx.recv().await else {
            break;
        };
        received += 1;

        if json {
            println!("{}", serde_json::to_string(&tick)?);
        } else if let Some(progress) = progress.as_mut() {
            progress.record(&tick);
        }
    }

    broker.stop();
    subscription.unsubscribe();

    if let Some(progress) = progress {
        progress.finish(received);
    }
    Ok(())
}
