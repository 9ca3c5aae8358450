// Order command implementations: place concurrent orders on the live chain, then cancel them
use futures_util::future::join_all;
use tracing::{info, warn};
use mock_broker::progress::Spinner;
use mock_broker::{
    fill_probability, Broker, BrokerConfig, BrokerError, BrokerResult, CancelOutcome, OpenOutcome,
    OrderRequest,
};

pub async fn run_trade(
    orders: usize,
    offset: f64,
    qty: u32,
    keep_open: bool,
    config: BrokerConfig,
) -> BrokerResult<()> {
    if !offset.is_finite() || offset < 0.0 {
        return Err(BrokerError::invalid("offset", "must be a non-negative premium amount"));
    }

    let broker = Broker::new(config)?;
    broker.start()?;
    let tick = broker
        .latest()
        .ok_or_else(|| BrokerError::invalid("feed", "no tick available after start"))?;
    broker.stop();

    info!("💹 Underlying {:.2}, quoting {} strikes", tick.price, tick.options.len());

    let requests: Vec<OrderRequest> = tick
        .options
        .iter()
        .take(orders)
        .map(|option| OrderRequest {
            limit_price: (option.bid_premium - offset).max(0.0),
            option: option.clone(),
            qty,
        })
        .collect();

    for request in &requests {
        info!("   {} limit {:.2} x{} → p_fill {:.0}%",
            request.option.id,
            request.limit_price,
            request.qty,
            fill_probability(&request.option, request.limit_price) * 100.0
        );
    }

    let spinner = Spinner::new(&format!("Submitting {} orders...", requests.len()));
    let outcomes = join_all(requests.into_iter().map(|r| broker.open_order(r)))
        .await
        .into_iter()
        .collect::<BrokerResult<Vec<OpenOutcome>>>()?;

    let filled: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.order_id().map(str::to_string))
        .collect();
    spinner.finish(&format!("{} filled, {} not filled", filled.len(), outcomes.len() - filled.len()));

    if keep_open || filled.is_empty() {
        info!("📒 {} orders resting", broker.open_orders().len());
        return Ok(());
    }

    let spinner = Spinner::new(&format!("Cancelling {} orders...", filled.len()));
    let cancels = join_all(filled.iter().map(|id| broker.cancel_order(id)))
        .await
        .into_iter()
        .collect::<BrokerResult<Vec<CancelOutcome>>>()?;

    let cancelled = cancels.iter().filter(|c| c.is_ok()).count();
    let rejected = cancels.iter().filter(|c| **c == CancelOutcome::Rejected).count();
    spinner.finish(&format!("{} cancelled, {} rejected", cancelled, rejected));

    for order in broker.open_orders() {
        warn!("⚠️  Still resting: {} {} @ {:.2}", order.order_id, order.option.id, order.limit_price);
    }

    Ok(())
}
