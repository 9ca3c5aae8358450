//! Progress display for the `broker-sim` binary
//!
//! Terminal feedback while streaming ticks or waiting on simulated orders,
//! using the indicatif crate.

use crate::simulation::Tick;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over a fixed number of ticks
pub struct TickProgress {
    pub progress: ProgressBar,
    last_price: Option<f64>,
}

impl TickProgress {
    pub fn new(total_ticks: u64) -> Self {
        let progress = ProgressBar::new(total_ticks);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ticks\n{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-")
        );

        Self { progress, last_price: None }
    }

    /// Advance one tick and show price direction and the top of the chain
    pub fn record(&mut self, tick: &Tick) {
        let arrow = match self.last_price {
            Some(prev) if tick.price > prev => "▲",
            Some(prev) if tick.price < prev => "▼",
            _ => "•",
        };
        self.last_price = Some(tick.price);

        let head = tick
            .options
            .first()
            .map(|o| format!("{} {:.2}/{:.2} x{}", o.id, o.bid_premium, o.ask_premium, o.bid_size))
            .unwrap_or_else(|| "no quotes".to_string());

        self.progress.inc(1);
        self.progress.set_message(format!("{} {:.2} | {}", arrow, tick.price, head));
    }

    pub fn finish(&self, ticks: u64) {
        self.progress.finish_with_message(format!("✅ Streamed {} ticks", ticks));
    }
}

/// Spinner for waits on simulated latency
pub struct Spinner {
    pub spinner: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(message.to_string());

        Self { spinner }
    }

    pub fn update(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }

    pub fn finish(&self, message: &str) {
        self.spinner.finish_with_message(format!("✅ {}", message));
    }

    pub fn finish_with_error(&self, message: &str) {
        self.spinner.finish_with_message(format!("❌ {}", message));
    }
}
