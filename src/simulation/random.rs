// Injectable randomness
// Every stochastic outcome (latency, fills, cancel rejects, id suffixes, quote sizes)
// is drawn through this module so tests can replay exact sequences

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;
}

impl<R: RngCore + Send> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Values outside `[0, 1)` are clamped into it. An empty script always yields 0.0.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0 - f64::EPSILON) })
            .collect();
        Self { values, cursor: 0 }
    }

    /// Constant draw, handy for forcing one branch every time
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Cloneable handle to one random source shared by the feed and the execution simulator
#[derive(Clone)]
pub struct SharedRandom(Arc<Mutex<Box<dyn RandomSource>>>);

impl SharedRandom {
    pub fn new<R: RandomSource + 'static>(source: R) -> Self {
        Self(Arc::new(Mutex::new(Box::new(source))))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn scripted(values: Vec<f64>) -> Self {
        Self::new(ScriptedRandom::new(values))
    }

    /// Single draw in `[0, 1)`
    pub fn next_f64(&self) -> f64 {
        self.lock().next_f64()
    }

    /// Exclusive access for a batch of draws (e.g. one per strike)
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn RandomSource>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SharedRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedRandom")
    }
}
