//! Randomness adapters.

use rand::Rng;

use crate::infrastructure::ports::RandomSource;

/// Real randomness from the thread-local generator.
pub struct ThreadRngSource;

impl ThreadRngSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadRngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRngSource {
    fn fraction(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed sequence of fractions, then panics (tests only).
#[cfg(test)]
pub struct ScriptedRandom {
    values: std::sync::Mutex<std::collections::VecDeque<f64>>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: std::sync::Mutex::new(values.into_iter().collect()),
        }
    }

    /// A source that must never be drawn from.
    pub fn unused() -> Self {
        Self::new([])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn fraction(&self) -> f64 {
        self.values
            .lock()
            .expect("scripted random lock")
            .pop_front()
            .expect("scripted random exhausted")
    }
}
