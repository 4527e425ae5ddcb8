use crate::types::{Signal, SignalIdentity};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Suppresses signals already reported within a sliding window.
///
/// An identity is admitted once; later sightings are dropped until the window
/// has passed since it was admitted. A zero window turns filtering off.
pub struct Deduplicator {
    window: Duration,
    seen: RwLock<HashMap<SignalIdentity, Instant>>,
}

impl Deduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.window.is_zero()
    }

    pub async fn filter_new(&self, signals: Vec<Signal>) -> Vec<Signal> {
        self.filter_new_at(signals, Instant::now()).await
    }

    pub async fn filter_new_at(&self, signals: Vec<Signal>, now: Instant) -> Vec<Signal> {
        if !self.is_enabled() {
            return signals;
        }

        let mut seen = self.seen.write().await;
        let before = seen.len();
        seen.retain(|_, admitted| now.saturating_duration_since(*admitted) < self.window);
        if seen.len() < before {
            debug!("Evicted {} expired signal(s) from seen set", before - seen.len());
        }

        signals
            .into_iter()
            .filter(|signal| match seen.entry(signal.identity()) {
                Entry::Occupied(entry) => {
                    debug!("Duplicate signal suppressed: {}", entry.key());
                    false
                }
                Entry::Vacant(entry) => {
                    entry.insert(now);
                    true
                }
            })
            .collect()
    }

    /// Forgets signals whose delivery failed so a later scan can report them.
    pub async fn release(&self, signals: &[Signal]) {
        let mut seen = self.seen.write().await;
        for signal in signals {
            seen.remove(&signal.identity());
        }
    }

    pub async fn seen_count(&self) -> usize {
        self.seen.read().await.len()
    }
}
