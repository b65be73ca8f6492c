//! Per-run route memoization
//!
//! One `RouteCache` is created per optimization run so no routing state
//! leaks across runs. Keys are the directional coordinate pair rounded
//! to 5 decimals (about a meter), which collapses float jitter from
//! upstream geocoding. Unresolved outcomes are cached too, so a dead leg
//! costs exactly one provider call per run.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{RouteLeg, RouteProvider};
use crate::types::Coordinates;

/// Concurrent in-flight prefetch requests (router friendliness).
const PREFETCH_CONCURRENCY: usize = 4;

/// Directional pair of 5-decimal-rounded coordinates.
type LegKey = (i64, i64, i64, i64);

fn round5(value: f64) -> i64 {
    (value * 100_000.0).round() as i64
}

/// Run-scoped memo over a [`RouteProvider`].
///
/// Lookups are infallible: provider transport errors degrade to an
/// unresolved leg here, after logging, so the matching loop never has to
/// abort a run over routing trouble.
pub struct RouteCache {
    provider: Arc<dyn RouteProvider>,
    entries: Mutex<HashMap<LegKey, Option<RouteLeg>>>,
}

impl RouteCache {
    pub fn new(provider: Arc<dyn RouteProvider>) -> Self {
        Self {
            provider,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(from: &Coordinates, to: &Coordinates) -> LegKey {
        (round5(from.lat), round5(from.lng), round5(to.lat), round5(to.lng))
    }

    /// Resolve a leg, consulting the cache first.
    ///
    /// `None` means the leg is unresolved: no route exists, or the
    /// provider kept failing and the outcome was pinned for this run.
    pub async fn route(&self, from: &Coordinates, to: &Coordinates) -> Option<RouteLeg> {
        let key = Self::key(from, to);
        if let Some(cached) = self.entries.lock().get(&key) {
            return cached.clone();
        }

        let outcome = match self.provider.route(from, to).await {
            Ok(leg) => leg,
            Err(e) => {
                warn!("Route lookup failed, treating leg as unresolved: {:#}", e);
                None
            }
        };

        self.entries.lock().insert(key, outcome.clone());
        outcome
    }

    /// Warm the cache for a batch of legs with bounded concurrency.
    /// Duplicate pairs collapse to a single provider call.
    pub async fn prefetch(&self, pairs: &[(Coordinates, Coordinates)]) {
        let mut seen: HashMap<LegKey, (Coordinates, Coordinates)> = HashMap::new();
        for (from, to) in pairs {
            seen.entry(Self::key(from, to)).or_insert((*from, *to));
        }
        let unique: Vec<(Coordinates, Coordinates)> = seen.into_values().collect();
        debug!("Prefetching {} unique legs", unique.len());

        stream::iter(unique)
            .for_each_concurrent(PREFETCH_CONCURRENCY, |(from, to)| async move {
                self.route(&from, &to).await;
            })
            .await;
    }

    /// Number of cached legs (resolved and unresolved).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
