//! Process-lifetime cache of the batch score map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use fp_protocol::score::ScoreOutcome;
use fp_telematics::{gather_fleet_scores, TelematicsApi};

struct Snapshot {
    outcomes: HashMap<String, ScoreOutcome>,
    refreshed_at: Instant,
}

/// Caches the email→outcome map produced by the batch fan-out so the
/// leaderboard doesn't hammer the provider on every request. Guarded by
/// an `RwLock`; concurrent refreshes may race but only overwrite each
/// other with equally-fresh data.
#[derive(Clone)]
pub struct ScoreCache {
    inner: Arc<RwLock<Option<Snapshot>>>,
    ttl: Duration,
}

impl ScoreCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Return the cached map when fresh, otherwise rebuild it from the
    /// provider.
    pub async fn get_or_refresh(
        &self,
        api: Arc<dyn TelematicsApi>,
        fan_out: usize,
    ) -> HashMap<String, ScoreOutcome> {
        {
            let guard = self.inner.read().await;
            if let Some(snapshot) = guard.as_ref()
                && snapshot.refreshed_at.elapsed() < self.ttl
            {
                return snapshot.outcomes.clone();
            }
        }

        let outcomes = gather_fleet_scores(api, fan_out).await;
        let mut guard = self.inner.write().await;
        *guard = Some(Snapshot {
            outcomes: outcomes.clone(),
            refreshed_at: Instant::now(),
        });
        outcomes
    }

    /// Drop the cached map.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}
