use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use reachly_core::ProspectId;

/// Per-prospect write lock.
///
/// Held across generate-then-persist so two operations on the same prospect cannot
/// interleave their message inserts. Different prospects never contend. Entries
/// nobody holds or waits on are dropped on the next acquire.
#[derive(Default)]
pub struct ProspectLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProspectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, prospect_id: &ProspectId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        // Only the map holds an idle lock; guards and waiters own a clone.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(prospect_id.as_str().to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to `prospect_id`.
    pub async fn acquire(&self, prospect_id: &ProspectId) -> OwnedMutexGuard<()> {
        self.get(prospect_id).lock_owned().await
    }
}
