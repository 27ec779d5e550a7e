//! Per-record serialization of dispatches
//!
//! Two saves of the same record must not dispatch concurrently, or both
//! could read the same delivery state and send the same event twice. The
//! dispatcher itself holds no locks; [`LockingDispatcher`] serializes calls
//! by record key in front of it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use domain_shipment::{ShipmentRecord, TrackedRecord};

use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::MilestoneError;
use crate::events::ChangeEvent;

/// Keyed async mutexes
///
/// Entries are held weakly and pruned once nobody holds or waits on them.
#[derive(Debug, Default)]
pub struct RecordLocks {
    locks: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks.retain(|_, lock| lock.strong_count() > 0);

            match locks.get(key).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    let created = Arc::new(AsyncMutex::new(()));
                    locks.insert(key.to_string(), Arc::downgrade(&created));
                    created
                }
            }
        };
        mutex.lock_owned().await
    }

    /// Number of keys currently held or awaited
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.values().filter(|lock| lock.strong_count() > 0).count()
    }
}

/// A [`Dispatcher`] that serializes dispatches per record
#[derive(Debug, Clone)]
pub struct LockingDispatcher {
    inner: Dispatcher,
    locks: Arc<RecordLocks>,
}

impl LockingDispatcher {
    pub fn new(inner: Dispatcher) -> Self {
        Self {
            inner,
            locks: Arc::new(RecordLocks::new()),
        }
    }

    pub async fn dispatch(&self, event: &ChangeEvent, record: &ShipmentRecord) -> Result<DispatchReport, MilestoneError> {
        let _guard = self.locks.lock(&record.record_ref().to_string()).await;
        self.inner.dispatch(event, record).await
    }

    pub fn inner(&self) -> &Dispatcher {
        &self.inner
    }
}
