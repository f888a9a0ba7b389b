use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use crate::{models::WatchlistKey, ui::ToggleControl};

/// Handle returned when a control is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(u64);

/// Rendered toggle controls and the watchlist key each one is bound to
#[derive(Default)]
pub struct ControlRegistry {
    next_id: AtomicU64,
    bindings: Mutex<BTreeMap<ControlId, (WatchlistKey, Arc<dyn ToggleControl>)>>,
}

impl ControlRegistry {
    pub fn register(&self, key: WatchlistKey, control: Arc<dyn ToggleControl>) -> ControlId {
        let id = ControlId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, (key, control));
        id
    }

    pub fn unregister(&self, id: ControlId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all bindings in registration order, so callers can await without holding the lock
    pub fn snapshot(&self) -> Vec<(ControlId, WatchlistKey, Arc<dyn ToggleControl>)> {
        self.lock()
            .iter()
            .map(|(id, (key, control))| (*id, key.clone(), control.clone()))
            .collect()
    }

    /// Pushes a known membership state to every control bound to `key`
    pub fn broadcast(&self, key: &WatchlistKey, in_watchlist: bool) -> usize {
        let targets: Vec<Arc<dyn ToggleControl>> = self
            .lock()
            .values()
            .filter(|(bound, _)| bound == key)
            .map(|(_, control)| control.clone())
            .collect();

        for control in &targets {
            control.set_in_watchlist(in_watchlist);
        }
        targets.len()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, BTreeMap<ControlId, (WatchlistKey, Arc<dyn ToggleControl>)>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
