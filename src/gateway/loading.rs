use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::ui::LoadingIndicator;

/// Reference-counted loading overlay
///
/// Overlapping calls keep the indicator visible until the last one finishes.
#[derive(Clone)]
pub struct LoadingTracker {
    in_flight: Arc<AtomicUsize>,
    indicator: Arc<dyn LoadingIndicator>,
}

impl LoadingTracker {
    pub fn new(indicator: Arc<dyn LoadingIndicator>) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            indicator,
        }
    }

    /// Shows the indicator until the returned guard is dropped
    pub fn acquire(&self) -> LoadingGuard {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.indicator.set_visible(true);
        }
        LoadingGuard {
            tracker: self.clone(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Hides the indicator on drop, whatever way the call ended
pub struct LoadingGuard {
    tracker: LoadingTracker,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.indicator.set_visible(false);
        }
    }
}
