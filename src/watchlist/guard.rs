use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{models::WatchlistKey, ui::ToggleControl};

/// Keys with a mutating operation currently in flight
#[derive(Default)]
pub struct InFlightKeys {
    keys: Mutex<HashSet<WatchlistKey>>,
}

impl InFlightKeys {
    /// Claims `key`, or returns `None` if another operation already holds it
    pub fn try_acquire(&self, key: &WatchlistKey) -> Option<KeyGuard<'_>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(KeyGuard {
            owner: self,
            key: key.clone(),
        })
    }

    pub fn contains(&self, key: &WatchlistKey) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases the key when dropped
pub struct KeyGuard<'a> {
    owner: &'a InFlightKeys,
    key: WatchlistKey,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Keeps a control disabled for the guard's lifetime
pub struct DisabledControl {
    control: Arc<dyn ToggleControl>,
}

impl DisabledControl {
    pub fn new(control: Arc<dyn ToggleControl>) -> Self {
        control.set_enabled(false);
        Self { control }
    }
}

impl Drop for DisabledControl {
    fn drop(&mut self) {
        self.control.set_enabled(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_second_acquire_is_refused() {
        let keys = InFlightKeys::default();
        let key = WatchlistKey::new("550", MediaType::Movie);

        let guard = keys.try_acquire(&key);
        assert!(guard.is_some());
        assert!(keys.try_acquire(&key).is_none());
        assert!(keys.contains(&key));

        drop(guard);
        assert!(!keys.contains(&key));
        assert!(keys.try_acquire(&key).is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let keys = InFlightKeys::default();
        let movie = WatchlistKey::new("550", MediaType::Movie);
        let tv = WatchlistKey::new("550", MediaType::Tv);

        let _movie_guard = keys.try_acquire(&movie).unwrap();
        assert!(keys.try_acquire(&tv).is_some());
    }

    struct FlagControl {
        enabled: AtomicBool,
    }

    impl ToggleControl for FlagControl {
        fn set_enabled(&self, enabled: bool) {
            self.enabled.store(enabled, Ordering::SeqCst);
        }

        fn set_in_watchlist(&self, _in_watchlist: bool) {}
    }

    #[test]
    fn test_disabled_control_reenables_on_drop() {
        let control = Arc::new(FlagControl {
            enabled: AtomicBool::new(true),
        });

        let guard = DisabledControl::new(control.clone());
        assert!(!control.enabled.load(Ordering::SeqCst));
        drop(guard);
        assert!(control.enabled.load(Ordering::SeqCst));
    }
}
