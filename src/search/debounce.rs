use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tokio_util::sync::CancellationToken;

/// Trailing-edge debouncer
///
/// Each [`settle`](Debouncer::settle) call supersedes the previous pending one. Only a wait
/// that runs its full delay without being superseded resolves to `true`.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Pending>,
}

#[derive(Default)]
struct Pending {
    generation: u64,
    token: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(Pending::default()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the quiet period; `false` means a newer call superseded this one
    pub async fn settle(&self) -> bool {
        let token = CancellationToken::new();
        let generation = {
            let mut pending = self.lock();
            if let Some(previous) = pending.token.replace(token.clone()) {
                previous.cancel();
            }
            pending.generation += 1;
            pending.generation
        };

        let fired = tokio::select! {
            biased;
            _ = token.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        };

        if fired {
            let mut pending = self.lock();
            if pending.generation == generation {
                pending.token = None;
            }
        }
        fired
    }

    /// Drops any pending wait without starting a new one
    pub fn cancel(&self) {
        if let Some(token) = self.lock().token.take() {
            token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().token.is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
