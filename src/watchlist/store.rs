use serde::de::IgnoredAny;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    controls::{ControlId, ControlRegistry},
    export,
    guard::{DisabledControl, InFlightKeys, KeyGuard},
};
use crate::{
    error::{AppError, AppResult},
    gateway::{Endpoint, RequestGateway, RequestOptions},
    models::{
        watchlist::coerce_rating, WatchlistFilter, WatchlistItem, WatchlistKey, WatchlistStats,
    },
    ui::{NotificationLevel, Notifier, ToggleControl},
};

/// Result of a [`WatchlistStore::toggle`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Another toggle for the same key was still running; nothing was sent
    AlreadyInFlight,
}

/// Outcome of a control refresh sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub updated: usize,
    pub failed: usize,
}

/// Local mirror of the user's watchlist
///
/// The remote service is the source of truth. The mirror is only written after the service
/// confirms a mutation, and is replaced wholesale whenever the list is re-fetched.
pub struct WatchlistStore {
    gateway: Arc<RequestGateway>,
    notifier: Arc<dyn Notifier>,
    mirror: Mutex<Vec<WatchlistItem>>,
    in_flight: InFlightKeys,
    controls: ControlRegistry,
}

impl WatchlistStore {
    pub fn new(gateway: Arc<RequestGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            mirror: Mutex::new(Vec::new()),
            in_flight: InFlightKeys::default(),
            controls: ControlRegistry::default(),
        }
    }

    /// Re-fetches the remote list and reports whether `key` is on it
    pub async fn is_member(&self, key: &WatchlistKey) -> AppResult<bool> {
        let items = self.reload().await?;
        Ok(items.iter().any(|item| item.matches(key)))
    }

    /// Membership according to the last fetched list, without touching the network
    pub fn is_member_cached(&self, key: &WatchlistKey) -> bool {
        self.mirror().iter().any(|item| item.matches(key))
    }

    /// Replaces the mirror with the remote list
    pub async fn reload(&self) -> AppResult<Vec<WatchlistItem>> {
        let token = self.gateway.cancellation_token();
        let items: Vec<WatchlistItem> = self
            .gateway
            .call(Endpoint::Watchlist, RequestOptions::get(), &token)
            .await?;
        self.replace_mirror(items.clone());
        Ok(items)
    }

    pub fn items(&self, filter: WatchlistFilter) -> Vec<WatchlistItem> {
        self.mirror()
            .iter()
            .filter(|item| filter.accepts(item))
            .cloned()
            .collect()
    }

    pub fn get(&self, key: &WatchlistKey) -> Option<WatchlistItem> {
        self.mirror().iter().find(|item| item.matches(key)).cloned()
    }

    /// Stats as computed by the catalog service
    pub async fn stats(&self) -> AppResult<WatchlistStats> {
        let token = self.gateway.cancellation_token();
        self.gateway
            .call(Endpoint::WatchlistStats, RequestOptions::get(), &token)
            .await
    }

    /// Stats computed from the mirror
    pub fn local_stats(&self) -> WatchlistStats {
        WatchlistStats::from_items(&self.mirror())
    }

    pub fn export_json(&self) -> AppResult<String> {
        export::to_json(&self.mirror())
    }

    pub fn export_csv(&self) -> AppResult<String> {
        export::to_csv(&self.mirror())
    }

    pub fn is_in_flight(&self, key: &WatchlistKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Adds the title if absent, removes it if present
    ///
    /// At most one mutation per key runs at a time; a toggle issued while another mutation on
    /// the key is pending returns [`ToggleOutcome::AlreadyInFlight`] without contacting the
    /// service. `control` stays disabled until this call finishes, whatever the outcome.
    pub async fn toggle(
        &self,
        key: WatchlistKey,
        title: &str,
        poster_path: &str,
        control: Option<Arc<dyn ToggleControl>>,
    ) -> AppResult<ToggleOutcome> {
        let Some(_key_guard) = self.in_flight.try_acquire(&key) else {
            tracing::debug!(key = %key, "Toggle already in flight, ignoring");
            return Ok(ToggleOutcome::AlreadyInFlight);
        };
        let _disabled = control.map(DisabledControl::new);

        let result = self.toggle_inner(&key, title, poster_path).await;

        match &result {
            Ok(outcome) => {
                let in_watchlist = *outcome == ToggleOutcome::Added;
                self.controls.broadcast(&key, in_watchlist);
            }
            Err(e) if !e.is_cancelled() => {
                tracing::error!(key = %key, error = %e, "Failed to toggle watchlist");
                self.notifier.notify(
                    NotificationLevel::Error,
                    "Failed to update watchlist. Please try again.",
                );
            }
            Err(_) => {}
        }

        result
    }

    async fn toggle_inner(
        &self,
        key: &WatchlistKey,
        title: &str,
        poster_path: &str,
    ) -> AppResult<ToggleOutcome> {
        if self.is_member(key).await? {
            self.remove_claimed(key).await?;
            Ok(ToggleOutcome::Removed)
        } else {
            self.add_claimed(WatchlistItem::new(key.clone(), title, poster_path))
                .await?;
            Ok(ToggleOutcome::Added)
        }
    }

    /// Adds an item once the service has accepted it
    ///
    /// Fails with [`AppError::AlreadyInFlight`] while another mutation on the same key is
    /// pending; nothing is sent in that case.
    pub async fn add(&self, item: WatchlistItem) -> AppResult<()> {
        let _key_guard = self.claim(&item.key())?;
        self.add_claimed(item).await
    }

    async fn add_claimed(&self, mut item: WatchlistItem) -> AppResult<()> {
        if let Err(e) = item.validate() {
            self.notifier
                .notify(NotificationLevel::Error, "Failed to add to watchlist");
            return Err(e);
        }

        let body = serde_json::to_value(&item)?;
        let token = self.gateway.cancellation_token();
        let result = self
            .gateway
            .call::<IgnoredAny>(Endpoint::Watchlist, RequestOptions::post(body), &token)
            .await;

        match result {
            Ok(_) => {
                tracing::info!(key = %item.key(), title = %item.title, "Added to watchlist");
                self.notifier.notify(
                    NotificationLevel::Success,
                    &format!("Added \"{}\" to watchlist", item.title),
                );
                self.upsert(item);
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to add to watchlist");
                Err(e)
            }
        }
    }

    /// Removes an item once the service has confirmed the deletion
    pub async fn remove(&self, key: &WatchlistKey) -> AppResult<()> {
        let _key_guard = self.claim(key)?;
        self.remove_claimed(key).await
    }

    async fn remove_claimed(&self, key: &WatchlistKey) -> AppResult<()> {
        let token = self.gateway.cancellation_token();
        let result = self
            .gateway
            .call::<IgnoredAny>(
                Endpoint::WatchlistItem(key.clone()),
                RequestOptions::delete(),
                &token,
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!(key = %key, "Removed from watchlist");
                self.mirror().retain(|item| !item.matches(key));
                self.notifier
                    .notify(NotificationLevel::Success, "Removed from watchlist");
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to remove from watchlist");
                Err(e)
            }
        }
    }

    /// Marks an item watched with a 0..=10 rating (out-of-range ratings become 0)
    pub async fn mark_as_watched(&self, key: &WatchlistKey, rating: f64) -> AppResult<()> {
        let _key_guard = self.claim(key)?;
        let rating = coerce_rating(rating);
        let token = self.gateway.cancellation_token();
        let result = self
            .gateway
            .call::<IgnoredAny>(
                Endpoint::Watched(key.clone()),
                RequestOptions::put(json!({ "rating": rating })),
                &token,
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!(key = %key, rating, "Marked as watched");
                self.notifier
                    .notify(NotificationLevel::Success, "Marked as watched");
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to update watch status");
                Err(e)
            }
        }
    }

    pub async fn mark_as_unwatched(&self, key: &WatchlistKey) -> AppResult<()> {
        let _key_guard = self.claim(key)?;
        let token = self.gateway.cancellation_token();
        let result = self
            .gateway
            .call::<IgnoredAny>(
                Endpoint::Unwatched(key.clone()),
                RequestOptions::put(json!({})),
                &token,
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!(key = %key, "Marked as unwatched");
                self.notifier
                    .notify(NotificationLevel::Success, "Marked as unwatched");
                self.refresh_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                self.notify_failure(&e, "Failed to update watch status");
                Err(e)
            }
        }
    }

    /// Flips the watched flag; `rating` only applies when marking watched
    pub async fn toggle_watched(
        &self,
        key: &WatchlistKey,
        currently_watched: bool,
        rating: f64,
    ) -> AppResult<()> {
        if currently_watched {
            self.mark_as_unwatched(key).await
        } else {
            self.mark_as_watched(key, rating).await
        }
    }

    pub fn register_control(&self, key: WatchlistKey, control: Arc<dyn ToggleControl>) -> ControlId {
        self.controls.register(key, control)
    }

    pub fn unregister_control(&self, id: ControlId) -> bool {
        self.controls.unregister(id)
    }

    /// Re-queries membership for every registered control
    ///
    /// Checks run silently and independently: a failed check leaves that control as it was
    /// and the sweep carries on.
    pub async fn refresh_button_states(&self) -> RefreshReport {
        let mut report = RefreshReport::default();

        for (id, key, control) in self.controls.snapshot() {
            match self.check_membership_silently(&key).await {
                Ok(in_watchlist) => {
                    control.set_in_watchlist(in_watchlist);
                    report.updated += 1;
                }
                Err(e) => {
                    tracing::warn!(control = ?id, key = %key, error = %e, "Membership check failed");
                    report.failed += 1;
                }
            }
        }

        if report.failed > 0 {
            tracing::warn!(
                updated = report.updated,
                failed = report.failed,
                "Partial control refresh failure"
            );
        }

        report
    }

    async fn check_membership_silently(&self, key: &WatchlistKey) -> AppResult<bool> {
        let token = self.gateway.cancellation_token();
        let items: Vec<WatchlistItem> = self
            .gateway
            .silent_call(Endpoint::Watchlist, RequestOptions::get(), &token)
            .await?;
        let member = items.iter().any(|item| item.matches(key));
        self.replace_mirror(items);
        Ok(member)
    }

    fn claim(&self, key: &WatchlistKey) -> AppResult<KeyGuard<'_>> {
        self.in_flight.try_acquire(key).ok_or_else(|| {
            tracing::debug!(key = %key, "Mutation already in flight, ignoring");
            AppError::AlreadyInFlight(key.to_string())
        })
    }

    async fn refresh_after_mutation(&self) {
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Watchlist refresh after mutation failed");
        }
    }

    fn notify_failure(&self, error: &AppError, message: &str) {
        if error.is_cancelled() {
            return;
        }
        tracing::error!(error = %error, "{}", message);
        self.notifier.notify(NotificationLevel::Error, message);
    }

    fn upsert(&self, item: WatchlistItem) {
        let mut mirror = self.mirror();
        match mirror.iter_mut().find(|existing| existing.matches(&item.key())) {
            Some(existing) => *existing = item,
            None => mirror.push(item),
        }
    }

    fn replace_mirror(&self, items: Vec<WatchlistItem>) {
        let mut deduped: Vec<WatchlistItem> = Vec::with_capacity(items.len());
        for item in items {
            match deduped.iter_mut().find(|existing| existing.matches(&item.key())) {
                Some(existing) => *existing = item,
                None => deduped.push(item),
            }
        }
        *self.mirror() = deduped;
    }

    fn mirror(&self) -> MutexGuard<'_, Vec<WatchlistItem>> {
        self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
