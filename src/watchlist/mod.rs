pub mod controls;
pub mod export;
mod guard;
pub mod store;

pub use controls::{ControlId, ControlRegistry};
pub use store::{RefreshReport, ToggleOutcome, WatchlistStore};
