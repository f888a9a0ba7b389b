//! Incremental search and suggestions
//!
//! Keystrokes are debounced ([`debounce`]), every issued request is tagged by a
//! [`arbiter::SequenceGate`], and only the latest request's response reaches the
//! [`crate::ui::ResultSink`].

pub mod arbiter;
pub mod controller;
pub mod debounce;
pub mod fallback;
pub mod suggestions;

pub use controller::{
    Debounced, InputOutcome, SearchController, SearchOutcome, SearchPhase, SearchResultsReady,
    SearchSession, SearchSettings, SearchView, SuggestionOutcome,
};
