//! Client core for a media-discovery service
//!
//! Keeps a local watchlist mirror consistent with the remote catalog API and runs the
//! debounced, race-arbitrated search and suggestion engine behind a search box. Rendering is
//! left to implementations of the traits in [`ui`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod search;
pub mod ui;
pub mod watchlist;

pub use config::Config;
pub use dispatch::{AppContext, Collaborators, Dispatcher, UiEvent};
pub use error::{AppError, AppResult};
