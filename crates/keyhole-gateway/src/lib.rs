//! HTTP gateway for the Keyhole URL shortener.
//!
//! Translates HTTP requests into calls on a [`Shortener`](keyhole_core::Shortener).
//! Rules about records live in `keyhole-core` and `keyhole-shortener`.

pub mod app;
pub mod auth;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
