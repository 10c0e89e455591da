//! Feelio gateway: HTTP surface for the browser frontend.
//!
//! Each session owns an independent dialogue (history, log, latest emotion) behind its own
//! async mutex. Nothing is shared between sessions except the generator and the classifier.

pub mod routes;
pub mod state;

pub use routes::build_app;
pub use state::{AppState, GatewaySession, SessionHandle};
