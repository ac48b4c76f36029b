//! HTTP mediator for the MindEase companion.
//!
//! Exposes the wire contract consumed by the browser client:
//! `POST /chat` and `GET /agora-token`, plus a `/health` probe.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, start_server};
pub use state::AppState;
