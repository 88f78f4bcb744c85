//! HTTP edge: axum router, handlers, and the static model catalog.

pub mod models;
pub mod routes;

pub use routes::{AppState, router};
