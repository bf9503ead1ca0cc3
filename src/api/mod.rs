//! HTTP surface for the dashboard front end.
//!
//! The date pickers arrive as `start`/`end` query parameters; responses are
//! the derived entities or the fully rendered dashboard as JSON.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{router, AppState};
pub use server::serve;
