//! Web layer for the seating service.
//!
//! A JSON API over the allocator and the schedule store.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Clock};
