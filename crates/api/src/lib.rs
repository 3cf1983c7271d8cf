//! AR Studio API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background worker) so integration tests and the binary entrypoint can
//! both access them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod publishing;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod upload;
