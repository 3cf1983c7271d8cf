//! Domain logic for AR Studio.
//!
//! No database or HTTP dependencies live here, so everything can be unit
//! tested directly and reused by the API and repository layers.

pub mod asset;
pub mod error;
pub mod experience_config;
pub mod markers;
pub mod publish;
pub mod qr;
pub mod slug;
pub mod storage;
pub mod types;
pub mod viewer;
