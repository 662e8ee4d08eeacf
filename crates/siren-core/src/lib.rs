//! siren-core library.
//!
//! Domain model, query pipeline, persistence, and the application state
//! store for the emergency incident dashboard.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums inside the library; `anyhow::Result`
//!   only where configuration files are read.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod actions;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod query;
pub mod seed;
pub mod storage;
pub mod store;

pub use store::{AppState, Store, StoreBuilder};
