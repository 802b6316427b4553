//! solvr-core library.
//!
//! Client-side state for the solvr task and solution platform: the
//! paginated list reconciler, the voting ledger, the REST client and the
//! typed form schemas the CLI drives.
//!
//! # Conventions
//!
//! - **Errors**: per-module `thiserror` enums; `anyhow::Result` only at
//!   file-loading edges (config).
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod actions;
pub mod api;
pub mod auth;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gset;
pub mod ledger;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod validate;
