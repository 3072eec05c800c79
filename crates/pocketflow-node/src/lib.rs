//! # PocketFlow Node
//!
//! HTTP API server for the PocketFlow personal finance tracker.
//!
//! The node wires the [`pocketflow_core`] stores and token signer into an
//! axum application:
//!
//! - `/api/register` and `/api/login` are open; everything under
//!   `/api/transactions` and `/api/analytics` requires a bearer token.
//! - The bearer token is verified statelessly; the resolved user's id is
//!   the owner filter for every transaction operation.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin pocketflow-node -- --token-secret change-me
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Router, handlers and the bearer-token extractor
//! - [`config`] - Node configuration management

pub mod api;
pub mod config;
