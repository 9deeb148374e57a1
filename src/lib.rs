//! Distributed Arithmetic Calculator Library
//!
//! This library crate defines the modules shared by the two binaries:
//! the orchestrator (`main.rs`) and the worker agent (`bin/agent.rs`).
//!
//! ## Architecture Modules
//! - **`expression`**: validation, tokenization and two-tier decomposition of
//!   arithmetic text into a graph of binary tasks.
//! - **`orchestrator`**: the in-memory task store, expression registry and result
//!   propagation behind one lock, exposed to clients and workers over HTTP.
//! - **`agent`**: the worker side; a pool of pollers that fetch tasks, compute
//!   them and report results.
//! - **`config`**: environment-driven settings for both binaries.
//! - **`error`**: typed error enums.

pub mod agent;
pub mod config;
pub mod error;
pub mod expression;
pub mod orchestrator;
