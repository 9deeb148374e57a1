//! Worker Agent Module
//!
//! The remote side of the system: a pool of workers that pull tasks from the
//! orchestrator over HTTP, evaluate them and push the results back.
//!
//! ## Submodules
//! - **`calculator`**: evaluation of a single binary operation.
//! - **`client`**: HTTP client for the orchestrator's task endpoints.
//! - **`worker`**: the polling worker pool.

pub mod calculator;
pub mod client;
pub mod worker;
