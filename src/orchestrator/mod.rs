//! Orchestrator Module
//!
//! Holds the task graph produced by the decomposer and hands tasks out to
//! remote workers one at a time.
//!
//! ## Architecture Overview
//! The orchestrator follows a **Pull-based** model without leases:
//! 1. **Submission**: an expression is decomposed and its tasks registered in one step.
//!    Tasks whose operands are all numbers go straight into the FIFO dispatch queue.
//! 2. **Dispatch**: a worker pops the head of the queue. A popped task is never
//!    re-queued; a worker that dies before reporting strands its expression.
//! 3. **Propagation**: a reported result is written once, substituted into every
//!    dependent task (queueing those that become ready) and, for the final task,
//!    into the owning expression.
//!
//! All state sits behind a single mutex in `Orchestrator`; submodules never share
//! storage and refer to each other's records by id only.
//!
//! ## Submodules
//! - **`store`**: tasks, dispatch queue and result map.
//! - **`registry`**: expression lifecycle.
//! - **`propagator`**: result substitution and failure poisoning.
//! - **`service`**: the lock-owning `Orchestrator` (dispatch gate).
//! - **`protocol`**: HTTP DTOs and endpoint paths.
//! - **`handlers`**: Axum handlers and router.

pub mod handlers;
pub mod propagator;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;
