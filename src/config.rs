//! Environment Configuration
//!
//! Both binaries read their settings from environment variables once at startup.
//! Unset variables use defaults; unparsable ones log a warning and use defaults.

use crate::expression::types::Operation;

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OPERATION_TIME_MS: u64 = 1000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ORCHESTRATOR_URL: &str = "http://localhost:8080";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
pub fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Invalid {} value {:?}: {}. Using default", key, raw, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Per-operator processing time hints handed to workers with each task.
/// They never affect the orchestrator's own timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationDurations {
    pub addition: Duration,
    pub subtraction: Duration,
    pub multiplication: Duration,
    pub division: Duration,
}

impl OperationDurations {
    pub fn from_env() -> Self {
        let ms = |key: &str| Duration::from_millis(env_or(key, DEFAULT_OPERATION_TIME_MS));
        Self {
            addition: ms("TIME_ADDITION_MS"),
            subtraction: ms("TIME_SUBTRACTION_MS"),
            multiplication: ms("TIME_MULTIPLICATIONS_MS"),
            division: ms("TIME_DIVISIONS_MS"),
        }
    }

    pub fn uniform(duration: Duration) -> Self {
        Self {
            addition: duration,
            subtraction: duration,
            multiplication: duration,
            division: duration,
        }
    }

    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Add => self.addition,
            Operation::Subtract => self.subtraction,
            Operation::Multiply => self.multiplication,
            Operation::Divide => self.division,
        }
    }
}

impl Default for OperationDurations {
    fn default() -> Self {
        Self::uniform(Duration::from_millis(DEFAULT_OPERATION_TIME_MS))
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub bind_addr: SocketAddr,
    pub durations: OperationDurations,
}

impl OrchestratorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("ORCHESTRATOR_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()?;

        Ok(Self {
            bind_addr,
            durations: OperationDurations::from_env(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the orchestrator, without a trailing slash.
    pub orchestrator_url: String,
    /// Number of concurrent workers.
    pub computing_power: usize,
    /// Pause after an empty fetch or a transport error.
    pub poll_interval: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        let orchestrator_url = std::env::var("ORCHESTRATOR_URL")
            .unwrap_or_else(|_| DEFAULT_ORCHESTRATOR_URL.to_string());

        let computing_power = env_or("COMPUTING_POWER", 1usize);
        let computing_power = if computing_power < 1 {
            tracing::warn!("COMPUTING_POWER must be at least 1. Using 1");
            1
        } else {
            computing_power
        };

        Self {
            orchestrator_url: orchestrator_url.trim_end_matches('/').to_string(),
            computing_power,
            poll_interval: Duration::from_millis(env_or(
                "AGENT_POLL_INTERVAL_MS",
                DEFAULT_POLL_INTERVAL_MS,
            )),
        }
    }
}
