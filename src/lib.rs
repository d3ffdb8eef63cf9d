//! Bridge Orchestrator - cross-chain transfer simulation
//!
//! Drives a token bridge transfer through validation, backend submission and
//! confirmation, with user-triggered retry and reset.
//!
//! # Modules
//!
//! - [`bridge`] - State machine, validator and transaction orchestrator
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`simulator`] - Simulated transfer backend (feature `mock-api`)

pub mod bridge;
pub mod config;
pub mod logging;

#[cfg(feature = "mock-api")]
pub mod simulator;

// Convenient re-exports at crate root
pub use bridge::{
    BridgeEvent, TransactionId, TransactionOrchestrator, TransactionState, TransferRequest,
};
pub use config::{AppConfig, OrchestratorConfig, SimulatorConfig};
