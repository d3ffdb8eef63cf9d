//! Bridge Transaction Orchestrator
//!
//! Drives one cross-chain transfer at a time through validation, backend
//! submission and a simulated confirmation, with user-triggered retry.
//!
//! # State Machine
//!
//! ```text
//! IDLE → VALIDATING → SUBMITTING → PENDING → CONFIRMED
//!            ↓             ↓          ↓
//!          FAILED ←────────┴──────────┘
//!            ↓ retry
//!         RETRYING → SUBMITTING
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Single Attempt**: at most one validate→submit→await cycle in flight
//! 2. **Request Preserved**: every non-idle state carries the user's request
//! 3. **Total Reducer**: illegal events are no-ops, never errors
//! 4. **Generation Fencing**: results from a reset or superseded attempt
//!    never reach the state machine

pub mod backend;
pub mod clock;
pub mod error;
pub mod orchestrator;
pub mod state;
pub mod types;
pub mod validation;


// Re-exports for convenience
pub use backend::{HttpTransferBackend, TransferBackend};
pub use clock::{Clock, TokioClock};
pub use error::{BackendError, FailureKind};
pub use orchestrator::{TransactionOrchestrator, Transition};
pub use state::{BridgeEvent, TransactionState};
pub use types::{ChainId, TransactionId, TransferRequest};
pub use validation::{ValidationError, validate};
