//! Transaction Orchestrator
//!
//! Owns the state machine, talks to the transfer backend and feeds the
//! results back in as events. This is the only writer of the state cell.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::backend::{HttpTransferBackend, TransferBackend};
use super::clock::{Clock, TokioClock};
use super::error::{BackendError, FailureKind};
use super::state::{BridgeEvent, TransactionState};
use super::types::{TransactionId, TransferRequest};
use super::validation::validate;
use crate::config::OrchestratorConfig;

const TRANSITION_BUFFER: usize = 64;

/// One applied state change, as published to subscribers
#[derive(Debug, Clone)]
pub struct Transition {
    pub generation: u64,
    pub event: BridgeEvent,
    pub from: TransactionState,
    pub to: TransactionState,
    pub at: DateTime<Utc>,
}

/// Which events may reach the reducer
#[derive(Debug, Clone, Copy)]
enum Admit {
    /// Only while `generation` is still the live attempt
    Current(u64),
    /// Starts a new generation, superseding any attempt in flight
    Supersede,
}

/// The single state cell plus its attempt generation
///
/// Generation checks and state changes happen under the watch channel's
/// write lock, so a superseded attempt can never land an event after a
/// reset or a newer attempt.
struct Shared {
    cell: watch::Sender<TransactionState>,
    generation: AtomicU64,
    transitions: broadcast::Sender<Transition>,
}

impl Shared {
    fn new() -> Self {
        let (cell, _) = watch::channel(TransactionState::Idle);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        Self {
            cell,
            generation: AtomicU64::new(0),
            transitions,
        }
    }

    /// Apply `event` if admitted and legal
    ///
    /// Returns the attempt generation and the new state when applied.
    fn apply(&self, event: BridgeEvent, admit: Admit) -> Option<(u64, TransactionState)> {
        let mut applied = None;

        self.cell.send_if_modified(|state| {
            let current = self.generation.load(Ordering::SeqCst);
            if let Admit::Current(expected) = admit
                && expected != current
            {
                debug!(
                    expected,
                    current,
                    event = event.name(),
                    "Discarding event from superseded attempt"
                );
                return false;
            }

            let Some(next) = state.transition(&event) else {
                debug!(state = %state, event = event.name(), "Ignoring event not legal in current state");
                return false;
            };
            if next == *state {
                // RESET while already IDLE
                return false;
            }

            let generation = match admit {
                Admit::Current(generation) => generation,
                Admit::Supersede => {
                    self.generation.store(current + 1, Ordering::SeqCst);
                    current + 1
                }
            };

            let from = std::mem::replace(state, next.clone());
            info!(generation, from = %from, to = %next, event = event.name(), "Bridge transition");

            // No subscribers is fine
            let _ = self.transitions.send(Transition {
                generation,
                event,
                from,
                to: next.clone(),
                at: Utc::now(),
            });

            applied = Some((generation, next));
            true
        });

        applied
    }

    fn dispatch(&self, generation: u64, event: BridgeEvent) -> Option<TransactionState> {
        self.apply(event, Admit::Current(generation))
            .map(|(_, state)| state)
    }
}

/// Bridge transaction orchestrator
///
/// Cheap to clone; clones share the same state cell.
///
/// # Invariants
/// - At most one attempt in flight: `submit` only starts from `IDLE`,
///   `retry_transaction` only from `FAILED`.
/// - Every failure (validation, backend decline, transport) ends in
///   `FAILED`; nothing is returned to the caller as an error.
/// - Completions from an attempt that was reset or superseded are dropped.
#[derive(Clone)]
pub struct TransactionOrchestrator {
    backend: Arc<dyn TransferBackend>,
    clock: Arc<dyn Clock>,
    config: OrchestratorConfig,
    shared: Arc<Shared>,
}

impl TransactionOrchestrator {
    pub fn new(
        backend: Arc<dyn TransferBackend>,
        clock: Arc<dyn Clock>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            backend,
            clock,
            config,
            shared: Arc::new(Shared::new()),
        }
    }

    /// Orchestrator talking HTTP to `config.backend_url` on wall-clock timers
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, BackendError> {
        let backend = HttpTransferBackend::new(&config.backend_url, config.request_timeout())?;
        info!(
            backend = %config.backend_url,
            retry_delay_ms = config.retry_delay_ms,
            confirmation_delay_ms = config.confirmation_delay_ms,
            "Bridge orchestrator configured"
        );
        Ok(Self::new(
            Arc::new(backend),
            Arc::new(TokioClock),
            config.clone(),
        ))
    }

    /// Start a transfer
    ///
    /// No-op unless the machine is `IDLE`. Resolves once the backend round
    /// trip has finished; the confirmation arrives later on a detached task.
    pub async fn submit(&self, request: TransferRequest) {
        let Some((generation, _)) = self
            .shared
            .apply(BridgeEvent::Submit(request.clone()), Admit::Supersede)
        else {
            warn!(state = %self.state(), "Submit ignored: orchestrator is not idle");
            return;
        };

        match validate(&request) {
            Err(e) => {
                warn!(
                    generation,
                    kind = FailureKind::from(&e).as_str(),
                    reason = %e,
                    "Transfer request rejected"
                );
                self.shared
                    .dispatch(generation, BridgeEvent::ValidationFailed(e.to_string()));
            }
            Ok(normalized) => {
                // State keeps the caller's request as typed; only the wire
                // payload is normalized.
                if self
                    .shared
                    .dispatch(generation, BridgeEvent::ValidationSucceeded(request))
                    .is_some()
                {
                    self.send_to_backend(generation, normalized).await;
                }
            }
        }
    }

    /// Retry the failed transfer with the stored request
    ///
    /// No-op unless the machine is `FAILED`. Shows `RETRYING` for the
    /// configured retry delay before the new backend call.
    pub async fn retry_transaction(&self) {
        let Some((generation, _)) = self.shared.apply(BridgeEvent::Retry, Admit::Supersede) else {
            warn!(state = %self.state(), "Retry ignored: no failed transaction");
            return;
        };

        self.clock.sleep(self.config.retry_delay()).await;

        let Some(TransactionState::Submitting { request }) =
            self.shared.dispatch(generation, BridgeEvent::Retry)
        else {
            debug!(generation, "Retry superseded before resubmission");
            return;
        };

        // A request that failed validation fails again without touching
        // the network; only SUBMITTING -> FAILED is open from here.
        match validate(&request) {
            Err(e) => {
                warn!(generation, reason = %e, "Stored transfer request is still invalid");
                self.shared
                    .dispatch(generation, BridgeEvent::BackendRejected(e.to_string()));
            }
            Ok(normalized) => self.send_to_backend(generation, normalized).await,
        }
    }

    /// Return to `IDLE` unconditionally
    ///
    /// In-flight calls and timers keep running but their results are dropped.
    pub fn reset_transaction(&self) {
        self.shared.apply(BridgeEvent::Reset, Admit::Supersede);
    }

    async fn send_to_backend(&self, generation: u64, request: TransferRequest) {
        debug!(
            generation,
            backend = self.backend.name(),
            from = request.source_chain_id,
            to = request.destination_chain_id,
            asset = %request.asset_id,
            amount = %request.amount,
            "Submitting transfer"
        );

        match self.backend.submit(&request).await {
            Ok(transaction_id) => {
                if self
                    .shared
                    .dispatch(
                        generation,
                        BridgeEvent::BackendAccepted(transaction_id.clone()),
                    )
                    .is_some()
                {
                    self.spawn_confirmation(generation, transaction_id);
                }
            }
            Err(e) => {
                warn!(
                    generation,
                    kind = e.kind().as_str(),
                    error = %e,
                    "Transfer declined"
                );
                self.shared
                    .dispatch(generation, BridgeEvent::BackendRejected(e.to_string()));
            }
        }
    }

    /// Simulated confirmation after a fixed delay
    fn spawn_confirmation(&self, generation: u64, transaction_id: TransactionId) {
        let shared = self.shared.clone();
        let clock = self.clock.clone();
        let delay = self.config.confirmation_delay();

        tokio::spawn(async move {
            clock.sleep(delay).await;
            if shared
                .dispatch(
                    generation,
                    BridgeEvent::ConfirmationReceived(transaction_id.clone()),
                )
                .is_none()
            {
                debug!(generation, tx_id = %transaction_id, "Stale confirmation dropped");
            }
        });
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TransactionState {
        self.shared.cell.borrow().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.shared.cell.borrow().is_submitting()
    }

    pub fn can_retry(&self) -> bool {
        self.shared.cell.borrow().can_retry()
    }

    /// Failure reason, `Some` exactly when `FAILED`
    pub fn error(&self) -> Option<String> {
        self.shared.cell.borrow().error().map(str::to_string)
    }

    /// Latest-value subscription for re-rendering
    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.shared.cell.subscribe()
    }

    /// Every applied transition, in order
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<Transition> {
        self.shared.transitions.subscribe()
    }
}
