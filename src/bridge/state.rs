//! Bridge Transaction State Machine
//!
//! Pure reducer: `(state, event) -> state`. No I/O, never panics.
//!
//! ```text
//! event                 from                  to
//! ─────────────────────────────────────────────────────────
//! Submit                IDLE                  VALIDATING
//! ValidationSucceeded   VALIDATING            SUBMITTING
//! ValidationFailed      VALIDATING            FAILED
//! BackendAccepted       SUBMITTING            PENDING
//! ConfirmationReceived  PENDING (same id)     CONFIRMED
//! BackendRejected       SUBMITTING, PENDING   FAILED
//! Retry                 FAILED                RETRYING
//! Retry                 RETRYING              SUBMITTING
//! Reset                 any                   IDLE
//! ```
//!
//! Any (state, event) pair not in the table is a no-op that returns the
//! state unchanged, so stale or duplicated events are harmless.

use std::fmt;

use super::types::{TransactionId, TransferRequest};

/// Bridge transaction states
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionState {
    /// No transaction in progress
    #[default]
    Idle,

    /// Request handed to the validator
    Validating { request: TransferRequest },

    /// Backend call in flight
    Submitting { request: TransferRequest },

    /// Backend accepted; awaiting confirmation
    Pending {
        transaction_id: TransactionId,
        request: TransferRequest,
    },

    /// Terminal: transfer confirmed
    Confirmed {
        transaction_id: TransactionId,
        request: TransferRequest,
    },

    /// Terminal for this attempt; retry permitted
    Failed {
        reason: String,
        request: TransferRequest,
    },

    /// Between `Failed` and the next `Submitting`
    Retrying {
        reason: String,
        request: TransferRequest,
    },
}

/// Events fed into the reducer, one per real-world occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    Submit(TransferRequest),
    ValidationSucceeded(TransferRequest),
    ValidationFailed(String),
    BackendAccepted(TransactionId),
    ConfirmationReceived(TransactionId),
    BackendRejected(String),
    Retry,
    Reset,
}

impl BridgeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::Submit(_) => "SUBMIT",
            BridgeEvent::ValidationSucceeded(_) => "VALIDATION_SUCCEEDED",
            BridgeEvent::ValidationFailed(_) => "VALIDATION_FAILED",
            BridgeEvent::BackendAccepted(_) => "BACKEND_ACCEPTED",
            BridgeEvent::ConfirmationReceived(_) => "CONFIRMATION_RECEIVED",
            BridgeEvent::BackendRejected(_) => "BACKEND_REJECTED",
            BridgeEvent::Retry => "RETRY",
            BridgeEvent::Reset => "RESET",
        }
    }
}

impl fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TransactionState {
    /// Apply an event, returning the next state
    ///
    /// Illegal events return a clone of `self`.
    pub fn reduce(&self, event: &BridgeEvent) -> TransactionState {
        self.transition(event).unwrap_or_else(|| self.clone())
    }

    /// Apply an event if it is legal in the current state
    ///
    /// Returns `None` for every pair not in the transition table.
    pub fn transition(&self, event: &BridgeEvent) -> Option<TransactionState> {
        use BridgeEvent as E;
        use TransactionState as S;

        let next = match (self, event) {
            (_, E::Reset) => S::Idle,

            (S::Idle, E::Submit(request)) => S::Validating {
                request: request.clone(),
            },

            (S::Validating { .. }, E::ValidationSucceeded(request)) => S::Submitting {
                request: request.clone(),
            },
            (S::Validating { request }, E::ValidationFailed(reason)) => S::Failed {
                reason: reason.clone(),
                request: request.clone(),
            },

            (S::Submitting { request }, E::BackendAccepted(id)) => S::Pending {
                transaction_id: id.clone(),
                request: request.clone(),
            },
            (
                S::Pending {
                    transaction_id,
                    request,
                },
                E::ConfirmationReceived(id),
            ) if transaction_id == id => S::Confirmed {
                transaction_id: transaction_id.clone(),
                request: request.clone(),
            },

            (S::Submitting { request } | S::Pending { request, .. }, E::BackendRejected(reason)) => {
                S::Failed {
                    reason: reason.clone(),
                    request: request.clone(),
                }
            }

            (S::Failed { reason, request }, E::Retry) => S::Retrying {
                reason: reason.clone(),
                request: request.clone(),
            },
            (S::Retrying { request, .. }, E::Retry) => S::Submitting {
                request: request.clone(),
            },

            _ => return None,
        };

        Some(next)
    }

    /// True while an attempt is in progress
    #[inline]
    pub fn is_submitting(&self) -> bool {
        matches!(
            self,
            TransactionState::Validating { .. }
                | TransactionState::Submitting { .. }
                | TransactionState::Pending { .. }
                | TransactionState::Retrying { .. }
        )
    }

    #[inline]
    pub fn can_retry(&self) -> bool {
        matches!(self, TransactionState::Failed { .. })
    }

    /// Terminal states need user action (retry/reset) to move on
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Confirmed { .. } | TransactionState::Failed { .. }
        )
    }

    /// Failure reason, only in `Failed`
    pub fn error(&self) -> Option<&str> {
        match self {
            TransactionState::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn request(&self) -> Option<&TransferRequest> {
        match self {
            TransactionState::Idle => None,
            TransactionState::Validating { request }
            | TransactionState::Submitting { request }
            | TransactionState::Pending { request, .. }
            | TransactionState::Confirmed { request, .. }
            | TransactionState::Failed { request, .. }
            | TransactionState::Retrying { request, .. } => Some(request),
        }
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            TransactionState::Pending { transaction_id, .. }
            | TransactionState::Confirmed { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionState::Idle => "IDLE",
            TransactionState::Validating { .. } => "VALIDATING",
            TransactionState::Submitting { .. } => "SUBMITTING",
            TransactionState::Pending { .. } => "PENDING",
            TransactionState::Confirmed { .. } => "CONFIRMED",
            TransactionState::Failed { .. } => "FAILED",
            TransactionState::Retrying { .. } => "RETRYING",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> TransferRequest {
        TransferRequest::new(
            1,
            137,
            "wbtc",
            "0.1",
            "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0",
        )
    }

    fn tx(id: &str) -> TransactionId {
        TransactionId::new(id)
    }

    fn all_states() -> Vec<TransactionState> {
        vec![
            TransactionState::Idle,
            TransactionState::Validating { request: req() },
            TransactionState::Submitting { request: req() },
            TransactionState::Pending {
                transaction_id: tx("0xabc"),
                request: req(),
            },
            TransactionState::Confirmed {
                transaction_id: tx("0xabc"),
                request: req(),
            },
            TransactionState::Failed {
                reason: "boom".into(),
                request: req(),
            },
            TransactionState::Retrying {
                reason: "boom".into(),
                request: req(),
            },
        ]
    }

    fn all_events() -> Vec<BridgeEvent> {
        vec![
            BridgeEvent::Submit(req()),
            BridgeEvent::ValidationSucceeded(req()),
            BridgeEvent::ValidationFailed("bad".into()),
            BridgeEvent::BackendAccepted(tx("0xabc")),
            BridgeEvent::ConfirmationReceived(tx("0xabc")),
            BridgeEvent::BackendRejected("declined".into()),
            BridgeEvent::Retry,
            BridgeEvent::Reset,
        ]
    }

    fn is_legal(state: &TransactionState, event: &BridgeEvent) -> bool {
        use BridgeEvent as E;
        use TransactionState as S;
        matches!(
            (state, event),
            (_, E::Reset)
                | (S::Idle, E::Submit(_))
                | (S::Validating { .. }, E::ValidationSucceeded(_))
                | (S::Validating { .. }, E::ValidationFailed(_))
                | (S::Submitting { .. }, E::BackendAccepted(_))
                | (S::Pending { .. }, E::ConfirmationReceived(_))
                | (S::Submitting { .. }, E::BackendRejected(_))
                | (S::Pending { .. }, E::BackendRejected(_))
                | (S::Failed { .. }, E::Retry)
                | (S::Retrying { .. }, E::Retry)
        )
    }

    #[test]
    fn test_illegal_events_are_noops() {
        for state in all_states() {
            for event in all_events() {
                if is_legal(&state, &event) {
                    assert!(state.transition(&event).is_some(), "{state} + {event}");
                } else {
                    assert_eq!(state.reduce(&event), state, "{state} + {event}");
                    assert!(state.transition(&event).is_none());
                }
            }
        }
    }

    #[test]
    fn test_happy_path_keeps_transaction_id() {
        let s = TransactionState::Idle
            .reduce(&BridgeEvent::Submit(req()))
            .reduce(&BridgeEvent::ValidationSucceeded(req()));
        assert_eq!(s.as_str(), "SUBMITTING");

        let pending = s.reduce(&BridgeEvent::BackendAccepted(tx("0xabc")));
        assert_eq!(pending.as_str(), "PENDING");

        let confirmed = pending.reduce(&BridgeEvent::ConfirmationReceived(tx("0xabc")));
        assert_eq!(confirmed.as_str(), "CONFIRMED");
        assert_eq!(pending.transaction_id(), confirmed.transaction_id());
        assert_eq!(confirmed.request(), Some(&req()));
    }

    #[test]
    fn test_confirmation_for_other_transaction_ignored() {
        let pending = TransactionState::Pending {
            transaction_id: tx("0xabc"),
            request: req(),
        };
        assert_eq!(
            pending.reduce(&BridgeEvent::ConfirmationReceived(tx("0xdef"))),
            pending
        );
    }

    #[test]
    fn test_second_backend_accept_does_not_confirm() {
        let pending = TransactionState::Pending {
            transaction_id: tx("0xabc"),
            request: req(),
        };
        assert_eq!(pending.reduce(&BridgeEvent::BackendAccepted(tx("0xabc"))), pending);
    }

    #[test]
    fn test_validation_failure_keeps_request() {
        let failed = TransactionState::Validating { request: req() }
            .reduce(&BridgeEvent::ValidationFailed("Amount must be positive".into()));

        assert_eq!(
            failed,
            TransactionState::Failed {
                reason: "Amount must be positive".into(),
                request: req(),
            }
        );
    }

    #[test]
    fn test_failed_reachable_only_via_failure_events() {
        for state in all_states() {
            for event in all_events() {
                let next = state.reduce(&event);
                if next.can_retry() && !state.can_retry() {
                    assert!(matches!(
                        event,
                        BridgeEvent::ValidationFailed(_) | BridgeEvent::BackendRejected(_)
                    ));
                }
            }
        }
    }

    #[test]
    fn test_failed_leaves_only_via_retry_or_reset() {
        let failed = TransactionState::Failed {
            reason: "boom".into(),
            request: req(),
        };
        for event in all_events() {
            let moved = failed.reduce(&event) != failed;
            assert_eq!(
                moved,
                matches!(event, BridgeEvent::Retry | BridgeEvent::Reset),
                "{event}"
            );
        }
    }

    #[test]
    fn test_retry_two_hops_reuse_request() {
        let failed = TransactionState::Failed {
            reason: "boom".into(),
            request: req(),
        };
        let retrying = failed.reduce(&BridgeEvent::Retry);
        assert_eq!(
            retrying,
            TransactionState::Retrying {
                reason: "boom".into(),
                request: req(),
            }
        );
        assert_eq!(
            retrying.reduce(&BridgeEvent::Retry),
            TransactionState::Submitting { request: req() }
        );
    }

    #[test]
    fn test_reset_from_every_state() {
        for state in all_states() {
            let idle = state.reduce(&BridgeEvent::Reset);
            assert_eq!(idle, TransactionState::Idle);
            assert!(idle.request().is_none());
            assert!(idle.error().is_none());
            assert!(!idle.can_retry());
            assert!(!idle.is_submitting());
        }
    }

    #[test]
    fn test_derived_flags() {
        for state in all_states() {
            let label = state.as_str();
            assert_eq!(state.can_retry(), label == "FAILED", "{label}");
            assert_eq!(state.error().is_some(), label == "FAILED", "{label}");
            assert_eq!(
                state.is_submitting(),
                matches!(label, "VALIDATING" | "SUBMITTING" | "PENDING" | "RETRYING"),
                "{label}"
            );
        }
    }
}
