//! Simulated transfer backend handlers

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::SimulatorState;
use crate::bridge::types::{TransactionId, TransferPayload, TransferReply};
use crate::config::SimulatorConfig;

/// Reasons a simulated transfer gets declined
pub const FAILURE_REASONS: [&str; 4] = [
    "Insufficient liquidity",
    "Network congestion, please try again",
    "Bridge temporarily unavailable",
    "Transaction timeout",
];

pub const MISSING_FIELDS: &str = "Missing required fields";

/// Pre-drawn result of one simulated transfer
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub delay: Duration,
    /// `Some(reason)` when the transfer is declined
    pub failure: Option<&'static str>,
}

/// Draw the delay and success/failure for one request
pub fn roll<R: Rng>(config: &SimulatorConfig, rng: &mut R) -> Outcome {
    let lo = config.min_delay_ms.min(config.max_delay_ms);
    let hi = config.min_delay_ms.max(config.max_delay_ms);
    let delay = Duration::from_millis(rng.gen_range(lo..=hi));

    let failure_rate = if config.failure_rate.is_nan() {
        0.0
    } else {
        config.failure_rate.clamp(0.0, 1.0)
    };
    let failure = rng
        .gen_bool(failure_rate)
        .then(|| FAILURE_REASONS[rng.gen_range(0..FAILURE_REASONS.len())]);

    Outcome { delay, failure }
}

/// Random `0x` + 64 hex digits, shaped like an EVM transaction hash
pub fn random_transaction_id<R: Rng>(rng: &mut R) -> TransactionId {
    let bytes: [u8; 32] = rng.r#gen();
    TransactionId::new(format!("0x{}", hex::encode(bytes)))
}

/// Simulated bridge transfer
///
/// POST /api/bridge/transfer
///
/// - 400 `Missing required fields` when the body lacks a field
/// - after a random delay: 200 with a transaction id, or 400 with a reason
pub async fn submit_transfer(
    State(state): State<Arc<SimulatorState>>,
    body: Result<Json<TransferPayload>, JsonRejection>,
) -> (StatusCode, Json<TransferReply>) {
    let payload = match body {
        Ok(Json(payload)) if has_required_fields(&payload) => payload,
        Ok(_) | Err(_) => {
            debug!("Rejecting transfer with missing fields");
            return (
                StatusCode::BAD_REQUEST,
                Json(TransferReply::declined(MISSING_FIELDS)),
            );
        }
    };

    // ThreadRng is !Send; draw everything before the await
    let (outcome, transaction_id) = {
        let mut rng = rand::thread_rng();
        let outcome = roll(&state.config, &mut rng);
        (outcome, random_transaction_id(&mut rng))
    };

    tokio::time::sleep(outcome.delay).await;

    match outcome.failure {
        Some(reason) => {
            info!(
                from = payload.source_chain,
                to = payload.destination_chain,
                asset = %payload.asset,
                reason,
                "Simulated transfer declined"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(TransferReply::declined(reason)),
            )
        }
        None => {
            info!(
                from = payload.source_chain,
                to = payload.destination_chain,
                asset = %payload.asset,
                amount = %payload.amount,
                tx_id = %transaction_id,
                delay_ms = outcome.delay.as_millis() as u64,
                "Simulated transfer accepted"
            );
            (StatusCode::OK, Json(TransferReply::accepted(transaction_id)))
        }
    }
}

fn has_required_fields(payload: &TransferPayload) -> bool {
    !payload.asset.trim().is_empty()
        && !payload.amount.trim().is_empty()
        && !payload.recipient_address.trim().is_empty()
}

/// Health check response data
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp_ms: u64,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Json(HealthResponse {
        status: "ok",
        timestamp_ms,
    })
}
