//! Transfer Backend
//!
//! The remote service that accepts a transfer request and, after some delay,
//! either assigns a transaction id or declines with a reason.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::BackendError;
use super::types::{TransactionId, TransferPayload, TransferReply, TransferRequest};

/// Transfer backend trait
///
/// Implementations must not panic; every failure is a [`BackendError`].
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Submit a transfer; resolves once the backend has answered
    async fn submit(&self, request: &TransferRequest) -> Result<TransactionId, BackendError>;
}

/// HTTP transfer backend
///
/// `POST`s a [`TransferPayload`] as JSON and interprets a [`TransferReply`].
/// Any non-2xx status or `success: false` is a decline.
pub struct HttpTransferBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpTransferBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransferBackend for HttpTransferBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn submit(&self, request: &TransferRequest) -> Result<TransactionId, BackendError> {
        let payload = TransferPayload::from(request);

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "Bridge backend request failed");
                BackendError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), body = %body, "Bridge backend replied");

        interpret_reply(status, &body)
    }
}

fn interpret_reply(status: reqwest::StatusCode, body: &str) -> Result<TransactionId, BackendError> {
    let reply = serde_json::from_str::<TransferReply>(body).ok();

    match reply {
        Some(TransferReply {
            success: true,
            transaction_id: Some(id),
            ..
        }) if status.is_success() => Ok(id),
        Some(TransferReply {
            success: true,
            transaction_id: None,
            ..
        }) if status.is_success() => Err(BackendError::MalformedResponse(
            "missing transactionId".into(),
        )),
        Some(TransferReply {
            error: Some(message),
            ..
        }) if !message.is_empty() => Err(BackendError::Declined(message)),
        Some(_) if status.is_success() => Err(BackendError::Declined("Transfer failed".into())),
        None if status.is_success() => Err(BackendError::MalformedResponse(format!(
            "unparseable body ({} bytes)",
            body.len()
        ))),
        _ => Err(BackendError::Declined(format!(
            "Transfer failed with status {}",
            status.as_u16()
        ))),
    }
}


#[cfg(test)]
pub use mock::MockBackend;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_interpret_success() {
        let id = interpret_reply(StatusCode::OK, r#"{"success":true,"transactionId":"0xabc"}"#);
        assert_eq!(id, Ok(TransactionId::new("0xabc")));
    }

    #[test]
    fn test_interpret_declined_with_message() {
        let err = interpret_reply(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"error":"Insufficient liquidity"}"#,
        );
        assert_eq!(err, Err(BackendError::Declined("Insufficient liquidity".into())));
    }

    #[test]
    fn test_interpret_success_false_on_200() {
        let err = interpret_reply(StatusCode::OK, r#"{"success":false,"error":"Paused"}"#);
        assert_eq!(err, Err(BackendError::Declined("Paused".into())));

        let err = interpret_reply(StatusCode::OK, r#"{"success":false}"#);
        assert_eq!(err, Err(BackendError::Declined("Transfer failed".into())));
    }

    #[test]
    fn test_interpret_non_2xx_without_body() {
        let err = interpret_reply(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(
            err,
            Err(BackendError::Declined("Transfer failed with status 502".into()))
        );

        // success:true but error status is still a decline
        let err = interpret_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"success":true,"transactionId":"0xabc"}"#,
        );
        assert!(matches!(err, Err(BackendError::Declined(_))));
    }

    #[test]
    fn test_interpret_malformed_success() {
        assert!(matches!(
            interpret_reply(StatusCode::OK, r#"{"success":true}"#),
            Err(BackendError::MalformedResponse(_))
        ));
        assert!(matches!(
            interpret_reply(StatusCode::OK, "not json"),
            Err(BackendError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_backend_script_then_default() {
        let backend = MockBackend::accepting("0xdefault");
        backend.push_reply(Err(BackendError::Declined("first".into())));

        let req = TransferRequest::new(1, 137, "wbtc", "1", "0x0");
        assert!(backend.submit(&req).await.is_err());
        assert_eq!(
            backend.submit(&req).await,
            Ok(TransactionId::new("0xdefault"))
        );
        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.requests(), vec![req.clone(), req]);
    }
}
