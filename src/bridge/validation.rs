//! Transfer Request Validation
//!
//! Structural checks run before any network I/O. Checks run in a fixed order
//! and stop at the first failure; the error text is shown to the user as-is.

use super::types::TransferRequest;

/// Maximum fractional digits accepted in `amount` (ERC-20 `decimals` ceiling)
pub const MAX_AMOUNT_DECIMALS: usize = 18;

/// Hex digits in an EVM address after the `0x` prefix
pub const ADDRESS_HEX_LEN: usize = 40;

/// Validation errors, one per field rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount must be a positive number (got '{0}')")]
    InvalidAmount(String),

    #[error("Amount supports at most {max} decimal places (got {provided})")]
    AmountPrecision { provided: usize, max: usize },

    #[error("Recipient address must be 0x followed by 40 hexadecimal characters (got '{0}')")]
    InvalidRecipient(String),

    #[error("{field} chain ID must be a positive integer")]
    InvalidChainId { field: &'static str },

    #[error("Destination chain must differ from source chain ({0})")]
    SameChain(u64),

    #[error("Asset must not be empty")]
    MissingAsset,
}

/// Validate a transfer request
///
/// # Check order
/// 1. `amount` is a positive decimal number
/// 2. `amount` has at most 18 fractional digits
/// 3. `recipient_address` is `0x` + 40 hex digits
/// 4. both chain IDs are positive
/// 5. destination differs from source
/// 6. `asset_id` is non-empty
///
/// Returns the normalized request (surrounding whitespace trimmed).
pub fn validate(req: &TransferRequest) -> Result<TransferRequest, ValidationError> {
    let amount = req.amount.trim();
    let fractional_digits = parse_positive_decimal(amount)
        .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))?;

    if fractional_digits > MAX_AMOUNT_DECIMALS {
        return Err(ValidationError::AmountPrecision {
            provided: fractional_digits,
            max: MAX_AMOUNT_DECIMALS,
        });
    }

    let recipient = req.recipient_address.trim();
    if !is_evm_address(recipient) {
        return Err(ValidationError::InvalidRecipient(recipient.to_string()));
    }

    if req.source_chain_id == 0 {
        return Err(ValidationError::InvalidChainId { field: "Source" });
    }
    if req.destination_chain_id == 0 {
        return Err(ValidationError::InvalidChainId {
            field: "Destination",
        });
    }

    if req.source_chain_id == req.destination_chain_id {
        return Err(ValidationError::SameChain(req.source_chain_id));
    }

    let asset = req.asset_id.trim();
    if asset.is_empty() {
        return Err(ValidationError::MissingAsset);
    }

    Ok(TransferRequest {
        source_chain_id: req.source_chain_id,
        destination_chain_id: req.destination_chain_id,
        asset_id: asset.to_string(),
        amount: amount.to_string(),
        recipient_address: recipient.to_string(),
    })
}

/// Parse `digits[.digits]` and return the number of fractional digits if the
/// value is strictly positive.
///
/// Both sides of the dot must be non-empty: ".5" and "5." are rejected,
/// as are signs and exponents.
fn parse_positive_decimal(s: &str) -> Option<usize> {
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.contains('.') && (frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let non_zero = whole.bytes().chain(frac.bytes()).any(|b| b != b'0');
    non_zero.then_some(frac.len())
}

fn is_evm_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => hex.len() == ADDRESS_HEX_LEN && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
