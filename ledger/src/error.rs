//! Error types for the confidential ledger
//!
//! There is deliberately no "insufficient collateral" variant: an over-limit
//! borrow resolves to an encrypted zero instead of failing.

use thiserror::Error;

use crate::fhe::Handle;
use crate::types::Address;

/// Failures raised by the encrypted-arithmetic executor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FheError {
    /// Handle was never produced by this executor
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(Handle),

    /// Operand has the wrong encrypted type for the operation
    #[error("type mismatch on handle {handle}: expected {expected}")]
    TypeMismatch {
        handle: Handle,
        expected: &'static str,
    },
}

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Caller is not the owner of an owner-only operation
    #[error("caller {caller} is not authorized for this operation")]
    Unauthorized { caller: Address },

    /// Interest rate above the configured cap
    #[error("interest rate {value} bps exceeds maximum {max} bps")]
    RateOutOfRange { value: u64, max: u64 },

    /// Encrypted input proof does not match (ledger, submitter)
    #[error("input proof verification failed: {0}")]
    ProofVerification(String),

    /// Principal was never granted access to the handle
    #[error("{principal} is not authorized to decrypt {handle}")]
    NotAuthorized { handle: Handle, principal: Address },

    #[error(transparent)]
    Fhe(#[from] FheError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Input validation utilities
pub mod validation {
    use super::*;
    use crate::types::MAX_INTEREST_RATE_BPS;

    /// Validate that an interest rate is within the cap
    pub fn validate_interest_rate(rate_bps: u64) -> LedgerResult<()> {
        if rate_bps > MAX_INTEREST_RATE_BPS {
            return Err(LedgerError::RateOutOfRange {
                value: rate_bps,
                max: MAX_INTEREST_RATE_BPS,
            });
        }
        Ok(())
    }

    /// Validate that `caller` is `owner`
    pub fn validate_owner(caller: &Address, owner: &Address) -> LedgerResult<()> {
        if caller != owner {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        Ok(())
    }
}
