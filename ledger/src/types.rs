//! Common types shared across the ledger
//!
//! - `Address`: principal identity (20 bytes, `0x`-prefixed hex)
//! - `LedgerEvent`: amount-free notifications of committed operations
//! - protocol constants (basis points, collateral factor, rate cap)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 100% in basis points
pub const BPS: u64 = 10_000;

/// Maximum debt as a share of deposit, in basis points (50% LTV)
pub const COLLATERAL_FACTOR_BPS: u64 = 5_000;

/// Upper bound for the interest rate parameter (20%)
pub const MAX_INTEREST_RATE_BPS: u64 = 2_000;

/// Principal identity (address-equivalent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Deterministic address for tests and dev defaults
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

/// Address parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address {0:?}: expected 0x followed by 40 hex digits")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        if digits.len() != 40 {
            return Err(AddressParseError(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Observable ledger events
///
/// Events carry identity and occurrence only. Amounts never leave the
/// encrypted domain, so a rejected borrow and an accepted one produce the
/// same `Borrowed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    Deposited { account: Address },
    Borrowed { account: Address },
    Repaid { account: Address },
    InterestAccrued { account: Address },
    InterestRateUpdated { new_rate_bps: u64 },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Deposited { .. } => "deposited",
            LedgerEvent::Borrowed { .. } => "borrowed",
            LedgerEvent::Repaid { .. } => "repaid",
            LedgerEvent::InterestAccrued { .. } => "interest_accrued",
            LedgerEvent::InterestRateUpdated { .. } => "interest_rate_updated",
        }
    }

    /// Account the event refers to, if any
    pub fn account(&self) -> Option<&Address> {
        match self {
            LedgerEvent::Deposited { account }
            | LedgerEvent::Borrowed { account }
            | LedgerEvent::Repaid { account }
            | LedgerEvent::InterestAccrued { account } => Some(account),
            LedgerEvent::InterestRateUpdated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_valid() {
        let addr: Address = "0x1234567890123456789012345678901234567890".parse().unwrap();
        assert_eq!(addr.to_string(), "0x1234567890123456789012345678901234567890");
    }

    #[test]
    fn test_address_uppercase_hex_normalized() {
        let addr: Address = "0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD".parse().unwrap();
        assert_eq!(addr.to_string(), "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd");
    }

    #[test]
    fn test_address_invalid() {
        assert!("invalid".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("1234567890123456789012345678901234567890".parse::<Address>().is_err());
        assert!("0xzz34567890123456789012345678901234567890".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_from_low_u64() {
        let addr = Address::from_low_u64(1);
        assert_eq!(addr.to_string(), "0x0000000000000000000000000000000000000001");
    }

    #[test]
    fn test_event_serialization_has_no_amount() {
        let event = LedgerEvent::Borrowed { account: Address::from_low_u64(7) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "borrowed");
        assert_eq!(json["account"], "0x0000000000000000000000000000000000000007");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
