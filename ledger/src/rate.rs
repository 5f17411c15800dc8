//! Interest rate administration
//!
//! The rate is explicit configuration state owned by the ledger instance,
//! written only through `RateAdmin::set` by the owner principal and always
//! within `[0, MAX_INTEREST_RATE_BPS]`.

use crate::error::{validation, LedgerResult};
use crate::types::Address;

/// Owner-gated, bounded interest rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateAdmin {
    owner: Address,
    interest_rate_bps: u64,
}

impl RateAdmin {
    /// Fails with `RateOutOfRange` if the initial rate exceeds the cap
    pub fn new(owner: Address, interest_rate_bps: u64) -> LedgerResult<Self> {
        validation::validate_interest_rate(interest_rate_bps)?;
        Ok(Self {
            owner,
            interest_rate_bps,
        })
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn interest_rate_bps(&self) -> u64 {
        self.interest_rate_bps
    }

    /// Ensure `caller` is the owner
    pub fn authorize(&self, caller: &Address) -> LedgerResult<()> {
        validation::validate_owner(caller, &self.owner)
    }

    /// Replace the rate. Authorization is checked before the range.
    pub fn set(&mut self, caller: &Address, new_rate_bps: u64) -> LedgerResult<()> {
        self.authorize(caller)?;
        validation::validate_interest_rate(new_rate_bps)?;
        self.interest_rate_bps = new_rate_bps;
        Ok(())
    }
}
