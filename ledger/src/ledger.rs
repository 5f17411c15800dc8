//! Confidential ledger operations
//!
//! Deposit, Borrow, Repay and AccrueInterest over encrypted balances.
//!
//! Every operation follows the same unit of atomicity:
//! 1. read the full account record once
//! 2. compute every new handle from that snapshot
//! 3. write the record back once
//! 4. grant decryption rights and record the event
//!
//! Any error is raised in step 1 or 2, so a failed call leaves the store,
//! the rate, the ACL and the event log untouched.
//!
//! # Borrow
//! ```text
//! newDebt  = debt + req
//! noWrap   = newDebt >= debt
//! limit    = floor(deposit * COLLATERAL_FACTOR_BPS / BPS)
//! within   = limit >= newDebt
//! executed = select(noWrap, select(within, req, 0), 0)
//! debt     = debt + executed
//! ```
//! `limit >= newDebt` is the same test as
//! `deposit * COLLATERAL_FACTOR_BPS >= newDebt * BPS` over the integers, but
//! `limit` is computed without leaving `u64`, so no request can wrap its way
//! past the check. Neither condition is ever decrypted. A rejected borrow
//! runs the same instruction sequence as an accepted one and lends an
//! encrypted zero.
//!
//! # Overflow
//! Executor arithmetic wraps modulo 2^64. The ledger guards every sum it
//! commits: an overflowing deposit is absorbed (balance unchanged), an
//! overflowing borrow lends zero, and accrued debt saturates at `u64::MAX`.

use std::sync::Arc;

use crate::error::LedgerResult;
use crate::fhe::{
    AccessControlList, ConfidentialAmount, EncryptedInput, Executor, Fhe, FheResult, Handle,
    InMemoryAcl, InputVerifier, MockCoprocessor,
};
use crate::rate::RateAdmin;
use crate::store::{Account, AccountStore, InMemoryAccountStore};
use crate::types::{Address, LedgerEvent, BPS, COLLATERAL_FACTOR_BPS};

/// Construction parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Address the encrypted inputs must be bound to
    pub address: Address,
    /// Principal allowed to accrue interest and change the rate
    pub owner: Address,
    /// Initial interest rate, at most `MAX_INTEREST_RATE_BPS`
    pub interest_rate_bps: u64,
}

/// External collaborators the ledger depends on
#[derive(Clone)]
pub struct Collaborators {
    pub executor: Arc<dyn Executor>,
    pub inputs: Arc<dyn InputVerifier>,
    pub acl: Arc<dyn AccessControlList>,
}

impl Collaborators {
    /// Wire the reference coprocessor as both executor and input verifier
    pub fn mock(coprocessor: Arc<MockCoprocessor>, acl: Arc<InMemoryAcl>) -> Self {
        Self {
            executor: coprocessor.clone(),
            inputs: coprocessor,
            acl,
        }
    }
}

/// Encrypted public constants, lifted once at construction
#[derive(Debug, Clone, Copy)]
struct Constants {
    zero: ConfidentialAmount,
    max: ConfidentialAmount,
    bps: ConfidentialAmount,
    collateral_factor: ConfidentialAmount,
}

/// Confidential lending ledger
pub struct ConfidentialLedger {
    address: Address,
    fhe: Fhe,
    inputs: Arc<dyn InputVerifier>,
    acl: Arc<dyn AccessControlList>,
    accounts: Box<dyn AccountStore>,
    rate: RateAdmin,
    constants: Constants,
    events: Vec<LedgerEvent>,
}

impl ConfidentialLedger {
    /// Build a ledger with an in-memory account store
    ///
    /// Fails with `RateOutOfRange` when `config.interest_rate_bps` exceeds the cap.
    pub fn new(config: LedgerConfig, collaborators: Collaborators) -> LedgerResult<Self> {
        let rate = RateAdmin::new(config.owner, config.interest_rate_bps)?;
        let fhe = Fhe::new(collaborators.executor);

        let constants = Constants {
            zero: fhe.encrypt_constant(0)?,
            max: fhe.encrypt_constant(u64::MAX)?,
            bps: fhe.encrypt_constant(BPS)?,
            collateral_factor: fhe.encrypt_constant(COLLATERAL_FACTOR_BPS)?,
        };
        collaborators.acl.allow(constants.zero.handle(), &config.address);

        tracing::info!(
            address = %config.address,
            owner = %config.owner,
            rate_bps = config.interest_rate_bps,
            "confidential ledger initialized"
        );

        Ok(Self {
            address: config.address,
            fhe,
            inputs: collaborators.inputs,
            acl: collaborators.acl,
            accounts: Box::new(InMemoryAccountStore::new(constants.zero)),
            rate,
            constants,
            events: Vec::new(),
        })
    }

    // ============ Views ============

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        self.rate.owner()
    }

    pub fn interest_rate_bps(&self) -> u64 {
        self.rate.interest_rate_bps()
    }

    /// Encrypted position of `account` (zero handles if never touched)
    pub fn account(&self, account: &Address) -> Account {
        self.accounts.get(account)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ============ Operations ============

    /// Add an encrypted amount to the caller's deposit. Returns the new
    /// deposit handle. An amount that would wrap the balance is absorbed.
    pub fn deposit(
        &mut self,
        caller: &Address,
        input: &EncryptedInput,
    ) -> LedgerResult<ConfidentialAmount> {
        let amount = self.inputs.verify_input(input, &self.address, caller)?;
        self.deposit_amount(caller, amount)
    }

    /// Borrow against the caller's deposit. Returns the amount actually
    /// lent: the request, or an encrypted zero if it would break the
    /// collateral factor.
    pub fn borrow(
        &mut self,
        caller: &Address,
        input: &EncryptedInput,
    ) -> LedgerResult<ConfidentialAmount> {
        let requested = self.inputs.verify_input(input, &self.address, caller)?;
        self.borrow_amount(caller, requested)
    }

    /// Repay up to the outstanding debt. Returns the amount deducted.
    pub fn repay(
        &mut self,
        caller: &Address,
        input: &EncryptedInput,
    ) -> LedgerResult<ConfidentialAmount> {
        let amount = self.inputs.verify_input(input, &self.address, caller)?;
        self.repay_amount(caller, amount)
    }

    /// Apply one period of interest to `target`'s debt. Owner only.
    /// Returns the new debt handle.
    ///
    /// New debt is `debt + floor(debt * rate / BPS)`, saturating at
    /// `u64::MAX`. No collateral check runs here; interest may lift debt
    /// above the borrow-time bound.
    pub fn accrue_interest(
        &mut self,
        caller: &Address,
        target: &Address,
    ) -> LedgerResult<ConfidentialAmount> {
        if let Err(err) = self.rate.authorize(caller) {
            tracing::warn!(%caller, %target, "accrue_interest rejected: not owner");
            return Err(err);
        }

        let fresh = !self.accounts.contains(target);
        let mut account = self.accounts.get(target);

        let rate = self.fhe.encrypt_constant(self.rate.interest_rate_bps())?;
        let interest = self.scale_bps(account.debt, rate)?;
        let accrued = self.fhe.add(account.debt, interest)?;
        let no_wrap = self.fhe.ge(accrued, account.debt)?;
        account.debt = self.fhe.select(no_wrap, accrued, self.constants.max)?;

        self.accounts.set(*target, account);
        self.grant(account.debt.handle(), target);
        if fresh {
            self.grant(account.deposit.handle(), target);
        }
        self.emit(LedgerEvent::InterestAccrued { account: *target });
        Ok(account.debt)
    }

    /// Replace the process-wide interest rate. Owner only, at most
    /// `MAX_INTEREST_RATE_BPS`.
    pub fn set_interest_rate_bps(
        &mut self,
        caller: &Address,
        new_rate_bps: u64,
    ) -> LedgerResult<()> {
        if let Err(err) = self.rate.set(caller, new_rate_bps) {
            tracing::warn!(%caller, new_rate_bps, error = %err, "set_interest_rate_bps rejected");
            return Err(err);
        }
        self.emit(LedgerEvent::InterestRateUpdated { new_rate_bps });
        Ok(())
    }

    // ============ Handle-level operations ============

    pub(crate) fn deposit_amount(
        &mut self,
        caller: &Address,
        amount: ConfidentialAmount,
    ) -> LedgerResult<ConfidentialAmount> {
        let fresh = !self.accounts.contains(caller);
        let mut account = self.accounts.get(caller);

        let sum = self.fhe.add(account.deposit, amount)?;
        let no_wrap = self.fhe.ge(sum, account.deposit)?;
        account.deposit = self.fhe.select(no_wrap, sum, account.deposit)?;

        self.accounts.set(*caller, account);
        self.grant(account.deposit.handle(), caller);
        if fresh {
            self.grant(account.debt.handle(), caller);
        }
        self.emit(LedgerEvent::Deposited { account: *caller });
        Ok(account.deposit)
    }

    pub(crate) fn borrow_amount(
        &mut self,
        caller: &Address,
        requested: ConfidentialAmount,
    ) -> LedgerResult<ConfidentialAmount> {
        let fresh = !self.accounts.contains(caller);
        let mut account = self.accounts.get(caller);

        let new_debt = self.fhe.add(account.debt, requested)?;
        let no_wrap = self.fhe.ge(new_debt, account.debt)?;
        let limit = self.scale_bps(account.deposit, self.constants.collateral_factor)?;
        let within = self.fhe.ge(limit, new_debt)?;
        let approved = self.fhe.select(within, requested, self.constants.zero)?;
        let executed = self.fhe.select(no_wrap, approved, self.constants.zero)?;
        account.debt = self.fhe.add(account.debt, executed)?;

        self.accounts.set(*caller, account);
        self.grant(account.debt.handle(), caller);
        self.grant(executed.handle(), caller);
        if fresh {
            self.grant(account.deposit.handle(), caller);
        }
        self.emit(LedgerEvent::Borrowed { account: *caller });
        Ok(executed)
    }

    pub(crate) fn repay_amount(
        &mut self,
        caller: &Address,
        amount: ConfidentialAmount,
    ) -> LedgerResult<ConfidentialAmount> {
        let fresh = !self.accounts.contains(caller);
        let mut account = self.accounts.get(caller);

        let executed = self.fhe.min(amount, account.debt)?;
        account.debt = self.fhe.sub(account.debt, executed)?;

        self.accounts.set(*caller, account);
        self.grant(account.debt.handle(), caller);
        self.grant(executed.handle(), caller);
        if fresh {
            self.grant(account.deposit.handle(), caller);
        }
        self.emit(LedgerEvent::Repaid { account: *caller });
        Ok(executed)
    }

    // ============ Helpers ============

    /// `floor(value * factor / BPS)` for `factor <= BPS`, with no
    /// intermediate leaving `u64`:
    /// `(value / BPS) * factor + ((value % BPS) * factor) / BPS`
    fn scale_bps(
        &self,
        value: ConfidentialAmount,
        factor: ConfidentialAmount,
    ) -> FheResult<ConfidentialAmount> {
        let whole = self.fhe.div(value, self.constants.bps)?;
        let rounded = self.fhe.mul(whole, self.constants.bps)?;
        let remainder = self.fhe.sub(value, rounded)?;
        let high = self.fhe.mul(whole, factor)?;
        let low = self.fhe.mul(remainder, factor)?;
        let low = self.fhe.div(low, self.constants.bps)?;
        self.fhe.add(high, low)
    }

    /// Allow the ledger itself and `principal` to decrypt `handle`
    fn grant(&self, handle: Handle, principal: &Address) {
        self.acl.allow(handle, &self.address);
        self.acl.allow(handle, principal);
    }

    fn emit(&mut self, event: LedgerEvent) {
        match event.account() {
            Some(account) => tracing::info!(event = event.name(), %account, "ledger event"),
            None => tracing::info!(event = event.name(), detail = ?event, "ledger event"),
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    fn ledger() -> (ConfidentialLedger, Arc<MockCoprocessor>, Arc<InMemoryAcl>) {
        let cp = Arc::new(MockCoprocessor::new());
        let acl = Arc::new(InMemoryAcl::new());
        let config = LedgerConfig {
            address: Address::from_low_u64(0x1ed9e5),
            owner: Address::from_low_u64(0x0e1),
            interest_rate_bps: 100,
        };
        let collaborators = Collaborators::mock(cp.clone(), acl.clone());
        let ledger = ConfidentialLedger::new(config, collaborators).unwrap();
        (ledger, cp, acl)
    }

    #[test]
    fn test_construction_rejects_rate_above_cap() {
        let cp = Arc::new(MockCoprocessor::new());
        let acl = Arc::new(InMemoryAcl::new());
        let config = LedgerConfig {
            address: Address::from_low_u64(1),
            owner: Address::from_low_u64(2),
            interest_rate_bps: 2001,
        };
        let result = ConfidentialLedger::new(config, Collaborators::mock(cp, acl));
        assert!(matches!(result, Err(LedgerError::RateOutOfRange { .. })));
    }

    #[test]
    fn test_deposit_grants_ledger_and_caller() {
        let (mut ledger, cp, acl) = ledger();
        let alice = Address::from_low_u64(0xa11ce);

        let input = cp.encrypt_input(1000, ledger.address(), &alice);
        let deposit = ledger.deposit(&alice, &input).unwrap();

        assert!(acl.is_allowed(deposit.handle(), &alice));
        assert!(acl.is_allowed(deposit.handle(), ledger.address()));
        assert!(!acl.is_allowed(deposit.handle(), ledger.owner()));
        assert_eq!(ledger.account(&alice).deposit, deposit);
        assert_eq!(ledger.events(), &[LedgerEvent::Deposited { account: alice }]);
    }

    #[test]
    fn test_borrow_emits_event_even_when_rejected() {
        let (mut ledger, cp, _) = ledger();
        let alice = Address::from_low_u64(0xa11ce);

        let input = cp.encrypt_input(1, ledger.address(), &alice);
        ledger.borrow(&alice, &input).unwrap();
        assert_eq!(ledger.drain_events(), vec![LedgerEvent::Borrowed { account: alice }]);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_foreign_input_rejected_without_mutation() {
        let (mut ledger, cp, _) = ledger();
        let alice = Address::from_low_u64(0xa11ce);
        let bob = Address::from_low_u64(0xb0b);

        let input = cp.encrypt_input(1000, ledger.address(), &alice);
        let result = ledger.deposit(&bob, &input);
        assert!(matches!(result, Err(LedgerError::ProofVerification(_))));
        assert_eq!(ledger.account_count(), 0);
        assert!(ledger.events().is_empty());
    }
}
