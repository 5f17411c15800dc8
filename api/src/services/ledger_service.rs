//! Ledger Service
//!
//! 기밀 원장 + 참조 collaborator (coprocessor, ACL, 복호화 gateway) 소유
//!
//! # Design Decision
//!
//! 모든 상태 전이는 하나의 write lock 아래에서 실행
//! - 요청 하나 = read-compute-write 단위 하나
//! - 결과 handle (executed, debt)도 같은 lock 안에서 캡처 → 다른 요청과 섞이지 않음
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     LedgerService                        │
//! │                                                          │
//! │  RwLock<ConfidentialLedger> ──► MockCoprocessor (handles)│
//! │            │                     ▲                       │
//! │            ▼                     │                       │
//! │       EventHistory          Gateway ──► InMemoryAcl      │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use confidential_lending_ledger::{
    Account, Address, Collaborators, ConfidentialAmount, ConfidentialLedger, Decryptor,
    EncryptedInput, Gateway, Handle, InMemoryAcl, LedgerConfig, LedgerResult, MockCoprocessor,
};
use tokio::sync::RwLock;

use super::event_history::{EventHistory, EventRecord};

/// 공개 원장 파라미터 스냅샷
#[derive(Debug, Clone)]
pub struct LedgerStatus {
    pub address: Address,
    pub owner: Address,
    pub interest_rate_bps: u64,
    pub accounts: usize,
    pub events: usize,
}

/// 대출 / 상환 결과 (같은 lock 안에서 캡처)
#[derive(Debug, Clone, Copy)]
pub struct Executed {
    pub executed: ConfidentialAmount,
    pub debt: ConfidentialAmount,
}

pub struct LedgerService {
    ledger: RwLock<ConfidentialLedger>,
    coprocessor: Arc<MockCoprocessor>,
    gateway: Gateway,
    history: EventHistory,
    address: Address,
}

impl LedgerService {
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let coprocessor = Arc::new(MockCoprocessor::new());
        let acl = Arc::new(InMemoryAcl::new());
        let address = config.address;

        let collaborators = Collaborators::mock(coprocessor.clone(), acl.clone());
        let ledger = ConfidentialLedger::new(config, collaborators)?;
        let gateway = Gateway::new(coprocessor.clone(), acl);

        Ok(Self {
            ledger: RwLock::new(ledger),
            coprocessor,
            gateway,
            history: EventHistory::new(),
            address,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    // ============ 상태 전이 ============

    pub async fn deposit(
        &self,
        caller: &Address,
        input: &EncryptedInput,
    ) -> LedgerResult<ConfidentialAmount> {
        let mut ledger = self.ledger.write().await;
        let deposit = ledger.deposit(caller, input)?;
        self.history.record(ledger.drain_events()).await;
        Ok(deposit)
    }

    pub async fn borrow(&self, caller: &Address, input: &EncryptedInput) -> LedgerResult<Executed> {
        let mut ledger = self.ledger.write().await;
        let executed = ledger.borrow(caller, input)?;
        let debt = ledger.account(caller).debt;
        self.history.record(ledger.drain_events()).await;
        Ok(Executed { executed, debt })
    }

    pub async fn repay(&self, caller: &Address, input: &EncryptedInput) -> LedgerResult<Executed> {
        let mut ledger = self.ledger.write().await;
        let executed = ledger.repay(caller, input)?;
        let debt = ledger.account(caller).debt;
        self.history.record(ledger.drain_events()).await;
        Ok(Executed { executed, debt })
    }

    pub async fn accrue_interest(
        &self,
        caller: &Address,
        target: &Address,
    ) -> LedgerResult<ConfidentialAmount> {
        let mut ledger = self.ledger.write().await;
        let debt = ledger.accrue_interest(caller, target)?;
        self.history.record(ledger.drain_events()).await;
        Ok(debt)
    }

    pub async fn set_interest_rate_bps(
        &self,
        caller: &Address,
        new_rate_bps: u64,
    ) -> LedgerResult<()> {
        let mut ledger = self.ledger.write().await;
        ledger.set_interest_rate_bps(caller, new_rate_bps)?;
        self.history.record(ledger.drain_events()).await;
        Ok(())
    }

    // ============ 조회 ============

    pub async fn interest_rate_bps(&self) -> u64 {
        self.ledger.read().await.interest_rate_bps()
    }

    pub async fn position(&self, account: &Address) -> Account {
        self.ledger.read().await.account(account)
    }

    pub async fn status(&self) -> LedgerStatus {
        let ledger = self.ledger.read().await;
        LedgerStatus {
            address: *ledger.address(),
            owner: *ledger.owner(),
            interest_rate_bps: ledger.interest_rate_bps(),
            accounts: ledger.account_count(),
            events: self.history.len().await,
        }
    }

    pub async fn events(
        &self,
        account: Option<&Address>,
        page: u32,
        limit: u32,
    ) -> (Vec<EventRecord>, u64) {
        self.history.page(account, page, limit).await
    }

    // ============ Client-side collaborators ============

    /// `submitter`가 제출할 입력으로 `value` 암호화 (클라이언트 SDK 역할)
    pub fn encrypt_input(&self, value: u64, submitter: &Address) -> EncryptedInput {
        self.coprocessor.encrypt_input(value, &self.address, submitter)
    }

    /// ACL 검사 후 복호화
    pub fn decrypt(&self, handle: Handle, principal: &Address) -> LedgerResult<u64> {
        self.gateway.decrypt(handle, principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidential_lending_ledger::{LedgerError, LedgerEvent};

    fn service() -> LedgerService {
        LedgerService::new(LedgerConfig {
            address: Address::from_low_u64(0x1ed9e5),
            owner: Address::from_low_u64(0xe1),
            interest_rate_bps: 100,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_deposit_borrow_records_history() {
        let service = service();
        let alice = Address::from_low_u64(0xa11ce);

        let input = service.encrypt_input(1000, &alice);
        service.deposit(&alice, &input).await.unwrap();
        let input = service.encrypt_input(400, &alice);
        let outcome = service.borrow(&alice, &input).await.unwrap();

        assert_eq!(service.decrypt(outcome.executed.handle(), &alice).unwrap(), 400);
        assert_eq!(service.decrypt(outcome.debt.handle(), &alice).unwrap(), 400);
        let (events, total) = service.events(None, 0, 20).await;
        assert_eq!(total, 2);
        assert_eq!(events[1].event, LedgerEvent::Borrowed { account: alice });
    }

    #[tokio::test]
    async fn test_failed_call_records_nothing() {
        let service = service();
        let alice = Address::from_low_u64(0xa11ce);

        let result = service.set_interest_rate_bps(&alice, 200).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
        assert_eq!(service.status().await.events, 0);
        assert_eq!(service.interest_rate_bps().await, 100);
    }
}
