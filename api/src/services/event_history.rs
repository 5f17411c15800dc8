//! Event History
//!
//! `/events` 피드용 append-only 이벤트 기록 (타임스탬프 포함)
//!
//! 항목에는 이벤트가 가진 정보만 담김: 누가, 무엇을 했는지 (금액 없음)

use chrono::{DateTime, Utc};
use confidential_lending_ledger::{Address, LedgerEvent};
use serde::Serialize;
use tokio::sync::RwLock;

/// 이력 내 순번이 붙은 원장 이벤트
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub sequence: u64,
    #[serde(flatten)]
    pub event: LedgerEvent,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct EventHistory {
    records: RwLock<Vec<EventRecord>>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, events: Vec<LedgerEvent>) {
        if events.is_empty() {
            return;
        }
        let mut records = self.records.write().await;
        let now = Utc::now();
        for event in events {
            let sequence = records.len() as u64;
            records.push(EventRecord {
                sequence,
                event,
                recorded_at: now,
            });
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// 오래된 순 한 페이지 (계정 필터 선택)
    ///
    /// 반환: (페이지, 조건에 맞는 전체 개수)
    pub async fn page(
        &self,
        account: Option<&Address>,
        page: u32,
        limit: u32,
    ) -> (Vec<EventRecord>, u64) {
        let records = self.records.read().await;
        let matching: Vec<&EventRecord> = records
            .iter()
            .filter(|r| account.map_or(true, |a| r.event.account() == Some(a)))
            .collect();

        let total = matching.len() as u64;
        let start = (page as usize).saturating_mul(limit as usize);
        let items = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        (items, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_page() {
        let history = EventHistory::new();
        let alice = Address::from_low_u64(1);
        let bob = Address::from_low_u64(2);

        history
            .record(vec![
                LedgerEvent::Deposited { account: alice },
                LedgerEvent::Deposited { account: bob },
                LedgerEvent::Borrowed { account: alice },
                LedgerEvent::InterestRateUpdated { new_rate_bps: 50 },
            ])
            .await;
        assert_eq!(history.len().await, 4);

        let (page, total) = history.page(None, 0, 3).await;
        assert_eq!(total, 4);
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].sequence, 0);

        let (page, total) = history.page(None, 1, 3).await;
        assert_eq!(total, 4);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].sequence, 3);

        let (page, total) = history.page(Some(&alice), 0, 20).await;
        assert_eq!(total, 2);
        assert!(page.iter().all(|r| r.event.account() == Some(&alice)));
    }

    #[tokio::test]
    async fn test_empty_batch_is_ignored() {
        let history = EventHistory::new();
        history.record(Vec::new()).await;
        assert_eq!(history.len().await, 0);
    }
}
