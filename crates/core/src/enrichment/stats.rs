//! Running batch statistics.

use std::time::Instant;
use tokio::sync::Mutex;

use super::types::ProgressSnapshot;
use crate::contract::ContractRecord;

/// Collects finished records and the counters describing them.
///
/// The record list and every counter sit behind one lock, so a snapshot never
/// mixes values from two different merges.
pub struct StatsAggregator {
    started: Instant,
    state: Mutex<AggregateState>,
}

struct AggregateState {
    records: Vec<ContractRecord>,
    snapshot: ProgressSnapshot,
}

impl StatsAggregator {
    /// Start a batch of `total` records. The elapsed clock starts now.
    pub fn new(total: usize) -> Self {
        Self {
            started: Instant::now(),
            state: Mutex::new(AggregateState {
                records: Vec::with_capacity(total),
                snapshot: ProgressSnapshot {
                    total_contracts: total,
                    ..Default::default()
                },
            }),
        }
    }

    /// Merge one finished record and return the resulting snapshot.
    pub async fn record(&self, record: ContractRecord) -> ProgressSnapshot {
        let mut state = self.state.lock().await;

        state.snapshot.processed_count += 1;
        if record.has_name() {
            state.snapshot.contracts_with_name += 1;
        }
        if record.is_proxy_contract {
            state.snapshot.proxy_contracts += 1;
        }
        state.snapshot.set_elapsed(self.started.elapsed());
        state.records.push(record);

        state.snapshot.clone()
    }

    /// Current counters.
    pub async fn snapshot(&self) -> ProgressSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Take the collected records along with the final counters.
    pub async fn finish(&self) -> (Vec<ContractRecord>, ProgressSnapshot) {
        let mut state = self.state.lock().await;
        let records = std::mem::take(&mut state.records);
        (records, state.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn named(address: &str, name: &str, proxy: bool) -> ContractRecord {
        let mut record = ContractRecord::new(address, "base");
        record.name = name.to_string();
        record.is_proxy_contract = proxy;
        record
    }

    #[tokio::test]
    async fn test_counters() {
        let agg = StatsAggregator::new(3);
        agg.record(named("0x1", "Token", false)).await;
        agg.record(named("0x2", "", false)).await;
        let snap = agg.record(named("0x3", "Proxy", true)).await;

        assert_eq!(snap.total_contracts, 3);
        assert_eq!(snap.processed_count, 3);
        assert_eq!(snap.contracts_with_name, 2);
        assert_eq!(snap.proxy_contracts, 1);
        assert!(snap.is_complete());

        let (records, final_stats) = agg.finish().await;
        assert_eq!(records.len(), 3);
        assert_eq!(final_stats, snap);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let agg = StatsAggregator::new(0);
        let snap = agg.snapshot().await;
        assert_eq!(snap.processed_count, 0);
        assert!(snap.is_complete());
        let (records, _) = agg.finish().await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_merges_are_consistent() {
        let agg = Arc::new(StatsAggregator::new(200));
        let mut handles = Vec::new();
        for i in 0..200 {
            let agg = Arc::clone(&agg);
            handles.push(tokio::spawn(async move {
                let name = if i % 2 == 0 { "Named" } else { "" };
                agg.record(named(&format!("0x{i}"), name, i % 5 == 0)).await
            }));
        }

        for handle in handles {
            let snap = handle.await.unwrap();
            assert!(snap.processed_count <= snap.total_contracts);
            assert!(snap.contracts_with_name <= snap.processed_count);
            assert!(snap.proxy_contracts <= snap.processed_count);
        }

        let (records, stats) = agg.finish().await;
        assert_eq!(records.len(), 200);
        assert_eq!(stats.processed_count, 200);
        assert_eq!(stats.contracts_with_name, 100);
        assert_eq!(stats.proxy_contracts, 40);
    }
}
