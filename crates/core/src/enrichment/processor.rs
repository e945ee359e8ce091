//! Batch processor implementation.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::EnrichmentConfig;
use super::stats::StatsAggregator;
use super::types::{BatchError, BatchResult, ItemError, TaskOutcome};
use crate::contract::ContractRecord;
use crate::lookup::{FetchClient, FetchError, LookupSource};
use crate::mapper::apply_metadata;
use crate::metrics::{BATCHES_TOTAL, BATCH_DURATION, RECORDS_PROCESSED};
use crate::progress::{
    progress_channel, Delivery, ProgressMessage, ProgressPublisher, ProgressSink,
};
use crate::registry::ChainRegistry;

/// Enriches batches of contract records against the chain explorers.
pub struct BatchProcessor {
    config: EnrichmentConfig,
    registry: Arc<ChainRegistry>,
    fetcher: FetchClient,
}

impl BatchProcessor {
    /// Create a new processor.
    pub fn new(
        config: EnrichmentConfig,
        registry: Arc<ChainRegistry>,
        source: Arc<dyn LookupSource>,
    ) -> Self {
        let fetcher = FetchClient::new(source, &config.retry);
        Self {
            config,
            registry,
            fetcher,
        }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Enrich a batch.
    ///
    /// Schedules the first `max_items` records (all of them when zero), one
    /// task each, with lookups admitted through a semaphore of
    /// `max_concurrent` slots. Every finished record is merged into the
    /// aggregator and, when a publisher is given, its snapshot is published.
    ///
    /// Per-record failures are collected in [`BatchResult::errors`] and never
    /// stop sibling tasks. The only error returned here is a worker task that
    /// panicked.
    pub async fn process(
        &self,
        mut records: Vec<ContractRecord>,
        max_items: usize,
        progress: Option<ProgressPublisher>,
    ) -> Result<BatchResult, BatchError> {
        let batch_id = Uuid::new_v4();
        let start = Instant::now();

        if max_items > 0 && records.len() > max_items {
            debug!(
                "Batch {}: limiting {} records to the first {}",
                batch_id,
                records.len(),
                max_items
            );
            records.truncate(max_items);
        }

        let total = records.len();
        let slots = self.config.effective_concurrency();
        info!(
            "Batch {}: enriching {} contracts with {} concurrent lookups via {}",
            batch_id,
            total,
            slots,
            self.fetcher.source_name()
        );

        let semaphore = Arc::new(Semaphore::new(slots));
        let aggregator = Arc::new(StatsAggregator::new(total));
        let mut tasks = JoinSet::new();

        for record in records {
            let semaphore = Arc::clone(&semaphore);
            let aggregator = Arc::clone(&aggregator);
            let registry = Arc::clone(&self.registry);
            let fetcher = self.fetcher.clone();
            let publisher = progress.clone();

            tasks.spawn(async move {
                let outcome = enrich_one(record, &registry, &fetcher, &semaphore).await;
                let (record, failure) = outcome.into_parts();

                let snapshot = aggregator.record(record).await;
                if let Some(publisher) = publisher {
                    publisher.publish(ProgressMessage::Progress(snapshot)).await;
                }

                failure
            });
        }

        // Publishers held by tasks are dropped as they finish; ours goes now.
        drop(progress);

        let mut errors = Vec::new();
        let mut panicked = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(failure)) => errors.push(failure),
                Ok(None) => {}
                Err(e) => {
                    error!("Batch {}: worker task failed: {}", batch_id, e);
                    panicked.get_or_insert_with(|| e.to_string());
                }
            }
        }

        BATCH_DURATION.observe(start.elapsed().as_secs_f64());

        if let Some(reason) = panicked {
            BATCHES_TOTAL.with_label_values(&["panicked"]).inc();
            return Err(BatchError::TaskPanicked(reason));
        }

        let (records, stats) = aggregator.finish().await;
        let result = BatchResult {
            records,
            stats,
            errors,
        };

        if result.is_success() {
            BATCHES_TOTAL.with_label_values(&["success"]).inc();
            info!(
                "Batch {}: processed {} contracts in {} ({} named, {} proxies)",
                batch_id,
                result.stats.processed_count,
                result.stats.elapsed_time,
                result.stats.contracts_with_name,
                result.stats.proxy_contracts
            );
        } else {
            BATCHES_TOTAL.with_label_values(&["partial_failure"]).inc();
            warn!(
                "Batch {}: processed {} contracts in {} with {} failures",
                batch_id,
                result.stats.processed_count,
                result.stats.elapsed_time,
                result.errors.len()
            );
        }

        Ok(result)
    }

    /// Enrich a batch while streaming progress to `sink`.
    ///
    /// Spawns the delivery loop, runs [`process`](Self::process), pushes
    /// exactly one terminal message, closes the channel and waits for the
    /// loop to drain.
    pub async fn process_streaming<S>(
        &self,
        records: Vec<ContractRecord>,
        max_items: usize,
        sink: S,
    ) -> (Result<BatchResult, BatchError>, Delivery)
    where
        S: ProgressSink + 'static,
    {
        let (publisher, receiver) = progress_channel(self.config.effective_progress_buffer());
        let delivery = tokio::spawn(receiver.deliver(sink));

        let result = self.process(records, max_items, Some(publisher.clone())).await;

        let terminal = match &result {
            Ok(batch) => match batch.combined_error() {
                Some(err) => ProgressMessage::failed(err),
                None => ProgressMessage::completed(batch.records.len(), batch.stats.clone()),
            },
            Err(err) => ProgressMessage::failed(err),
        };
        if !publisher.publish(terminal).await {
            debug!("Progress consumer gone, terminal message dropped");
        }
        drop(publisher);

        let delivery = delivery.await.unwrap_or_else(|e| {
            error!("Progress delivery loop failed: {}", e);
            Delivery {
                delivered: 0,
                cancelled: true,
            }
        });

        (result, delivery)
    }
}

/// Run one record through lookup and mapping.
async fn enrich_one(
    record: ContractRecord,
    registry: &ChainRegistry,
    fetcher: &FetchClient,
    semaphore: &Semaphore,
) -> TaskOutcome {
    let Some(endpoint) = registry.endpoint(&record.origin_key) else {
        warn!(
            "No lookup endpoint for origin key '{}', skipping {}",
            record.origin_key, record.address
        );
        RECORDS_PROCESSED.with_label_values(&["skipped"]).inc();
        return TaskOutcome::Done(record);
    };

    let fetched = match semaphore.acquire().await {
        Ok(_permit) => fetcher.fetch(endpoint, &record.address).await,
        Err(e) => {
            RECORDS_PROCESSED.with_label_values(&["failed"]).inc();
            let error = ItemError::new(&record, e.to_string());
            return TaskOutcome::Failed { record, error };
        }
    };

    match fetched {
        Ok(metadata) => {
            RECORDS_PROCESSED.with_label_values(&["enriched"]).inc();
            TaskOutcome::Done(apply_metadata(record, &metadata, registry))
        }
        Err(FetchError::NotFound) => {
            debug!("Contract {} not found on {}", record.address, record.origin_key);
            RECORDS_PROCESSED.with_label_values(&["not_found"]).inc();
            TaskOutcome::Done(record)
        }
        Err(e) => {
            RECORDS_PROCESSED.with_label_values(&["failed"]).inc();
            let error = ItemError::new(&record, e.to_string());
            TaskOutcome::Failed { record, error }
        }
    }
}
