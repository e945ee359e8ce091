use enricher_core::{BatchProcessor, ChainRegistry, Config, RecordStore};

/// Shared application state
pub struct AppState {
    config: Config,
    processor: BatchProcessor,
    store: RecordStore,
}

impl AppState {
    pub fn new(config: Config, processor: BatchProcessor, store: RecordStore) -> Self {
        Self {
            config,
            processor,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn processor(&self) -> &BatchProcessor {
        &self.processor
    }

    pub fn registry(&self) -> &ChainRegistry {
        self.processor.registry()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}
