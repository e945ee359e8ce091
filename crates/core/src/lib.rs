pub mod config;
pub mod contract;
pub mod enrichment;
pub mod lookup;
pub mod mapper;
pub mod metrics;
pub mod progress;
pub mod registry;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
};
pub use contract::{load_records, ContractRecord, LoadError};
pub use enrichment::{
    BatchError, BatchProcessor, BatchResult, EnrichmentConfig, ItemError, ProgressSnapshot,
    RetryConfig, StatsAggregator, TaskOutcome,
};
pub use lookup::{
    BlockscoutConfig, BlockscoutSource, ContractMetadata, FetchClient, FetchError, LookupError,
    LookupRequest, LookupSource,
};
pub use mapper::{apply_metadata, format_deployment_date};
pub use progress::{
    progress_channel, CancelFlag, Delivery, ProgressMessage, ProgressPublisher, ProgressReceiver,
    ProgressSink, SinkError,
};
pub use registry::{ChainInfo, ChainOverride, ChainRegistry};
pub use store::RecordStore;
