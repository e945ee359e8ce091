//! Contract records and the CSV input loader.

mod loader;
mod types;

pub use loader::{load_records, LoadError};
pub use types::ContractRecord;
