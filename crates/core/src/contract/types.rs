//! The record type that flows through the enrichment pipeline.

use serde::{Deserialize, Serialize};

/// One contract entry, shaped after the OpenLabels column set.
///
/// `address` and `origin_key` identify the record and are set by the loader.
/// Everything else is enrichment written once per batch by the mapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractRecord {
    pub address: String,
    pub chain_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_project: String,
    #[serde(default)]
    pub usage_category: String,
    #[serde(default)]
    pub deployment_tx: String,
    #[serde(default)]
    pub deployer_address: String,
    #[serde(default)]
    pub deployment_date: String,
    #[serde(default)]
    pub verified_status: bool,
    #[serde(default)]
    pub is_proxy_contract: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proxy_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub implementation_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_repo_url: String,
    pub origin_key: String,
}

impl ContractRecord {
    /// New unenriched record. The chain id starts out as the origin key and
    /// is replaced by the canonical id during enrichment.
    pub fn new(address: impl Into<String>, origin_key: impl Into<String>) -> Self {
        let origin_key = origin_key.into();
        Self {
            address: address.into(),
            chain_id: origin_key.clone(),
            origin_key,
            ..Default::default()
        }
    }

    /// Whether the lookup produced a display name.
    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }
}
