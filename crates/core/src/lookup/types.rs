//! Blockscout smart-contract response body.

use serde::{Deserialize, Serialize};

/// Fields of `GET /api/v2/smart-contracts/{address}` used for enrichment.
///
/// Blockscout sends `null` for most fields on unverified contracts, so every
/// field is optional. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContractMetadata {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub is_fully_verified: Option<bool>,
    #[serde(default)]
    pub is_partially_verified: Option<bool>,
    #[serde(default)]
    pub is_verified_via_sourcify: Option<bool>,
    #[serde(default)]
    pub sourcify_repo_url: Option<String>,
    #[serde(default)]
    pub minimal_proxy_address_hash: Option<String>,
    #[serde(default)]
    pub compiler_version: Option<String>,
    #[serde(default)]
    pub evm_version: Option<String>,
    /// Reported as a string by some explorer versions and a bool by others.
    #[serde(default)]
    pub optimizer: Option<serde_json::Value>,
    /// RFC 3339 verification timestamp.
    #[serde(default)]
    pub verified_at: Option<String>,
}

impl ContractMetadata {
    /// True when any of the verification flags is set.
    pub fn any_verified(&self) -> bool {
        [
            self.is_verified,
            self.is_fully_verified,
            self.is_partially_verified,
            self.is_verified_via_sourcify,
        ]
        .into_iter()
        .any(|flag| flag.unwrap_or(false))
    }

    /// Non-empty minimal proxy hash, if present.
    pub fn proxy_hash(&self) -> Option<&str> {
        self.minimal_proxy_address_hash
            .as_deref()
            .filter(|h| !h.is_empty())
    }
}
