//! Static table of Blockscout endpoints and canonical chain ids.
//!
//! Records carry a short origin key ("base", "optimism", ...). The registry
//! resolves that key to the explorer endpoint used for lookups and to the
//! CAIP-2 style chain id written back into enriched records. A key with no
//! entry is a normal condition: such records pass through unenriched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Built-in chains: (origin key, endpoint, chain id).
const BUILTIN_CHAINS: &[(&str, &str, &str)] = &[
    (
        "optimism",
        "https://optimism.blockscout.com/api/v2/smart-contracts/",
        "eip155-10",
    ),
    (
        "polygon_zkevm",
        "https://zkevm.blockscout.com/api/v2/smart-contracts/",
        "eip155-1101",
    ),
    (
        "mode",
        "https://explorer.mode.network/api/v2/smart-contracts/",
        "eip155-34443",
    ),
    (
        "arbitrum",
        "https://arbitrum.blockscout.com/api/v2/smart-contracts/",
        "eip155-42161",
    ),
    (
        "zora",
        "https://explorer.zora.energy/api/v2/smart-contracts/",
        "eip155-7777777",
    ),
    (
        "base",
        "https://base.blockscout.com/api/v2/smart-contracts/",
        "eip155-8453",
    ),
    (
        "zksync_era",
        "https://zksync.blockscout.com/api/v2/smart-contracts/",
        "eip155-324",
    ),
    (
        "linea",
        "https://explorer.linea.build/api/v2/smart-contracts/",
        "eip155-59144",
    ),
    (
        "mantle",
        "https://explorer.mantle.xyz/api/v2/smart-contracts/",
        "eip155-5000",
    ),
    (
        "redstone",
        "https://explorer.redstone.xyz/api/v2/smart-contracts/",
        "eip155-17001",
    ),
];

/// A chain entry as written in the `[chains.<key>]` config section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChainOverride {
    /// Lookup endpoint; the contract address is appended verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Canonical chain id (e.g. "eip155-10").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// Resolved information for one origin key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChainInfo {
    pub origin_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

/// Read-only mapping from origin key to endpoint and chain id.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainInfo>,
}

impl ChainRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in chain table.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (key, endpoint, chain_id) in BUILTIN_CHAINS {
            registry.insert(key, Some(endpoint.to_string()), Some(chain_id.to_string()));
        }
        registry
    }

    /// Built-in table with configured entries merged on top.
    ///
    /// Fields left unset in an override keep the built-in value.
    pub fn with_overrides<'a>(
        overrides: impl IntoIterator<Item = (&'a String, &'a ChainOverride)>,
    ) -> Self {
        let mut registry = Self::builtin();
        for (key, over) in overrides {
            let existing = registry.chains.get(key.as_str());
            let endpoint = over
                .endpoint
                .clone()
                .or_else(|| existing.and_then(|c| c.endpoint.clone()));
            let chain_id = over
                .chain_id
                .clone()
                .or_else(|| existing.and_then(|c| c.chain_id.clone()));
            registry.insert(key, endpoint, chain_id);
        }
        registry
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, origin_key: &str, endpoint: Option<String>, chain_id: Option<String>) {
        self.chains.insert(
            origin_key.to_string(),
            ChainInfo {
                origin_key: origin_key.to_string(),
                endpoint,
                chain_id,
            },
        );
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_chain(mut self, origin_key: &str, endpoint: &str, chain_id: &str) -> Self {
        self.insert(
            origin_key,
            Some(endpoint.to_string()),
            Some(chain_id.to_string()),
        );
        self
    }

    /// Lookup endpoint for an origin key.
    pub fn endpoint(&self, origin_key: &str) -> Option<&str> {
        self.chains
            .get(origin_key)
            .and_then(|c| c.endpoint.as_deref())
    }

    /// Canonical chain id for an origin key.
    pub fn chain_id(&self, origin_key: &str) -> Option<&str> {
        self.chains
            .get(origin_key)
            .and_then(|c| c.chain_id.as_deref())
    }

    /// Known origin keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    /// All entries, ordered by origin key.
    pub fn chains(&self) -> impl Iterator<Item = &ChainInfo> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}
