//! Maps Blockscout metadata onto contract records.

use chrono::DateTime;

use crate::contract::ContractRecord;
use crate::lookup::ContractMetadata;
use crate::registry::ChainRegistry;

/// Display format for deployment dates.
pub const DEPLOYMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name fragments that mark a contract as a proxy when no proxy hash is set.
const PROXY_NAME_HINTS: &[&str] = &["proxy", "erc1967"];

/// Apply a lookup response to a record.
///
/// Pure and infallible: fields absent from the response become empty, and an
/// unparseable `verified_at` leaves the existing deployment date alone.
pub fn apply_metadata(
    mut record: ContractRecord,
    metadata: &ContractMetadata,
    registry: &ChainRegistry,
) -> ContractRecord {
    record.name = metadata.name.clone().unwrap_or_default();
    record.verified_status = metadata.any_verified();
    record.source_repo_url = metadata.sourcify_repo_url.clone().unwrap_or_default();

    match metadata.proxy_hash() {
        Some(hash) => {
            record.is_proxy_contract = true;
            record.proxy_address = hash.to_string();
            // Blockscout's minimal proxy hash stands in for the implementation
            // until the explorer exposes a dedicated field.
            record.implementation_address = hash.to_string();
        }
        None => {
            record.is_proxy_contract = name_suggests_proxy(&record.name);
            record.proxy_address.clear();
            record.implementation_address.clear();
        }
    }

    if let Some(chain_id) = registry.chain_id(&record.origin_key) {
        record.chain_id = chain_id.to_string();
    }

    if let Some(date) = metadata.verified_at.as_deref().and_then(format_deployment_date) {
        record.deployment_date = date;
    }

    record
}

fn name_suggests_proxy(name: &str) -> bool {
    let lower = name.to_lowercase();
    PROXY_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Reformat an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset.
pub fn format_deployment_date(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.format(DEPLOYMENT_DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(origin: &str) -> ContractRecord {
        ContractRecord::new("0xabc", origin)
    }

    #[test]
    fn test_copies_name_and_repo() {
        let meta = ContractMetadata {
            name: Some("GnosisSafe".to_string()),
            sourcify_repo_url: Some("https://repo.sourcify.dev/contracts/full_match/8453/0xabc/".to_string()),
            ..Default::default()
        };
        let out = apply_metadata(record("base"), &meta, &ChainRegistry::builtin());
        assert_eq!(out.name, "GnosisSafe");
        assert!(out.source_repo_url.starts_with("https://repo.sourcify.dev"));
        assert!(!out.verified_status);
        assert!(!out.is_proxy_contract);
    }

    #[test]
    fn test_verified_is_or_of_flags() {
        for idx in 0..4 {
            let mut meta = ContractMetadata::default();
            match idx {
                0 => meta.is_verified = Some(true),
                1 => meta.is_fully_verified = Some(true),
                2 => meta.is_partially_verified = Some(true),
                _ => meta.is_verified_via_sourcify = Some(true),
            }
            let out = apply_metadata(record("base"), &meta, &ChainRegistry::builtin());
            assert!(out.verified_status, "flag {} should verify", idx);
        }
    }

    #[test]
    fn test_proxy_hash_sets_addresses() {
        let meta = ContractMetadata {
            name: Some("Clone".to_string()),
            minimal_proxy_address_hash: Some("0xdead".to_string()),
            ..Default::default()
        };
        let out = apply_metadata(record("base"), &meta, &ChainRegistry::builtin());
        assert!(out.is_proxy_contract);
        assert_eq!(out.proxy_address, "0xdead");
        assert_eq!(out.implementation_address, "0xdead");
    }

    #[test]
    fn test_proxy_by_name() {
        let registry = ChainRegistry::builtin();
        for name in ["TransparentUpgradeableProxy", "ERC1967Proxy", "my_erc1967_thing"] {
            let meta = ContractMetadata {
                name: Some(name.to_string()),
                ..Default::default()
            };
            let out = apply_metadata(record("base"), &meta, &registry);
            assert!(out.is_proxy_contract, "{} should be a proxy", name);
            assert!(out.proxy_address.is_empty());
        }

        let meta = ContractMetadata {
            name: Some("UniswapV3Pool".to_string()),
            ..Default::default()
        };
        assert!(!apply_metadata(record("base"), &meta, &registry).is_proxy_contract);
    }

    #[test]
    fn test_chain_id_normalized_when_known() {
        let meta = ContractMetadata::default();
        let out = apply_metadata(record("optimism"), &meta, &ChainRegistry::builtin());
        assert_eq!(out.chain_id, "eip155-10");

        let out = apply_metadata(record("unknown"), &meta, &ChainRegistry::builtin());
        assert_eq!(out.chain_id, "unknown");
    }

    #[test]
    fn test_deployment_date_formatting() {
        let meta = ContractMetadata {
            verified_at: Some("2023-06-15T08:13:24.123456Z".to_string()),
            ..Default::default()
        };
        let out = apply_metadata(record("base"), &meta, &ChainRegistry::builtin());
        assert_eq!(out.deployment_date, "2023-06-15 08:13:24");

        assert_eq!(
            format_deployment_date("2024-01-02T03:04:05+02:00").as_deref(),
            Some("2024-01-02 03:04:05")
        );
    }

    #[test]
    fn test_bad_date_leaves_field_untouched() {
        let mut input = record("base");
        input.deployment_date = "2020-01-01 00:00:00".to_string();
        let meta = ContractMetadata {
            verified_at: Some("yesterday".to_string()),
            ..Default::default()
        };
        let out = apply_metadata(input, &meta, &ChainRegistry::builtin());
        assert_eq!(out.deployment_date, "2020-01-01 00:00:00");
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let registry = ChainRegistry::builtin();
        let meta = ContractMetadata {
            name: Some("ERC1967Proxy".to_string()),
            is_verified: Some(true),
            minimal_proxy_address_hash: Some("0xbeef".to_string()),
            verified_at: Some("2024-03-01T10:00:00Z".to_string()),
            ..Default::default()
        };
        let once = apply_metadata(record("zora"), &meta, &registry);
        let twice = apply_metadata(once.clone(), &meta, &registry);
        assert_eq!(once, twice);
    }
}
