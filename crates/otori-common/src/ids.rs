//! Composite entity ID generation
//!
//! Every persisted entity is keyed by a deterministic, `:`-delimited string.
//! The chain id always leads so identical addresses on different chains can
//! never collide, and address-like parts are lower-cased so the same entity
//! observed through differently-cased event sources maps to the same row.
//! These strings are persisted keys: their exact layout must stay stable
//! across restarts.

use primitive_types::U256;

use crate::Address;

/// OToken supply row. Format: `chainId:address`.
pub fn otoken_id(chain_id: u64, address: &Address) -> String {
    format!("{chain_id}:{address}")
}

/// Per-holder balance row. Format: `chainId:otoken:address`.
pub fn otoken_address_id(chain_id: u64, otoken: &Address, address: &Address) -> String {
    format!("{chain_id}:{otoken}:{address}")
}

/// Rebase record. Format: `chainId:blockNumber:logIndex`.
pub fn rebase_id(chain_id: u64, block_number: u64, log_index: u64) -> String {
    format!("{chain_id}:{block_number}:{log_index}")
}

/// Per-side history entry. Format: `chainId:transactionHash:logIndex:address`.
///
/// The trailing address segment keys the source and destination legs of one
/// transfer separately; without it the two legs would collide under
/// id-keyed upsert.
pub fn history_id(chain_id: u64, transaction_hash: &str, log_index: u64, address: &Address) -> String {
    format!(
        "{chain_id}:{}:{log_index}:{address}",
        transaction_hash.to_lowercase()
    )
}

/// Transaction-level activity entry. Format: `chainId:transactionHash:logIndex`.
pub fn activity_id(chain_id: u64, transaction_hash: &str, log_index: u64) -> String {
    format!("{chain_id}:{}:{log_index}", transaction_hash.to_lowercase())
}

/// Vault withdrawal request. Format: `chainId:otoken:requestId`.
pub fn withdrawal_request_id(chain_id: u64, otoken: &Address, request_id: U256) -> String {
    format!("{chain_id}:{otoken}:{request_id}")
}

/// Token reference row. Format: `chainId:address`.
pub fn token_id(chain_id: u64, address: &Address) -> String {
    format!("{chain_id}:{address}")
}

/// Collector transfer record. Format: `chainId_blockNumber_logIndex`.
pub fn transfer_record_id(chain_id: u64, block_number: u64, log_index: u64) -> String {
    format!("{chain_id}_{block_number}_{log_index}")
}

/// Oracle price point. Format: `pair-roundId`.
pub fn oracle_price_id(pair: &str, round_id: U256) -> String {
    format!("{pair}-{round_id}")
}
