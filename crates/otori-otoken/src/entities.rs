//! Persisted OToken entity records
//!
//! All rows are keyed by composite IDs from `otori_common::ids` (chain id
//! leading, addresses lower-cased). Supply, balance and credit fields are
//! U256. History, Activity and Rebase are append-only: content-addressed by
//! their tx/log coordinates, so redelivery overwrites identically instead of
//! duplicating.

use otori::Entity;
use otori_common::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Direction of a history entry relative to its address.
///
/// `Out` entries are the negative legs of a transfer, `In` entries the
/// positive ones; the stored amount is always the unsigned magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    In,
    Out,
}

/// One row per (chain, token): the rebasing token's supply state.
///
/// `total_supply == rebasing_supply + non_rebasing_supply` at every observed
/// rebase point; transfer-only updates adjust `total_supply` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OToken {
    pub id: String,
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub total_supply: U256,
    pub rebasing_supply: U256,
    pub non_rebasing_supply: U256,
    pub credits_per_token: U256,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Entity for OToken {
    const KIND: &'static str = "otoken";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One row per (chain, token, holder): balance and credit tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OTokenAddress {
    pub id: String,
    pub chain_id: u64,
    pub otoken: Address,
    pub address: Address,
    pub balance: U256,
    pub credits: U256,
    pub rebasing_credits_per_token: U256,
    pub non_rebasing_credits_per_token: U256,
    pub rebasing_option: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Entity for OTokenAddress {
    const KIND: &'static str = "otoken_address";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Append-only per-address history entry, one per non-zero-address side of a
/// transfer. Carries the post-update balance and credit snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub id: String,
    pub chain_id: u64,
    pub otoken: Address,
    pub address: Address,
    pub transaction_hash: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub event_type: String,
    pub amount: U256,
    pub flow: Flow,
    pub balance: U256,
    pub credits: U256,
    pub log_index: u64,
}

impl Entity for History {
    const KIND: &'static str = "otoken_history";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Append-only transaction-level activity entry, exactly one per event.
/// `from`/`to` are `None` for the zero-address side of a mint or burn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub chain_id: u64,
    pub otoken: Address,
    pub transaction_hash: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub activity_type: String,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: U256,
    pub log_index: u64,
}

impl Entity for Activity {
    const KIND: &'static str = "otoken_activity";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Append-only record of one rebase event: the resulting supply triple plus
/// the engine's computed credits-per-token, yield and fees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rebase {
    pub id: String,
    pub chain_id: u64,
    pub otoken: Address,
    pub epoch: U256,
    pub block_number: u64,
    pub timestamp: u64,
    pub total_supply: U256,
    pub rebasing_supply: U256,
    pub non_rebasing_supply: U256,
    pub credits_per_token: U256,
    pub rebase_yield: U256,
    pub fees: U256,
    pub transaction_hash: String,
    pub log_index: u64,
}

impl Entity for Rebase {
    const KIND: &'static str = "otoken_rebase";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One row per (chain, vault, requestId): the two-phase withdrawal state.
/// `claimed` transitions false→true exactly once; rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: String,
    pub chain_id: u64,
    pub otoken: Address,
    pub withdrawer: Address,
    pub request_id: U256,
    pub amount: U256,
    pub queued: U256,
    pub claimed: bool,
    /// Queue wait derived from trailing transaction input bytes; `None`
    /// when the calldata carries no tail.
    pub queue_wait: Option<U256>,
    pub created_at: u64,
    pub updated_at: u64,
    pub hash: String,
}

impl Entity for WithdrawalRequest {
    const KIND: &'static str = "otoken_withdrawal_request";

    fn id(&self) -> &str {
        &self.id
    }
}
