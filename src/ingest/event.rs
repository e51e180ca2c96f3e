//! Decoded event model
//!
//! The delivery collaborator hands each handler one [`Event`]: a tagged
//! [`EventKind`] carrying the decoded parameters, plus [`EventMeta`] with the
//! chain, block, transaction and log coordinates every projector needs for
//! entity identity. Amount-like fields are `U256` throughout; 64-bit
//! arithmetic on token amounts is a correctness bug, not an optimization.

use otori_common::Address;
use primitive_types::U256;

/// Block coordinates attached to every delivered event.
#[derive(Debug, Clone)]
pub struct BlockContext {
    pub number: u64,
    /// Epoch seconds, as reported by the chain.
    pub timestamp: u64,
}

/// Transaction coordinates attached to every delivered event.
#[derive(Debug, Clone)]
pub struct TransactionContext {
    /// Transaction hash as 0x-prefixed hex.
    pub hash: String,
    /// Raw calldata as 0x-prefixed hex. Some projectors read trailing bytes
    /// beyond the selector and declared arguments.
    pub input: String,
}

/// Coordinates shared by every event kind.
#[derive(Debug, Clone)]
pub struct EventMeta {
    pub chain_id: u64,
    /// Emitting contract address.
    pub src_address: Address,
    pub block: BlockContext,
    pub transaction: TransactionContext,
    pub log_index: u64,
}

/// Decoded event parameters, one variant per handled event signature.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// ERC-20 `Transfer(from, to, value)`. The zero address marks a mint
    /// (as source) or a burn (as destination).
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    /// Rebasing-token supply redistribution.
    Rebase {
        epoch: U256,
        total_supply: U256,
        rebasing_supply: U256,
        non_rebasing_supply: U256,
    },
    /// Vault withdrawal entered the queue.
    WithdrawalRequested {
        withdrawer: Address,
        request_id: U256,
        amount: U256,
        queued: U256,
    },
    /// Previously requested withdrawal was claimed.
    WithdrawalClaimed { request_id: U256 },
    /// Oracle aggregator round update.
    AnswerUpdated {
        current: U256,
        round_id: U256,
        /// Oracle-reported update time, epoch seconds.
        updated_at: u64,
    },
}

impl EventKind {
    /// Stable name for logging and dispatch diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Rebase { .. } => "Rebase",
            Self::WithdrawalRequested { .. } => "WithdrawalRequested",
            Self::WithdrawalClaimed { .. } => "WithdrawalClaimed",
            Self::AnswerUpdated { .. } => "AnswerUpdated",
        }
    }
}

/// One decoded on-chain event, as delivered to handlers.
#[derive(Debug, Clone)]
pub struct Event {
    pub meta: EventMeta,
    pub kind: EventKind,
}
