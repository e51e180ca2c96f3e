//! Test utilities for Otori handlers
//!
//! An in-memory [`EntityStore`] with read-your-writes semantics, plus
//! fixture builders producing the decoded events handlers consume. Used by
//! every crate's tests; not intended for production use.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use otori::{BlockContext, Event, EventKind, EventMeta, TransactionContext};
use otori::{EntityStore, StoreError};
use otori_common::Address;
use primitive_types::U256;

/// In-memory entity store keyed by (kind, id).
///
/// `set` is a plain map insert, which makes it an idempotent upsert exactly
/// like the production contract requires.
#[derive(Default)]
pub struct MemoryStore {
    entities: Mutex<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows under one kind, for assertions on write counts.
    pub fn count(&self, kind: &str) -> usize {
        self.entities
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .filter(|(k, _)| k == kind)
            .count()
    }

    /// All ids stored under one kind, sorted for stable assertions.
    pub fn ids(&self, kind: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entities
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .filter(|(k, _)| k == kind)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self
            .entities
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .get(&(kind.to_string(), id.to_string()))
            .cloned())
    }

    async fn set(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.entities
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .insert((kind.to_string(), id.to_string()), value);
        Ok(())
    }
}

/// A store whose writes always fail, for error-path tests.
pub struct FailingStore;

#[async_trait]
impl EntityStore for FailingStore {
    async fn get(&self, _kind: &str, _id: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(None)
    }

    async fn set(
        &self,
        _kind: &str,
        _id: &str,
        _value: serde_json::Value,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("write refused".to_string()))
    }
}

/// Short deterministic test address: `n` zero-padded into 40 hex chars.
pub fn addr(n: u64) -> Address {
    Address::new(format!("0x{n:040x}"))
}

/// Builder for decoded event fixtures.
///
/// Defaults: block 100 at timestamp 1_700_000_000, tx hash derived from the
/// block number, empty calldata, log index 0.
pub struct EventBuilder {
    chain_id: u64,
    src_address: Address,
    block_number: u64,
    timestamp: u64,
    tx_hash: Option<String>,
    input: String,
    log_index: u64,
}

impl EventBuilder {
    pub fn new(chain_id: u64, src_address: Address) -> Self {
        Self {
            chain_id,
            src_address,
            block_number: 100,
            timestamp: 1_700_000_000,
            tx_hash: None,
            input: "0x".to_string(),
            log_index: 0,
        }
    }

    pub fn block(mut self, number: u64, timestamp: u64) -> Self {
        self.block_number = number;
        self.timestamp = timestamp;
        self
    }

    pub fn tx_hash(mut self, hash: impl Into<String>) -> Self {
        self.tx_hash = Some(hash.into());
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn log_index(mut self, log_index: u64) -> Self {
        self.log_index = log_index;
        self
    }

    fn meta(self) -> EventMeta {
        let tx_hash = self
            .tx_hash
            .unwrap_or_else(|| format!("0x{:064x}", self.block_number));
        EventMeta {
            chain_id: self.chain_id,
            src_address: self.src_address,
            block: BlockContext {
                number: self.block_number,
                timestamp: self.timestamp,
            },
            transaction: TransactionContext {
                hash: tx_hash,
                input: self.input,
            },
            log_index: self.log_index,
        }
    }

    pub fn transfer(self, from: Address, to: Address, value: U256) -> Event {
        Event {
            meta: self.meta(),
            kind: EventKind::Transfer { from, to, value },
        }
    }

    pub fn rebase(
        self,
        epoch: u64,
        total_supply: U256,
        rebasing_supply: U256,
        non_rebasing_supply: U256,
    ) -> Event {
        Event {
            meta: self.meta(),
            kind: EventKind::Rebase {
                epoch: U256::from(epoch),
                total_supply,
                rebasing_supply,
                non_rebasing_supply,
            },
        }
    }

    pub fn withdrawal_requested(
        self,
        withdrawer: Address,
        request_id: u64,
        amount: U256,
        queued: U256,
    ) -> Event {
        Event {
            meta: self.meta(),
            kind: EventKind::WithdrawalRequested {
                withdrawer,
                request_id: U256::from(request_id),
                amount,
                queued,
            },
        }
    }

    pub fn withdrawal_claimed(self, request_id: u64) -> Event {
        Event {
            meta: self.meta(),
            kind: EventKind::WithdrawalClaimed {
                request_id: U256::from(request_id),
            },
        }
    }

    pub fn answer_updated(self, current: U256, round_id: u64, updated_at: u64) -> Event {
        Event {
            meta: self.meta(),
            kind: EventKind::AnswerUpdated {
                current,
                round_id: U256::from(round_id),
                updated_at,
            },
        }
    }
}
