//! Plain ERC-20 transfer collector
//!
//! Watches wildcard Transfer traffic and materializes two things for
//! tracked tokens: a lazily-created immutable [`Token`] reference row, and
//! an append-only [`TransferRecord`] per event. A failed transfer-record
//! write is logged and swallowed: historical gaps beat halting ingestion
//! for a record that is purely archival.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use otori::{Entity, EntityStore, EntityStoreExt, Event, EventKind, Handler};
use otori_common::{ids, Address, TokenRegistry};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Immutable token reference row, created on first observed transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub decimals: u32,
}

impl Entity for Token {
    const KIND: &'static str = "token";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Append-only record of one observed transfer, content-addressed by its
/// chain/block/log coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: String,
    pub token: String,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub timestamp: u64,
    pub tx_hash: String,
}

impl Entity for TransferRecord {
    const KIND: &'static str = "transfer";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Configuration for the collector.
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// Only record transfers touching one of these addresses. Empty means
    /// every transfer of a tracked token is recorded.
    pub watch: Vec<Address>,
}

/// Records transfers of registry-tracked tokens.
pub struct CollectorSink {
    registry: Arc<TokenRegistry>,
    config: CollectorConfig,
}

impl CollectorSink {
    pub fn new(registry: Arc<TokenRegistry>) -> Self {
        Self {
            registry,
            config: CollectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    fn watches(&self, from: &Address, to: &Address) -> bool {
        self.config.watch.is_empty()
            || self.config.watch.iter().any(|w| w == from || w == to)
    }
}

#[async_trait]
impl Handler for CollectorSink {
    fn name(&self) -> &str {
        "collector"
    }

    async fn handle(&self, event: &Event, store: &dyn EntityStore) -> Result<()> {
        let EventKind::Transfer { from, to, value } = &event.kind else {
            return Ok(());
        };

        let meta = &event.meta;
        let Some(token) = self.registry.by_address(&meta.src_address, meta.chain_id) else {
            return Ok(());
        };

        if !self.watches(from, to) {
            return Ok(());
        }

        let token_id = ids::token_id(meta.chain_id, &meta.src_address);
        if store.get_entity::<Token>(&token_id).await?.is_none() {
            store
                .set_entity(&Token {
                    id: token_id.clone(),
                    chain_id: meta.chain_id,
                    address: meta.src_address.clone(),
                    symbol: token.symbol.clone(),
                    decimals: token.decimals,
                })
                .await?;
        }

        let record = TransferRecord {
            id: ids::transfer_record_id(meta.chain_id, meta.block.number, meta.log_index),
            token: token_id,
            from: from.clone(),
            to: to.clone(),
            value: *value,
            timestamp: meta.block.timestamp,
            tx_hash: meta.transaction.hash.clone(),
        };

        // The record is archival; losing one entry is preferable to
        // failing the event and stalling the chain's stream.
        if let Err(e) = store.set_entity(&record).await {
            tracing::error!(
                target: "otori_collector",
                id = %record.id,
                error = %e,
                "Failed to write transfer record"
            );
        }

        Ok(())
    }
}
