//! Oracle price-point recorder
//!
//! A stateless per-event upsert of aggregator rounds: the raw integer
//! reading is scaled by the feed's declared decimals into a decimal value
//! and keyed by (pair, roundId). Re-delivery of a round overwrites with
//! identical data. Feed identity is explicit configuration passed at
//! construction, one [`PriceFeedConfig`] per aggregator contract.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use otori::{Entity, EntityStore, EntityStoreExt, Event, EventKind, Handler};
use otori_common::{ids, scale_to_decimal, Address};
use serde::{Deserialize, Serialize};

/// One tracked aggregator feed.
#[derive(Debug, Clone)]
pub struct PriceFeedConfig {
    /// Aggregator contract emitting AnswerUpdated.
    pub address: Address,
    pub chain_id: u64,
    /// Pair label persisted with each point, e.g. `1:ETH_USD`.
    pub pair: String,
    /// Decimal scale of the raw reading.
    pub decimals: u32,
}

/// One price point per (pair, roundId).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OraclePrice {
    pub id: String,
    pub pair: String,
    pub value: BigDecimal,
    /// Oracle-reported update time, epoch seconds.
    pub timestamp: u64,
    pub block: u64,
    pub chain_id: u64,
}

impl Entity for OraclePrice {
    const KIND: &'static str = "oracle_price";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Records AnswerUpdated rounds for configured feeds.
pub struct PriceSink {
    feeds: HashMap<(u64, Address), PriceFeedConfig>,
}

impl PriceSink {
    pub fn new(feeds: Vec<PriceFeedConfig>) -> Self {
        Self {
            feeds: feeds
                .into_iter()
                .map(|f| ((f.chain_id, f.address.clone()), f))
                .collect(),
        }
    }

    pub fn feeds(&self) -> impl Iterator<Item = &PriceFeedConfig> {
        self.feeds.values()
    }
}

#[async_trait]
impl Handler for PriceSink {
    fn name(&self) -> &str {
        "prices"
    }

    async fn handle(&self, event: &Event, store: &dyn EntityStore) -> Result<()> {
        let EventKind::AnswerUpdated {
            current,
            round_id,
            updated_at,
        } = &event.kind
        else {
            return Ok(());
        };

        let meta = &event.meta;
        let Some(feed) = self
            .feeds
            .get(&(meta.chain_id, meta.src_address.clone()))
        else {
            tracing::trace!(
                target: "otori_prices",
                aggregator = %meta.src_address,
                chain_id = meta.chain_id,
                "AnswerUpdated from unconfigured aggregator, skipping"
            );
            return Ok(());
        };

        let point = OraclePrice {
            id: ids::oracle_price_id(&feed.pair, *round_id),
            pair: feed.pair.clone(),
            value: scale_to_decimal(*current, feed.decimals),
            timestamp: *updated_at,
            block: meta.block.number,
            chain_id: feed.chain_id,
        };
        store.set_entity(&point).await?;

        tracing::debug!(
            target: "otori_prices",
            pair = %feed.pair,
            round = %round_id,
            value = %point.value,
            "Recorded price point"
        );

        Ok(())
    }
}
