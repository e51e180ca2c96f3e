//! Vault withdrawal lifecycle tracking
//!
//! A two-state machine per (chain, vault, requestId): Requested → Claimed.
//! Requests are created unconditionally (request ids are never reused);
//! claims only flip an existing row. A claim for a request this indexer
//! never saw is an ordering/filtering artifact, not a consistency fault,
//! and is dropped without mutation.

use anyhow::Result;
use otori::{EntityStore, EntityStoreExt, EventMeta};
use otori_common::{ids, u256_from_hex, Address};
use primitive_types::U256;

use crate::entities::WithdrawalRequest;
use crate::sink::OTokenSink;

/// `0x` + 4-byte selector + one 32-byte argument word, in hex characters.
/// Queue-wait metadata rides in the calldata beyond this prefix.
const QUEUE_WAIT_OFFSET: usize = 74;

/// Extract the queue wait from trailing transaction input bytes.
///
/// Calldata that ends at the declared arguments has no tail and yields
/// `None`. A tail that does not parse as hex also yields `None`, with a
/// warning; failing the whole event over a cosmetic field would contradict
/// the skip-tolerant error policy.
pub(crate) fn parse_queue_wait(input: &str) -> Option<U256> {
    let tail = input.get(QUEUE_WAIT_OFFSET..).unwrap_or("");
    if tail.is_empty() {
        return None;
    }
    match u256_from_hex(tail) {
        Some(value) => Some(value),
        None => {
            tracing::warn!(
                target: "otori_otoken::withdrawal",
                tail_len = tail.len(),
                "Unparseable queue-wait tail in transaction input, treating as absent"
            );
            None
        }
    }
}

impl OTokenSink {
    pub(crate) async fn handle_withdrawal_requested(
        &self,
        meta: &EventMeta,
        withdrawer: &Address,
        request_id: U256,
        amount: U256,
        queued: U256,
        store: &dyn EntityStore,
    ) -> Result<()> {
        let chain_id = meta.chain_id;
        let otoken = &meta.src_address;
        let timestamp = meta.block.timestamp;

        let request = WithdrawalRequest {
            id: ids::withdrawal_request_id(chain_id, otoken, request_id),
            chain_id,
            otoken: otoken.clone(),
            withdrawer: withdrawer.clone(),
            request_id,
            amount,
            queued,
            claimed: false,
            queue_wait: parse_queue_wait(&meta.transaction.input),
            created_at: timestamp,
            updated_at: timestamp,
            hash: meta.transaction.hash.clone(),
        };
        store.set_entity(&request).await?;

        tracing::debug!(
            target: "otori_otoken::withdrawal",
            chain_id,
            vault = %otoken,
            request_id = %request_id,
            amount = %amount,
            "Recorded withdrawal request"
        );

        Ok(())
    }

    pub(crate) async fn handle_withdrawal_claimed(
        &self,
        meta: &EventMeta,
        request_id: U256,
        store: &dyn EntityStore,
    ) -> Result<()> {
        let chain_id = meta.chain_id;
        let otoken = &meta.src_address;

        let id = ids::withdrawal_request_id(chain_id, otoken, request_id);
        let Some(mut request) = store.get_entity::<WithdrawalRequest>(&id).await? else {
            tracing::debug!(
                target: "otori_otoken::withdrawal",
                chain_id,
                vault = %otoken,
                request_id = %request_id,
                "Claim for unknown withdrawal request, dropping"
            );
            return Ok(());
        };

        request.claimed = true;
        request.updated_at = meta.block.timestamp;
        store.set_entity(&request).await?;

        tracing::debug!(
            target: "otori_otoken::withdrawal",
            chain_id,
            vault = %otoken,
            request_id = %request_id,
            "Recorded withdrawal claim"
        );

        Ok(())
    }
}
