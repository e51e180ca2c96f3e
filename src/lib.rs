//! Otori, a rebasing-token event indexing core.
//!
//! Otori materializes decoded blockchain events into queryable entity
//! records. The surrounding framework owns block/log retrieval, reorg
//! handling and scheduling; it delivers decoded events (at-least-once, in
//! on-chain order per chain) to [`Handler`]s, which read and write entities
//! through the narrow [`EntityStore`] persistence contract.
//!
//! # Components
//!
//! - [`Event`]: one decoded on-chain event, a tagged [`EventKind`] plus
//!   chain/block/transaction/log coordinates ([`EventMeta`])
//! - [`EntityStore`]: idempotent get/set persistence contract, typed
//!   wrappers via [`EntityStoreExt`]
//! - [`Handler`]: processes one event as a single unit of work
//! - [`MultiHandler`]: runs several handlers in sequence for each event
//!
//! Domain projectors live in their own crates (`otori-otoken`,
//! `otori-collector`, `otori-prices`); they plug in here as handlers.

pub mod ingest;

pub use ingest::event::{BlockContext, Event, EventKind, EventMeta, TransactionContext};
pub use ingest::handler::{Handler, MultiHandler};
pub use ingest::store::{Entity, EntityStore, EntityStoreExt, StoreError};
