//! Handler trait and sequential dispatch
//!
//! A handler processes one decoded event as a single unit of work: reads,
//! computation, writes. A failing handler aborts that event's processing and
//! the error surfaces to the delivery collaborator, whose retry policy owns
//! what happens next; nothing is retried here.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::event::Event;
use super::store::EntityStore;

/// Processes decoded events against the persistence contract.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in logs and error context.
    fn name(&self) -> &str;

    /// Process one event. Events for a given chain arrive strictly in
    /// on-chain order and are never delivered concurrently.
    async fn handle(&self, event: &Event, store: &dyn EntityStore) -> Result<()>;
}

/// Runs multiple handlers in sequence for each event.
///
/// Handlers decide internally whether an event concerns them (unknown event
/// sources are no-ops, per the skip policy). The first handler error aborts
/// the event and propagates: at-least-once redelivery with idempotent
/// composite IDs makes re-processing safe, silently continuing would not be.
pub struct MultiHandler {
    handlers: Vec<Arc<dyn Handler>>,
}

impl MultiHandler {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }
}

#[async_trait]
impl Handler for MultiHandler {
    fn name(&self) -> &str {
        "multi"
    }

    async fn handle(&self, event: &Event, store: &dyn EntityStore) -> Result<()> {
        for handler in &self.handlers {
            handler
                .handle(event, store)
                .await
                .with_context(|| format!("handler '{}' failed", handler.name()))?;
        }

        tracing::trace!(
            target: "otori::ingest::multi",
            event = event.kind.name(),
            chain_id = event.meta.chain_id,
            handlers = self.handlers.len(),
            "Dispatched event"
        );

        Ok(())
    }
}
