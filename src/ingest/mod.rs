pub mod event;
pub mod handler;
pub mod store;

pub use event::{BlockContext, Event, EventKind, EventMeta, TransactionContext};
pub use handler::{Handler, MultiHandler};
pub use store::{Entity, EntityStore, EntityStoreExt, StoreError};
