//! Rebasing-token (OToken) projectors for Otori
//!
//! Consumes Transfer, Rebase and vault withdrawal events for tracked
//! rebasing tokens and materializes supply, per-holder balance, history,
//! activity, rebase and withdrawal entities.
//!
//! # Components
//!
//! - [`entities`]: the persisted records and their composite identity
//! - [`rebase`]: the pure accounting engine turning raw supply triples into
//!   credits-per-token, yield and fees
//! - [`OTokenSink`]: the handler wiring transfer/rebase/withdrawal
//!   projection together, parameterized by [`OTokenConfig`]

pub mod entities;
pub mod rebase;
pub mod sink;
pub mod withdrawal;

pub use entities::{Activity, Flow, History, OToken, OTokenAddress, Rebase, WithdrawalRequest};
pub use rebase::{
    balance_from_credits, calculate_rebase, credits_from_balance, RebaseCalculation,
};
pub use sink::{OTokenConfig, OTokenSink, TableScope};
