//! Common utilities for Otori indexers
//!
//! Provides the lower-cased hex address type shared by every handler,
//! composite entity ID generation, the static token registry, and numeric
//! conversions between raw on-chain integers and storage/display forms.

pub mod ids;
pub mod registry;

use std::fmt;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

pub use registry::{TokenInfo, TokenRegistry};

// ===== Addresses =====

/// The mint/burn sentinel address.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// A contract or account address, normalized to lower-cased hex at
/// construction.
///
/// Addresses are embedded verbatim in composite entity IDs, so the
/// normalization here is what keeps those IDs byte-for-byte stable across
/// differently-cased event sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().to_lowercase())
    }

    /// The zero address (transfer source on mint, destination on burn).
    pub fn zero() -> Self {
        Self(ZERO_ADDRESS.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ===== U256 conversions =====

/// Parse a bare hex string (no `0x` prefix) into a U256.
///
/// Returns `None` for empty or non-hex input, or input wider than 256 bits.
pub fn u256_from_hex(hex: &str) -> Option<U256> {
    if hex.is_empty() || hex.len() > 64 {
        return None;
    }
    U256::from_str_radix(hex, 16).ok()
}

/// Scale a raw integer reading by `decimals` fractional digits into a
/// decimal value (e.g. `150000000` at 8 decimals becomes `1.5`).
pub fn scale_to_decimal(value: U256, decimals: u32) -> BigDecimal {
    // U256 renders as base-10 digits, which BigInt always accepts.
    let digits = BigInt::parse_bytes(value.to_string().as_bytes(), 10).unwrap_or_default();
    BigDecimal::new(digits, i64::from(decimals))
}
