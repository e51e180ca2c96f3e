//! Static token registry
//!
//! A read-only reference table mapping (chain, address) and (chain, symbol)
//! to token metadata. Handlers consult it to decide whether an event source
//! is a tracked contract; unknown addresses mean the event is skipped.

use serde::{Deserialize, Serialize};

use crate::Address;

/// Reference metadata for one tracked token deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
}

/// Registry of tracked tokens, scoped by chain.
///
/// Symbol lookups that are ambiguous across chains fall back to the
/// configured primary chain; lookups that stay ambiguous resolve to nothing
/// rather than guessing.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenInfo>,
    primary_chain: u64,
}

/// Ethereum mainnet, the disambiguation default.
const DEFAULT_PRIMARY_CHAIN: u64 = 1;

impl TokenRegistry {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        Self {
            tokens,
            primary_chain: DEFAULT_PRIMARY_CHAIN,
        }
    }

    /// Override the chain used to break unscoped symbol ties.
    pub fn with_primary_chain(mut self, chain_id: u64) -> Self {
        self.primary_chain = chain_id;
        self
    }

    pub fn tokens(&self) -> &[TokenInfo] {
        &self.tokens
    }

    /// Resolve a contract address on a specific chain.
    pub fn by_address(&self, address: &Address, chain_id: u64) -> Option<&TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.chain_id == chain_id && t.address == *address)
    }

    /// Resolve a symbol, optionally scoped by chain.
    ///
    /// Accepts the `chainId:SYMBOL` shorthand in place of a separate chain
    /// argument. Unscoped lookups return the unique match when there is one,
    /// fall back to the primary chain when the symbol exists on several
    /// chains, and return `None` if that still leaves more than one row.
    pub fn by_symbol(&self, symbol: &str, chain_id: Option<u64>) -> Option<&TokenInfo> {
        if symbol.is_empty() {
            return None;
        }

        // `1:OETH` form carries its own chain scope.
        if let Some((chain_part, symbol_part)) = symbol.split_once(':') {
            if !chain_part.is_empty() && chain_part.bytes().all(|b| b.is_ascii_digit()) {
                let chain: u64 = chain_part.parse().ok()?;
                return self.by_symbol(symbol_part, Some(chain));
            }
        }

        let matches: Vec<&TokenInfo> = self
            .tokens
            .iter()
            .filter(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .filter(|t| chain_id.map_or(true, |c| t.chain_id == c))
            .collect();

        match (matches.len(), chain_id) {
            (1, _) => Some(matches[0]),
            (0, _) | (_, Some(_)) => None,
            (_, None) => {
                let on_primary: Vec<&TokenInfo> = matches
                    .into_iter()
                    .filter(|t| t.chain_id == self.primary_chain)
                    .collect();
                if on_primary.len() == 1 {
                    Some(on_primary[0])
                } else {
                    None
                }
            }
        }
    }
}
