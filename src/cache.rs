// Raffle Entitlement Engine - Token symbol cache
use std::collections::HashMap;

use solana_program::pubkey::Pubkey;

use crate::query::RaffleQuery;

/// Token symbols keyed by token address.
///
/// Owned by a session and cleared with it. Failed lookups return the fallback
/// and are not cached, so the next lookup retries.
#[derive(Clone, Debug)]
pub struct TokenSymbolCache {
    symbols: HashMap<Pubkey, String>,
    fallback: String,
}

impl TokenSymbolCache {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            symbols: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn get(&self, token: &Pubkey) -> Option<&str> {
        self.symbols.get(token).map(String::as_str)
    }

    pub async fn symbol<Q: RaffleQuery>(&mut self, query: &Q, token: &Pubkey) -> String {
        if let Some(symbol) = self.symbols.get(token) {
            return symbol.clone();
        }

        match query.token_symbol(token).await {
            Ok(symbol) if !symbol.is_empty() => {
                self.symbols.insert(*token, symbol.clone());
                symbol
            }
            Ok(_) => self.fallback.clone(),
            Err(err) => {
                tracing::warn!(token = %token, error = %err, "symbol lookup failed");
                self.fallback.clone()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn invalidate(&mut self) {
        self.symbols.clear();
    }
}
