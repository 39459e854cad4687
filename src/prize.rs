// Raffle Entitlement Engine - Prize Classification
use solana_program::pubkey::Pubkey;

use crate::state::{Config, RaffleSnapshot, StandardTag};
use crate::utils::TokenAmount;

/// What the winners of a raffle receive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrizeKind {
    /// Whitelist raffle, no prize attached
    None,
    Native(TokenAmount),
    Fungible { token: Pubkey, amount: TokenAmount },
    UniqueToken { collection: Pubkey, token_id: u128 },
    MultiUnitToken { collection: Pubkey, token_id: u128 },
}

impl PrizeKind {
    pub fn is_none(&self) -> bool {
        matches!(self, PrizeKind::None)
    }

    /// Unique or multi-unit collection prize
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            PrizeKind::UniqueToken { .. } | PrizeKind::MultiUnitToken { .. }
        )
    }

    /// Human readable prize, e.g. "1.5 ETH"
    pub fn describe(&self, config: &Config, token_symbol: Option<&str>) -> String {
        match self {
            PrizeKind::None => "prize".to_string(),
            PrizeKind::Native(amount) => format!(
                "{} {}",
                amount.format_units(config.native_decimals),
                config.native_symbol
            ),
            PrizeKind::Fungible { amount, .. } => format!(
                "{} {}",
                amount.format_units(config.fungible_decimals),
                token_symbol.unwrap_or(&config.fallback_token_symbol)
            ),
            PrizeKind::UniqueToken { .. } => "Unique NFT".to_string(),
            PrizeKind::MultiUnitToken { .. } => "Multi-unit NFT".to_string(),
        }
    }
}

fn is_set(address: &Pubkey) -> bool {
    *address != Pubkey::default()
}

/// Derive the prize kind from the snapshot's prize fields.
///
/// A well-formed raffle sets at most one prize group, so the first match wins:
/// native coin, then fungible token, then a collection by its standard tag.
/// Anything else degrades to `PrizeKind::None`, which unlocks no prize actions.
pub fn classify(snapshot: &RaffleSnapshot) -> PrizeKind {
    if !snapshot.native_prize_amount.is_zero() {
        return PrizeKind::Native(snapshot.native_prize_amount);
    }

    if is_set(&snapshot.fungible_prize_token) && !snapshot.fungible_prize_amount.is_zero() {
        return PrizeKind::Fungible {
            token: snapshot.fungible_prize_token,
            amount: snapshot.fungible_prize_amount,
        };
    }

    if is_set(&snapshot.prize_collection) {
        let collection = snapshot.prize_collection;
        let token_id = snapshot.prize_token_id;
        match snapshot.standard() {
            Some(StandardTag::Unique) => {
                return PrizeKind::UniqueToken {
                    collection,
                    token_id,
                }
            }
            Some(StandardTag::MultiUnit) => {
                return PrizeKind::MultiUnitToken {
                    collection,
                    token_id,
                }
            }
            None => {}
        }
    }

    PrizeKind::None
}
