// Raffle Entitlement Engine - State
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::utils::TokenAmount;

/// Raw status or standard tag used when the read failed.
pub const UNREADABLE_CODE: u8 = u8::MAX;

/// Standard tag of a collection prize
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StandardTag {
    /// One owner per token id
    Unique,
    /// Token id with a balance per holder
    MultiUnit,
}

impl TryFrom<u8> for StandardTag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StandardTag::Unique),
            1 => Ok(StandardTag::MultiUnit),
            other => Err(other),
        }
    }
}

impl From<StandardTag> for u8 {
    fn from(tag: StandardTag) -> Self {
        match tag {
            StandardTag::Unique => 0,
            StandardTag::MultiUnit => 1,
        }
    }
}

/// Point-in-time read of one raffle contract
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RaffleSnapshot {
    /// Raffle contract address
    pub address: Pubkey,
    pub name: String,
    pub creator: Pubkey,
    /// Start of the sale window (Unix timestamp)
    pub start_time: UnixTimestamp,
    /// Length of the sale window in seconds
    pub duration: u64,
    /// Price per ticket in the native coin's smallest unit
    pub ticket_price: TokenAmount,
    pub ticket_limit: u64,
    pub tickets_sold: u64,
    pub max_tickets_per_participant: u64,
    pub winners_count: u64,
    /// Raw contract status, see `RaffleStatus`
    pub status_code: u8,
    pub is_prized: bool,
    pub native_prize_amount: TokenAmount,
    pub fungible_prize_token: Pubkey,
    pub fungible_prize_amount: TokenAmount,
    pub prize_collection: Pubkey,
    pub prize_token_id: u128,
    /// 0 = unique token, 1 = multi-unit token
    pub standard_tag: u8,
    /// `None` when the read failed
    pub uses_custom_price: Option<bool>,
    pub is_escrowed_prize: bool,
}

impl RaffleSnapshot {
    /// End of the sale window, saturating on overflow
    pub fn end_time(&self) -> UnixTimestamp {
        let duration = i64::try_from(self.duration).unwrap_or(i64::MAX);
        self.start_time.saturating_add(duration)
    }

    pub fn has_elapsed(&self, now: UnixTimestamp) -> bool {
        now >= self.end_time()
    }

    pub fn standard(&self) -> Option<StandardTag> {
        StandardTag::try_from(self.standard_tag).ok()
    }

    pub fn remaining_tickets(&self) -> u64 {
        self.ticket_limit.saturating_sub(self.tickets_sold)
    }

    /// Largest quantity a caller holding `caller_tickets` may still buy
    pub fn max_purchasable(&self, caller_tickets: u64) -> u64 {
        let per_caller = self
            .max_tickets_per_participant
            .saturating_sub(caller_tickets);
        self.remaining_tickets().min(per_caller)
    }
}

/// Observer role relative to one raffle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Anonymous,
    Participant,
    Creator,
}

/// The observer an action set is computed for
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    /// Connected address, if any
    pub address: Option<Pubkey>,
    /// Tickets this address holds in the raffle
    pub tickets_purchased: u64,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn connected(address: Pubkey) -> Self {
        Self {
            address: Some(address),
            tickets_purchased: 0,
        }
    }

    pub fn with_tickets(mut self, tickets_purchased: u64) -> Self {
        self.tickets_purchased = tickets_purchased;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn role(&self, snapshot: &RaffleSnapshot) -> Role {
        match self.address {
            None => Role::Anonymous,
            Some(address) if address == snapshot.creator => Role::Creator,
            Some(_) => Role::Participant,
        }
    }

    pub fn is_creator(&self, snapshot: &RaffleSnapshot) -> bool {
        self.role(snapshot) == Role::Creator
    }
}

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Decimals of the native coin
    pub native_decimals: u8,
    /// Decimals assumed for fungible prize tokens
    pub fungible_decimals: u8,
    pub native_symbol: String,
    /// Shown when a token symbol cannot be read
    pub fallback_token_symbol: String,
    /// Upper bound on winner slots read per raffle
    pub max_winner_slots: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            native_decimals: 18,
            fungible_decimals: 18,
            native_symbol: "ETH".to_string(),
            fallback_token_symbol: "TOKEN".to_string(),
            max_winner_slots: 1_000,
        }
    }
}
