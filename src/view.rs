// Raffle Entitlement Engine - Normalized raffle view
use solana_program::clock::UnixTimestamp;

use crate::lifecycle::{self, LifecyclePhase, RaffleStatus};
use crate::prize::{self, PrizeKind};
use crate::state::RaffleSnapshot;

/// Snapshot plus its derived prize kind and phase at one instant
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaffleView {
    pub snapshot: RaffleSnapshot,
    /// Raw status, `None` for an unrecognized code
    pub status: Option<RaffleStatus>,
    pub phase: LifecyclePhase,
    pub prize: PrizeKind,
    /// Instant the phase was resolved at
    pub resolved_at: UnixTimestamp,
}

impl RaffleView {
    pub fn new(snapshot: RaffleSnapshot, now: UnixTimestamp) -> Self {
        let status = RaffleStatus::try_from(snapshot.status_code).ok();
        let phase = lifecycle::resolve(&snapshot, now);
        let prize = prize::classify(&snapshot);
        Self {
            snapshot,
            status,
            phase,
            prize,
            resolved_at: now,
        }
    }

    /// Same snapshot resolved at a later instant
    pub fn at(&self, now: UnixTimestamp) -> Self {
        Self {
            snapshot: self.snapshot.clone(),
            status: self.status,
            phase: lifecycle::resolve(&self.snapshot, now),
            prize: self.prize,
            resolved_at: now,
        }
    }

    pub fn is_escrowed(&self) -> bool {
        self.snapshot.is_escrowed_prize && !self.prize.is_none()
    }

    /// Label for the ticket price origin
    pub fn price_label(&self) -> Option<&'static str> {
        match self.snapshot.uses_custom_price {
            Some(true) => Some("set by Creator"),
            Some(false) => Some("Protocol Ticket Fee"),
            None => None,
        }
    }
}
