// Raffle Entitlement Engine - Lifecycle Resolution
use solana_program::clock::UnixTimestamp;

use crate::error::RaffleError;
use crate::state::RaffleSnapshot;
use crate::utils::{format_duration, format_time};

/// Status code as stored by the raffle contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RaffleStatus {
    /// Created, waiting for activation
    Pending,
    /// Ticket sale open
    Active,
    /// Sale closed, waiting for a draw request
    Ended,
    /// Randomness requested, winners not yet selected
    Drawing,
    /// Winners selected
    Completed,
    Deleted,
    ActivationFailed,
    AllPrizesClaimed,
    /// Closed without enough participation
    Unengaged,
}

impl TryFrom<u8> for RaffleStatus {
    type Error = RaffleError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        match val {
            0 => Ok(RaffleStatus::Pending),
            1 => Ok(RaffleStatus::Active),
            2 => Ok(RaffleStatus::Ended),
            3 => Ok(RaffleStatus::Drawing),
            4 => Ok(RaffleStatus::Completed),
            5 => Ok(RaffleStatus::Deleted),
            6 => Ok(RaffleStatus::ActivationFailed),
            7 => Ok(RaffleStatus::AllPrizesClaimed),
            8 => Ok(RaffleStatus::Unengaged),
            other => Err(RaffleError::UnknownStatus(other)),
        }
    }
}

impl From<RaffleStatus> for u8 {
    fn from(status: RaffleStatus) -> Self {
        match status {
            RaffleStatus::Pending => 0,
            RaffleStatus::Active => 1,
            RaffleStatus::Ended => 2,
            RaffleStatus::Drawing => 3,
            RaffleStatus::Completed => 4,
            RaffleStatus::Deleted => 5,
            RaffleStatus::ActivationFailed => 6,
            RaffleStatus::AllPrizesClaimed => 7,
            RaffleStatus::Unengaged => 8,
        }
    }
}

impl RaffleStatus {
    /// Dashboard label for a raw status
    pub fn label(&self) -> &'static str {
        match self {
            RaffleStatus::Pending => "Pending",
            RaffleStatus::Active => "Active",
            RaffleStatus::Ended => "Ended",
            RaffleStatus::Drawing => "Drawing",
            RaffleStatus::Completed => "Completed",
            RaffleStatus::Deleted => "Deleted",
            RaffleStatus::ActivationFailed => "Activation Failed",
            RaffleStatus::AllPrizesClaimed => "All Prizes Claimed",
            RaffleStatus::Unengaged => "Unengaged",
        }
    }

    /// Still open administratively, so the time overlay applies
    pub fn is_open(&self) -> bool {
        matches!(self, RaffleStatus::Pending | RaffleStatus::Active)
    }
}

/// Label for a raw code, `Unknown` when unrecognized
pub fn status_label(code: u8) -> &'static str {
    RaffleStatus::try_from(code)
        .map(|status| status.label())
        .unwrap_or("Unknown")
}

/// Canonical phase: raw status reconciled with the sale window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Pending,
    Active,
    /// Raw status still Pending/Active but the sale window has elapsed
    EndedByTime,
    Ended,
    Drawing,
    Completed,
    AllPrizesClaimed,
    Deleted,
    ActivationFailed,
    Unengaged,
    Unknown,
}

impl LifecyclePhase {
    /// Absorbing phases; no time overlay ever applies to them
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecyclePhase::Completed
                | LifecyclePhase::AllPrizesClaimed
                | LifecyclePhase::Deleted
                | LifecyclePhase::ActivationFailed
                | LifecyclePhase::Unengaged
        )
    }

    /// Winners are known and claims are open
    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            LifecyclePhase::Completed | LifecyclePhase::AllPrizesClaimed
        )
    }
}

impl From<RaffleStatus> for LifecyclePhase {
    fn from(status: RaffleStatus) -> Self {
        match status {
            RaffleStatus::Pending => LifecyclePhase::Pending,
            RaffleStatus::Active => LifecyclePhase::Active,
            RaffleStatus::Ended => LifecyclePhase::Ended,
            RaffleStatus::Drawing => LifecyclePhase::Drawing,
            RaffleStatus::Completed => LifecyclePhase::Completed,
            RaffleStatus::Deleted => LifecyclePhase::Deleted,
            RaffleStatus::ActivationFailed => LifecyclePhase::ActivationFailed,
            RaffleStatus::AllPrizesClaimed => LifecyclePhase::AllPrizesClaimed,
            RaffleStatus::Unengaged => LifecyclePhase::Unengaged,
        }
    }
}

/// Resolve the canonical phase of `snapshot` at `now`.
///
/// The contract only leaves Active when someone calls "end", so an open raw
/// status whose window has elapsed is reported as `EndedByTime`. The raw code
/// itself is left untouched in the snapshot.
pub fn resolve(snapshot: &RaffleSnapshot, now: UnixTimestamp) -> LifecyclePhase {
    let status = match RaffleStatus::try_from(snapshot.status_code) {
        Ok(status) => status,
        Err(_) => return LifecyclePhase::Unknown,
    };

    if status.is_open() && snapshot.has_elapsed(now) {
        return LifecyclePhase::EndedByTime;
    }

    LifecyclePhase::from(status)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownLabel {
    StartsIn,
    EndsIn,
    Duration,
}

impl CountdownLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownLabel::StartsIn => "Starts In",
            CountdownLabel::EndsIn => "Ends In",
            CountdownLabel::Duration => "Duration",
        }
    }
}

/// Timer shown next to a raffle
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub label: CountdownLabel,
    /// Seconds remaining (or the full duration once the sale is over)
    pub seconds: u64,
    pub text: String,
}

/// Timer for `snapshot` at `now`.
///
/// Once the contract has moved past the sale (Ended or later, or an unknown
/// code) the full duration is shown instead of a countdown.
pub fn countdown(snapshot: &RaffleSnapshot, now: UnixTimestamp) -> Countdown {
    let open = RaffleStatus::try_from(snapshot.status_code)
        .map(|status| status.is_open())
        .unwrap_or(false);

    if !open {
        return Countdown {
            label: CountdownLabel::Duration,
            seconds: snapshot.duration,
            text: format_duration(snapshot.duration),
        };
    }

    let (label, remaining) = if now < snapshot.start_time {
        (CountdownLabel::StartsIn, snapshot.start_time.saturating_sub(now))
    } else {
        (CountdownLabel::EndsIn, snapshot.end_time().saturating_sub(now))
    };

    let seconds = u64::try_from(remaining).unwrap_or(0);
    let text = if seconds > 0 {
        format_time(seconds)
    } else {
        "Ended".to_string()
    };

    Countdown {
        label,
        seconds,
        text,
    }
}
