// Raffle Entitlement Engine - Refund rules
use crate::entitlement::{Action, ActionSet, ClaimFacts};
use crate::lifecycle::LifecyclePhase;
use crate::utils::TokenAmount;
use crate::view::RaffleView;

/// Why a raffle's tickets are or are not refundable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefundReason {
    /// Deletion refunds every ticket
    Deleted,
    /// A single collection prize cannot be split across losing tickets
    SingleWinnerCollection,
    /// Losing tickets get their price back
    NonWinningTickets,
}

impl RefundReason {
    /// Explanation shown next to the refund badge
    pub fn describe(&self) -> &'static str {
        match self {
            RefundReason::Deleted => "Raffle was deleted before ending. All tickets are refundable.",
            RefundReason::SingleWinnerCollection => {
                "Single-winner NFT raffles are not refundable unless deleted before ending."
            }
            RefundReason::NonWinningTickets => {
                "This raffle supports refunds for non-winning tickets."
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Refundability {
    pub refundable: bool,
    pub label: &'static str,
    pub reason: RefundReason,
}

/// Refund policy of a raffle. Strict decision table, first row wins.
pub fn refundability(view: &RaffleView) -> Refundability {
    if view.phase == LifecyclePhase::Deleted {
        return Refundability {
            refundable: true,
            label: "All Tickets Refundable",
            reason: RefundReason::Deleted,
        };
    }

    if view.prize.is_collection() && view.snapshot.winners_count == 1 {
        return Refundability {
            refundable: false,
            label: "Tickets Refundable if Deleted",
            reason: RefundReason::SingleWinnerCollection,
        };
    }

    // Multi-winner collection prizes land here too; whether partial refunds
    // settle on-chain for them is unconfirmed.
    Refundability {
        refundable: true,
        label: "Non-winning Tickets Refundable",
        reason: RefundReason::NonWinningTickets,
    }
}

/// Whether the refund badge is worth showing: multi-winner collection raffles,
/// or while the caller could still delete the raffle.
pub fn shows_refund_badge(view: &RaffleView, actions: &ActionSet) -> bool {
    (view.prize.is_collection() && view.snapshot.winners_count > 1)
        || actions.contains(Action::DeleteRaffle)
}

/// Claim facts for a caller from the refund policy and per-address reads
pub fn claim_facts(
    view: &RaffleView,
    is_winner: bool,
    prize_claimed: bool,
    refundable_amount: TokenAmount,
) -> ClaimFacts {
    ClaimFacts {
        is_winner,
        prize_claimed,
        refund_eligible: refundability(view).refundable,
        // The contract zeroes the refundable amount once it is paid out.
        refund_claimed: false,
        refundable_amount,
    }
}

/// Expected refund for a holder of `tickets_purchased` tickets of which
/// `tickets_won` won, at the snapshot's ticket price. `None` on overflow.
pub fn estimated_refund(
    view: &RaffleView,
    tickets_purchased: u64,
    tickets_won: u64,
) -> Option<TokenAmount> {
    let policy = refundability(view);
    if !policy.refundable {
        return Some(TokenAmount::ZERO);
    }
    let refundable_tickets = match policy.reason {
        RefundReason::Deleted => tickets_purchased,
        _ => tickets_purchased.saturating_sub(tickets_won),
    };
    view.snapshot.ticket_price.checked_mul(refundable_tickets)
}
