// Raffle Entitlement Engine - Entitlement evaluation
use std::collections::BTreeSet;

use solana_program::clock::UnixTimestamp;

use crate::approval::ApprovalState;
use crate::lifecycle::{LifecyclePhase, RaffleStatus};
use crate::prize::PrizeKind;
use crate::state::{Caller, Role};
use crate::utils::TokenAmount;
use crate::view::RaffleView;

/// Something a caller may do to a raffle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Activate,
    EndEarly,
    PurchaseTickets,
    RequestDraw,
    ClaimPrize,
    ClaimRefund,
    ApproveEscrowAsset,
    DepositEscrowAsset,
    WithdrawEscrowAsset,
    AssignPrize,
    MintToWinner,
    DeleteRaffle,
}

impl Action {
    /// Button text; unique-token prizes are minted on claim
    pub fn label(&self, prize: &PrizeKind) -> &'static str {
        match self {
            Action::Activate => "Activate Raffle",
            Action::EndEarly => "End Raffle",
            Action::PurchaseTickets => "Purchase Tickets",
            Action::RequestDraw => "Request Randomness",
            Action::ClaimPrize => match prize {
                PrizeKind::UniqueToken { .. } => "Mint Prize",
                _ => "Claim Prize",
            },
            Action::ClaimRefund => "Claim Refund",
            Action::ApproveEscrowAsset => "Approve Prize",
            Action::DepositEscrowAsset => "Deposit Prize",
            Action::WithdrawEscrowAsset => "Withdraw Prize",
            Action::AssignPrize => "Assign Prize",
            Action::MintToWinner => "Mint to Winner",
            Action::DeleteRaffle => "Delete Raffle",
        }
    }
}

/// Actions permitted for one (snapshot, caller, instant) evaluation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        ActionSet(iter.into_iter().collect())
    }
}

/// Caller facts that only exist once winners are drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClaimFacts {
    pub is_winner: bool,
    pub prize_claimed: bool,
    pub refund_eligible: bool,
    pub refund_claimed: bool,
    pub refundable_amount: TokenAmount,
}

/// Compute what `caller` may do with the raffle in `view` at `now`.
///
/// `view` must be resolved at `now` (see `RaffleView::at`). Anonymous callers
/// and unknown phases get the empty set.
pub fn evaluate(
    view: &RaffleView,
    caller: &Caller,
    escrow: ApprovalState,
    claim: &ClaimFacts,
    now: UnixTimestamp,
) -> ActionSet {
    let phase = view.phase;
    if !caller.is_connected() || phase == LifecyclePhase::Unknown {
        return ActionSet::empty();
    }

    let snapshot = &view.snapshot;
    let prize = view.prize;
    let is_creator = caller.role(snapshot) == Role::Creator;
    let mut actions = BTreeSet::new();

    if phase == LifecyclePhase::Pending && now >= snapshot.start_time {
        actions.insert(Action::Activate);
    }

    if phase == LifecyclePhase::EndedByTime && view.status == Some(RaffleStatus::Active) {
        actions.insert(Action::EndEarly);
    }

    if phase == LifecyclePhase::Active
        && snapshot.tickets_sold < snapshot.ticket_limit
        && caller.tickets_purchased < snapshot.max_tickets_per_participant
    {
        actions.insert(Action::PurchaseTickets);
    }

    if phase == LifecyclePhase::Ended {
        actions.insert(Action::RequestDraw);
    }

    if phase.is_completed() {
        if !prize.is_none() && claim.is_winner && !claim.prize_claimed {
            actions.insert(Action::ClaimPrize);
        }
        if claim.refund_eligible && !claim.refund_claimed && !claim.refundable_amount.is_zero() {
            actions.insert(Action::ClaimRefund);
        }
    }

    if is_creator {
        // Escrow is settled before the sale closes.
        let before_sale_closes = matches!(phase, LifecyclePhase::Pending | LifecyclePhase::Active);
        if before_sale_closes {
            actions.insert(Action::DeleteRaffle);
        }

        if view.is_escrowed() && before_sale_closes {
            match escrow {
                ApprovalState::NotApproved => {
                    actions.insert(Action::ApproveEscrowAsset);
                }
                ApprovalState::Approved => {
                    actions.insert(Action::DepositEscrowAsset);
                }
                ApprovalState::NotChecked
                | ApprovalState::Depositing
                | ApprovalState::Deposited => {}
            }
        }

        if view.is_escrowed() && matches!(prize, PrizeKind::MultiUnitToken { .. }) {
            actions.insert(Action::WithdrawEscrowAsset);
        }

        if prize.is_none() && phase == LifecyclePhase::Pending {
            actions.insert(Action::AssignPrize);
        }

        if matches!(prize, PrizeKind::UniqueToken { .. })
            && !snapshot.is_escrowed_prize
            && phase.is_terminal()
        {
            actions.insert(Action::MintToWinner);
        }
    }

    ActionSet(actions)
}
