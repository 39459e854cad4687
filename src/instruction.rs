// Raffle Entitlement Engine - Write intents
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::entitlement::Action;
use crate::error::RaffleError;
use crate::utils::TokenAmount;

/// A write the engine asks the write collaborator to perform.
///
/// Each variant is one contract method plus its arguments; the collaborator
/// turns it into a signed transaction against `target`.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum RaffleInstruction {
    /// Open a pending raffle for ticket sales
    ///
    /// Target: the raffle
    Activate,

    /// Buy tickets
    ///
    /// Target: the raffle, `value` = ticket price × quantity
    PurchaseTickets {
        quantity: u64,
        value: TokenAmount,
    },

    /// Close a raffle whose sale window has elapsed
    ///
    /// Target: the raffle
    EndRaffle,

    /// Ask the randomness provider for winners (permissionless)
    ///
    /// Target: the raffle
    RequestRandomWords,

    /// Target: the raffle
    ClaimPrize,

    /// Target: the raffle
    ClaimRefund,

    /// Target: the raffle
    DeleteRaffle,

    /// Move the approved prize into the raffle
    ///
    /// Target: the raffle, `value` carries a native prize
    DepositEscrowPrize {
        value: TokenAmount,
    },

    /// Pull an escrowed multi-unit prize back to the creator
    ///
    /// Target: the raffle
    WithdrawEscrowedPrize,

    /// Attach an externally held collection as the prize of a whitelist raffle
    ///
    /// Target: the raffle
    SetExternalPrize {
        collection: Pubkey,
    },

    /// Mint a non-escrowed unique-token prize straight to a winner
    ///
    /// Target: the raffle
    MintToWinner {
        winner: Pubkey,
    },

    /// Fungible allowance for the raffle
    ///
    /// Target: the token
    ApproveFungible {
        token: Pubkey,
        spender: Pubkey,
        amount: TokenAmount,
    },

    /// Approval of one unique token for the raffle
    ///
    /// Target: the collection
    ApproveToken {
        collection: Pubkey,
        spender: Pubkey,
        token_id: u128,
    },

    /// Blanket operator approval for the raffle
    ///
    /// Target: the collection
    SetApprovalForAll {
        collection: Pubkey,
        operator: Pubkey,
        approved: bool,
    },
}

impl RaffleInstruction {
    /// Contract method this intent invokes
    pub fn method_name(&self) -> &'static str {
        match self {
            RaffleInstruction::Activate => "activate",
            RaffleInstruction::PurchaseTickets { .. } => "purchaseTickets",
            RaffleInstruction::EndRaffle => "endRaffle",
            RaffleInstruction::RequestRandomWords => "requestRandomWords",
            RaffleInstruction::ClaimPrize => "claimPrize",
            RaffleInstruction::ClaimRefund => "claimRefund",
            RaffleInstruction::DeleteRaffle => "deleteRaffle",
            RaffleInstruction::DepositEscrowPrize { .. } => "depositEscrowPrize",
            RaffleInstruction::WithdrawEscrowedPrize => "withdrawEscrowedPrize",
            RaffleInstruction::SetExternalPrize { .. } => "setExternalPrize",
            RaffleInstruction::MintToWinner { .. } => "mintToWinner",
            RaffleInstruction::ApproveFungible { .. } => "approve",
            RaffleInstruction::ApproveToken { .. } => "approve",
            RaffleInstruction::SetApprovalForAll { .. } => "setApprovalForAll",
        }
    }

    /// Contract the intent is sent to
    pub fn target(&self, raffle: &Pubkey) -> Pubkey {
        match self {
            RaffleInstruction::ApproveFungible { token, .. } => *token,
            RaffleInstruction::ApproveToken { collection, .. }
            | RaffleInstruction::SetApprovalForAll { collection, .. } => *collection,
            _ => *raffle,
        }
    }

    /// Native value attached to the call
    pub fn value(&self) -> TokenAmount {
        match self {
            RaffleInstruction::PurchaseTickets { value, .. }
            | RaffleInstruction::DepositEscrowPrize { value } => *value,
            _ => TokenAmount::ZERO,
        }
    }

    /// Entitlement that gates this intent
    pub fn action(&self) -> Action {
        match self {
            RaffleInstruction::Activate => Action::Activate,
            RaffleInstruction::PurchaseTickets { .. } => Action::PurchaseTickets,
            RaffleInstruction::EndRaffle => Action::EndEarly,
            RaffleInstruction::RequestRandomWords => Action::RequestDraw,
            RaffleInstruction::ClaimPrize => Action::ClaimPrize,
            RaffleInstruction::ClaimRefund => Action::ClaimRefund,
            RaffleInstruction::DeleteRaffle => Action::DeleteRaffle,
            RaffleInstruction::DepositEscrowPrize { .. } => Action::DepositEscrowAsset,
            RaffleInstruction::WithdrawEscrowedPrize => Action::WithdrawEscrowAsset,
            RaffleInstruction::SetExternalPrize { .. } => Action::AssignPrize,
            RaffleInstruction::MintToWinner { .. } => Action::MintToWinner,
            RaffleInstruction::ApproveFungible { .. }
            | RaffleInstruction::ApproveToken { .. }
            | RaffleInstruction::SetApprovalForAll { .. } => Action::ApproveEscrowAsset,
        }
    }

    /// Serialize for handing across a process boundary
    pub fn pack(&self) -> Vec<u8> {
        // Writing into a Vec cannot fail.
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, RaffleError> {
        Self::try_from_slice(input).map_err(|_| RaffleError::InvalidInstructionData)
    }
}
