// Raffle Entitlement Engine - Write intent processor
use solana_program::clock::UnixTimestamp;

use crate::{
    error::RaffleError,
    instruction::RaffleInstruction,
    query::{RaffleQuery, RaffleWriter, Receipt},
    session::RaffleSession,
    utils::TokenAmount,
};

/// Write intent handler.
pub struct Processor {}

impl Processor {
    /// Unpack a serialized intent and process it
    pub async fn process_packed<Q, W>(
        session: &mut RaffleSession<Q, W>,
        instruction_data: &[u8],
        now: UnixTimestamp,
    ) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        let instruction = RaffleInstruction::unpack(instruction_data)?;
        Self::process(session, &instruction, now).await
    }

    /// Check `instruction` against the caller's current action set, hand it
    /// to the write collaborator and re-read the raffle once it lands.
    ///
    /// Failed writes leave every cache as it was.
    pub async fn process<Q, W>(
        session: &mut RaffleSession<Q, W>,
        instruction: &RaffleInstruction,
        now: UnixTimestamp,
    ) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        if !session.caller().is_connected() {
            return Err(RaffleError::WalletNotConnected);
        }

        let actions = session.actions(now)?;
        let action = instruction.action();
        if !actions.contains(action) {
            tracing::warn!(?action, "action not permitted");
            return Err(RaffleError::ActionNotPermitted(action));
        }

        tracing::info!(method = instruction.method_name(), "processing instruction");
        let receipt = match instruction {
            RaffleInstruction::PurchaseTickets { quantity, value } => {
                Self::process_purchase_tickets(session, *quantity, *value).await
            }
            RaffleInstruction::ApproveFungible { .. }
            | RaffleInstruction::ApproveToken { .. }
            | RaffleInstruction::SetApprovalForAll { .. } => {
                Self::process_approve_escrow(session, instruction).await
            }
            RaffleInstruction::DepositEscrowPrize { value } => {
                Self::process_deposit_escrow(session, *value).await
            }
            RaffleInstruction::Activate
            | RaffleInstruction::EndRaffle
            | RaffleInstruction::RequestRandomWords
            | RaffleInstruction::ClaimPrize
            | RaffleInstruction::ClaimRefund
            | RaffleInstruction::DeleteRaffle
            | RaffleInstruction::WithdrawEscrowedPrize
            | RaffleInstruction::SetExternalPrize { .. }
            | RaffleInstruction::MintToWinner { .. } => session.submit(instruction).await,
        };

        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(method = instruction.method_name(), error = %err, "write failed");
                return Err(err);
            }
        };

        tracing::info!(
            method = instruction.method_name(),
            signature = %receipt.signature,
            "write confirmed"
        );
        session.invalidate_after_write();
        session.refresh(now).await?;
        Ok(receipt)
    }

    /// Process PurchaseTickets instruction
    async fn process_purchase_tickets<Q, W>(
        session: &mut RaffleSession<Q, W>,
        quantity: u64,
        value: TokenAmount,
    ) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        let expected = session.purchase_instruction(quantity)?;
        if expected.value() != value {
            tracing::warn!(
                %value,
                expected = %expected.value(),
                "purchase value does not match ticket price"
            );
            return Err(RaffleError::InvalidInstructionData);
        }
        session.submit(&expected).await
    }

    /// Process an escrow approval instruction
    async fn process_approve_escrow<Q, W>(
        session: &mut RaffleSession<Q, W>,
        instruction: &RaffleInstruction,
    ) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        let expected = session
            .pipeline()
            .and_then(|pipeline| pipeline.approval_instruction())
            .ok_or(RaffleError::NothingToApprove)?;
        if expected != *instruction {
            return Err(RaffleError::InvalidInstructionData);
        }
        session.approve_escrow().await
    }

    /// Process DepositEscrowPrize instruction
    async fn process_deposit_escrow<Q, W>(
        session: &mut RaffleSession<Q, W>,
        value: TokenAmount,
    ) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        let expected = session
            .pipeline()
            .map(|pipeline| pipeline.deposit_instruction())
            .ok_or(RaffleError::NothingToApprove)?;
        if expected.value() != value {
            return Err(RaffleError::InvalidInstructionData);
        }
        session.deposit_escrow().await
    }
}
