// Raffle Entitlement Engine - Escrow approval pipeline
use solana_program::pubkey::Pubkey;

use crate::error::RaffleError;
use crate::instruction::RaffleInstruction;
use crate::prize::PrizeKind;
use crate::query::{or_default, RaffleQuery, RaffleWriter, Receipt};
use crate::utils::TokenAmount;

/// Escrow progress for one (owner, prize) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApprovalState {
    NotChecked,
    NotApproved,
    Approved,
    /// Deposit submitted, waiting for the re-read
    Depositing,
    Deposited,
}

/// Two-step "approve transfer, then deposit" flow for an escrowed prize.
///
/// State only moves through `check`, `approve` and `deposit`; every write is
/// followed by a fresh read instead of trusting the local outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApprovalPipeline {
    prize: PrizeKind,
    /// Prize holder (the raffle creator)
    owner: Pubkey,
    /// Raffle contract that takes custody
    spender: Pubkey,
    state: ApprovalState,
}

impl ApprovalPipeline {
    pub fn new(prize: PrizeKind, owner: Pubkey, spender: Pubkey) -> Self {
        Self {
            prize,
            owner,
            spender,
            state: ApprovalState::NotChecked,
        }
    }

    pub fn state(&self) -> ApprovalState {
        self.state
    }

    pub fn prize(&self) -> PrizeKind {
        self.prize
    }

    /// Approval write for this prize, `None` when no approval step exists
    pub fn approval_instruction(&self) -> Option<RaffleInstruction> {
        match self.prize {
            PrizeKind::Fungible { token, .. } => Some(RaffleInstruction::ApproveFungible {
                token,
                spender: self.spender,
                amount: TokenAmount::new(u128::MAX),
            }),
            PrizeKind::UniqueToken {
                collection,
                token_id,
            } => Some(RaffleInstruction::ApproveToken {
                collection,
                spender: self.spender,
                token_id,
            }),
            PrizeKind::MultiUnitToken { collection, .. } => {
                Some(RaffleInstruction::SetApprovalForAll {
                    collection,
                    operator: self.spender,
                    approved: true,
                })
            }
            PrizeKind::Native(_) | PrizeKind::None => None,
        }
    }

    /// Deposit write; native prizes carry their amount as value
    pub fn deposit_instruction(&self) -> RaffleInstruction {
        let value = match self.prize {
            PrizeKind::Native(amount) => amount,
            _ => TokenAmount::ZERO,
        };
        RaffleInstruction::DepositEscrowPrize { value }
    }

    /// Whether the spender may currently move the prize out of the owner's hands
    pub async fn check_approval<Q: RaffleQuery>(&self, query: &Q) -> ApprovalState {
        let approved = match self.prize {
            PrizeKind::None => return ApprovalState::NotChecked,
            PrizeKind::Native(_) => true,
            PrizeKind::Fungible { token, amount } => {
                let allowance = or_default(
                    "allowance",
                    query.allowance(&token, &self.owner, &self.spender).await,
                    TokenAmount::ZERO,
                );
                allowance.gte(amount)
            }
            PrizeKind::UniqueToken {
                collection,
                token_id,
            } => {
                let approved = or_default(
                    "approvedForToken",
                    query.approved_for_token(&collection, token_id).await,
                    Pubkey::default(),
                );
                approved == self.spender
                    || or_default(
                        "isApprovedForAll",
                        query
                            .is_approved_for_all(&collection, &self.owner, &self.spender)
                            .await,
                        false,
                    )
            }
            PrizeKind::MultiUnitToken { collection, .. } => or_default(
                "isApprovedForAll",
                query
                    .is_approved_for_all(&collection, &self.owner, &self.spender)
                    .await,
                false,
            ),
        };

        if approved {
            ApprovalState::Approved
        } else {
            ApprovalState::NotApproved
        }
    }

    /// Whether the prize already sits in the raffle contract
    pub async fn check_deposited<Q: RaffleQuery>(&self, query: &Q) -> bool {
        match self.prize {
            PrizeKind::None => false,
            PrizeKind::Native(amount) => or_default(
                "nativeBalance",
                query.native_balance(&self.spender).await,
                TokenAmount::ZERO,
            )
            .gte(amount),
            PrizeKind::Fungible { token, amount } => or_default(
                "fungibleBalance",
                query.fungible_balance(&token, &self.spender).await,
                TokenAmount::ZERO,
            )
            .gte(amount),
            PrizeKind::UniqueToken {
                collection,
                token_id,
            } => {
                or_default(
                    "ownerOf",
                    query.owner_of(&collection, token_id).await,
                    Pubkey::default(),
                ) == self.spender
            }
            PrizeKind::MultiUnitToken {
                collection,
                token_id,
            } => {
                or_default(
                    "multiUnitBalance",
                    query
                        .multi_unit_balance(&collection, &self.spender, token_id)
                        .await,
                    0,
                ) > 0
            }
        }
    }

    /// Re-read deposit and approval status from the chain
    pub async fn refresh<Q: RaffleQuery>(&mut self, query: &Q) -> ApprovalState {
        self.state = if self.check_deposited(query).await {
            ApprovalState::Deposited
        } else {
            self.check_approval(query).await
        };
        self.state
    }

    /// Submit the approval write. No retry: on failure the state is left as
    /// it was and the caller may `refresh` before trying again.
    pub async fn approve<Q, W>(&mut self, query: &Q, writer: &W) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        let instruction = self
            .approval_instruction()
            .ok_or(RaffleError::NothingToApprove)?;
        let target = instruction.target(&self.spender);

        tracing::info!(method = instruction.method_name(), "submitting approval");
        let receipt = writer.submit(&target, &instruction).await.map_err(|failure| {
            let reason = failure.revert_reason();
            tracing::warn!(%reason, "approval failed");
            RaffleError::WriteFailed(reason)
        })?;

        self.refresh(query).await;
        tracing::info!(state = ?self.state, "approval confirmed");
        Ok(receipt)
    }

    /// Submit the deposit write. Success and failure both end in a forced
    /// re-read, since only funds actually held by the raffle count.
    pub async fn deposit<Q, W>(&mut self, query: &Q, writer: &W) -> Result<Receipt, RaffleError>
    where
        Q: RaffleQuery,
        W: RaffleWriter,
    {
        if self.prize.is_none() {
            return Err(RaffleError::NothingToApprove);
        }

        let instruction = self.deposit_instruction();
        tracing::info!(method = instruction.method_name(), "submitting deposit");

        self.state = ApprovalState::Depositing;
        let result = writer.submit(&self.spender, &instruction).await;
        self.refresh(query).await;

        match result {
            Ok(receipt) => {
                tracing::info!(state = ?self.state, "deposit confirmed");
                Ok(receipt)
            }
            Err(failure) => {
                let reason = failure.revert_reason();
                tracing::warn!(%reason, state = ?self.state, "deposit failed");
                Err(RaffleError::WriteFailed(reason))
            }
        }
    }
}
