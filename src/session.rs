// Raffle Entitlement Engine - Per-raffle session
use std::sync::Arc;

use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::approval::{ApprovalPipeline, ApprovalState};
use crate::cache::TokenSymbolCache;
use crate::entitlement::{self, ActionSet, ClaimFacts};
use crate::error::{QueryResult, RaffleError};
use crate::instruction::RaffleInstruction;
use crate::lifecycle::{self, Countdown};
use crate::prize::PrizeKind;
use crate::query::{load_snapshot, or_default, RaffleQuery, RaffleWriter, Receipt};
use crate::refund::{self, Refundability};
use crate::state::{Caller, Config};
use crate::utils::{self, TokenAmount};
use crate::view::RaffleView;
use crate::winners::{WinnerRegistry, WinnerStats};

/// Everything one observer knows about one raffle.
///
/// Holds the last snapshot, the caller's per-address facts, the escrow
/// pipeline, winners and the symbol cache. Nothing here is shared with
/// other sessions; a write is followed by `invalidate_after_write` and a
/// fresh `refresh`.
pub struct RaffleSession<Q, W> {
    query: Arc<Q>,
    writer: W,
    config: Config,
    raffle: Pubkey,
    caller: Caller,
    view: Option<RaffleView>,
    pipeline: Option<ApprovalPipeline>,
    winners: WinnerRegistry,
    claim: ClaimFacts,
    symbols: TokenSymbolCache,
}

impl<Q, W> RaffleSession<Q, W>
where
    Q: RaffleQuery,
    W: RaffleWriter,
{
    pub fn new(query: Arc<Q>, writer: W, config: Config, raffle: Pubkey, caller: Caller) -> Self {
        let symbols = TokenSymbolCache::new(config.fallback_token_symbol.clone());
        Self {
            query,
            writer,
            config,
            raffle,
            caller,
            view: None,
            pipeline: None,
            winners: WinnerRegistry::new(raffle),
            claim: ClaimFacts::default(),
            symbols,
        }
    }

    pub fn raffle(&self) -> &Pubkey {
        &self.raffle
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Last loaded view, resolved at the instant of the last refresh
    pub fn view(&self) -> Result<&RaffleView, RaffleError> {
        self.view.as_ref().ok_or(RaffleError::SnapshotNotLoaded)
    }

    pub fn winners(&self) -> &WinnerRegistry {
        &self.winners
    }

    /// Statistics for one winner, cached until the next refresh
    pub async fn winner_stats(&mut self, address: &Pubkey) -> QueryResult<WinnerStats> {
        self.winners.stats(self.query.as_ref(), address).await
    }

    pub fn claim_facts(&self) -> ClaimFacts {
        self.claim
    }

    pub fn escrow_state(&self) -> ApprovalState {
        self.pipeline
            .as_ref()
            .map(ApprovalPipeline::state)
            .unwrap_or(ApprovalState::NotChecked)
    }

    /// Switch the observer. Caller facts are dropped until the next refresh.
    pub fn set_caller(&mut self, caller: Caller) {
        self.caller = caller;
        self.claim = ClaimFacts::default();
    }

    /// Re-read the snapshot and everything derived from it
    pub async fn refresh(&mut self, now: UnixTimestamp) -> Result<&RaffleView, RaffleError> {
        let snapshot = load_snapshot(self.query.as_ref(), &self.raffle).await;
        let view = RaffleView::new(snapshot, now);
        tracing::debug!(
            raffle = %self.raffle,
            status = lifecycle::status_label(view.snapshot.status_code),
            phase = ?view.phase,
            "snapshot loaded"
        );

        let mut refundable_amount = TokenAmount::ZERO;
        if let Some(address) = self.caller.address {
            let (tickets, refundable) = tokio::join!(
                self.query.tickets_purchased_of(&self.raffle, &address),
                self.query.refundable_amount_of(&self.raffle, &address),
            );
            self.caller.tickets_purchased = or_default("ticketsPurchasedOf", tickets, 0);
            refundable_amount = or_default("refundableAmountOf", refundable, TokenAmount::ZERO);
        }

        self.pipeline = if view.is_escrowed() {
            let mut pipeline =
                ApprovalPipeline::new(view.prize, view.snapshot.creator, self.raffle);
            if self.caller.is_creator(&view.snapshot) {
                pipeline.refresh(self.query.as_ref()).await;
            }
            Some(pipeline)
        } else {
            None
        };

        if view.phase.is_completed() {
            self.winners
                .load(self.query.as_ref(), view.snapshot.winners_count, &self.config)
                .await;
        } else {
            self.winners.invalidate();
        }

        let (is_winner, prize_claimed) = match self.caller.address {
            Some(address) => match self.winners.entry(&address) {
                Some(entry) => (true, entry.prize_claimed),
                None => (false, false),
            },
            None => (false, false),
        };
        self.claim = refund::claim_facts(&view, is_winner, prize_claimed, refundable_amount);

        if let PrizeKind::Fungible { token, .. } = view.prize {
            self.symbols.symbol(self.query.as_ref(), &token).await;
        }

        Ok(self.view.insert(view))
    }

    /// Actions the current caller may take at `now`
    pub fn actions(&self, now: UnixTimestamp) -> Result<ActionSet, RaffleError> {
        let view = self.view()?.at(now);
        Ok(entitlement::evaluate(
            &view,
            &self.caller,
            self.escrow_state(),
            &self.claim,
            now,
        ))
    }

    pub fn refundability(&self) -> Result<Refundability, RaffleError> {
        Ok(refund::refundability(self.view()?))
    }

    pub fn shows_refund_badge(&self, now: UnixTimestamp) -> Result<bool, RaffleError> {
        let actions = self.actions(now)?;
        Ok(refund::shows_refund_badge(self.view()?, &actions))
    }

    pub fn countdown(&self, now: UnixTimestamp) -> Result<Countdown, RaffleError> {
        Ok(lifecycle::countdown(&self.view()?.snapshot, now))
    }

    /// Caller's chance of winning as a percentage string
    pub fn winning_chance(&self) -> Result<Option<String>, RaffleError> {
        let snapshot = &self.view()?.snapshot;
        Ok(utils::winning_chance(
            self.caller.tickets_purchased,
            snapshot.tickets_sold,
        ))
    }

    pub fn max_purchasable(&self) -> Result<u64, RaffleError> {
        Ok(self
            .view()?
            .snapshot
            .max_purchasable(self.caller.tickets_purchased))
    }

    /// Purchase intent for `quantity` tickets at the current price
    pub fn purchase_instruction(&self, quantity: u64) -> Result<RaffleInstruction, RaffleError> {
        let maximum = self.max_purchasable()?;
        if quantity == 0 || quantity > maximum {
            return Err(RaffleError::InvalidQuantity {
                requested: quantity,
                maximum,
            });
        }
        let value = self
            .view()?
            .snapshot
            .ticket_price
            .checked_mul(quantity)
            .ok_or(RaffleError::Overflow)?;
        Ok(RaffleInstruction::PurchaseTickets { quantity, value })
    }

    /// Prize text, resolving the token symbol through the session cache
    pub async fn prize_description(&mut self) -> Result<String, RaffleError> {
        let prize = self.view()?.prize;
        let symbol = match prize {
            PrizeKind::Fungible { token, .. } => {
                Some(self.symbols.symbol(self.query.as_ref(), &token).await)
            }
            _ => None,
        };
        Ok(prize.describe(&self.config, symbol.as_deref()))
    }

    pub(crate) fn pipeline(&self) -> Option<&ApprovalPipeline> {
        self.pipeline.as_ref()
    }

    pub(crate) async fn approve_escrow(&mut self) -> Result<Receipt, RaffleError> {
        let pipeline = self.pipeline.as_mut().ok_or(RaffleError::NothingToApprove)?;
        pipeline.approve(self.query.as_ref(), &self.writer).await
    }

    pub(crate) async fn deposit_escrow(&mut self) -> Result<Receipt, RaffleError> {
        let pipeline = self.pipeline.as_mut().ok_or(RaffleError::NothingToApprove)?;
        pipeline.deposit(self.query.as_ref(), &self.writer).await
    }

    pub(crate) async fn submit(&self, instruction: &RaffleInstruction) -> Result<Receipt, RaffleError> {
        let target = instruction.target(&self.raffle);
        self.writer
            .submit(&target, instruction)
            .await
            .map_err(RaffleError::from)
    }

    /// Drop everything a write can make stale. The symbol cache survives.
    pub fn invalidate_after_write(&mut self) {
        self.view = None;
        self.pipeline = None;
        self.winners.invalidate();
        self.claim = ClaimFacts::default();
    }

    /// Drop every cached read, including token symbols
    pub fn invalidate(&mut self) {
        self.invalidate_after_write();
        self.symbols.invalidate();
    }
}
