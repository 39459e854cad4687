#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::future::{ready, Future};
use std::sync::{Arc, Mutex};

use raffle_entitlements::{
    error::{QueryError, QueryResult, WriteFailure},
    instruction::RaffleInstruction,
    query::{RaffleQuery, RaffleWriter, Receipt},
    state::RaffleSnapshot,
    utils::TokenAmount,
};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

#[derive(Default)]
pub struct ChainState {
    pub raffles: HashMap<Pubkey, RaffleSnapshot>,
    pub winner_slots: HashMap<Pubkey, Vec<Pubkey>>,
    pub wins: HashMap<(Pubkey, Pubkey), u64>,
    pub claimed: HashMap<(Pubkey, Pubkey), bool>,
    pub tickets: HashMap<(Pubkey, Pubkey), u64>,
    pub refundable: HashMap<(Pubkey, Pubkey), TokenAmount>,
    pub allowances: HashMap<(Pubkey, Pubkey, Pubkey), TokenAmount>,
    pub token_approvals: HashMap<(Pubkey, u128), Pubkey>,
    pub operator_approvals: HashSet<(Pubkey, Pubkey, Pubkey)>,
    pub native_balances: HashMap<Pubkey, TokenAmount>,
    pub fungible_balances: HashMap<(Pubkey, Pubkey), TokenAmount>,
    pub owners: HashMap<(Pubkey, u128), Pubkey>,
    pub multi_unit_balances: HashMap<(Pubkey, Pubkey, u128), u64>,
    pub symbols: HashMap<Pubkey, String>,
    /// Read names that fail with a revert
    pub failing_reads: HashSet<&'static str>,
    /// (read name, holder) pairs that fail
    pub failing_holders: HashSet<(&'static str, Pubkey)>,
    pub read_counts: HashMap<&'static str, u64>,
    pub submitted: Vec<(Pubkey, RaffleInstruction)>,
    /// Next write fails with this
    pub write_failure: Option<WriteFailure>,
    /// Whether successful writes change chain state
    pub apply_writes: bool,
}

/// Engine log output, captured while the guard from `install` is alive
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// In-memory stand-in for the raffle and token contracts
#[derive(Default)]
pub struct MockChain {
    pub state: Mutex<ChainState>,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        let chain = MockChain::default();
        chain.state.lock().unwrap().apply_writes = true;
        Arc::new(chain)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn put_raffle(&self, snapshot: RaffleSnapshot) {
        self.with(|s| {
            s.raffles.insert(snapshot.address, snapshot);
        });
    }

    pub fn update_raffle(&self, raffle: &Pubkey, f: impl FnOnce(&mut RaffleSnapshot)) {
        self.with(|s| {
            if let Some(snapshot) = s.raffles.get_mut(raffle) {
                f(snapshot);
            }
        });
    }

    pub fn fail_read(&self, name: &'static str) {
        self.with(|s| {
            s.failing_reads.insert(name);
        });
    }

    pub fn fail_read_for(&self, name: &'static str, holder: Pubkey) {
        self.with(|s| {
            s.failing_holders.insert((name, holder));
        });
    }

    pub fn heal_reads(&self) {
        self.with(|s| {
            s.failing_reads.clear();
            s.failing_holders.clear();
        });
    }

    pub fn fail_next_write(&self, failure: WriteFailure) {
        self.with(|s| s.write_failure = Some(failure));
    }

    pub fn read_count(&self, name: &'static str) -> u64 {
        self.with(|s| s.read_counts.get(name).copied().unwrap_or(0))
    }

    pub fn submitted(&self) -> Vec<(Pubkey, RaffleInstruction)> {
        self.with(|s| s.submitted.clone())
    }

    fn raffle_field<T>(
        &self,
        name: &'static str,
        raffle: &Pubkey,
        get: impl FnOnce(&RaffleSnapshot) -> T,
    ) -> QueryResult<T> {
        self.with(|s| {
            *s.read_counts.entry(name).or_default() += 1;
            if s.failing_reads.contains(name) {
                return Err(QueryError::Reverted(format!("{} unavailable", name)));
            }
            s.raffles
                .get(raffle)
                .map(get)
                .ok_or_else(|| QueryError::Reverted("no such raffle".to_string()))
        })
    }

    fn read<T>(
        &self,
        name: &'static str,
        holder: Option<&Pubkey>,
        get: impl FnOnce(&ChainState) -> T,
    ) -> QueryResult<T> {
        self.with(|s| {
            *s.read_counts.entry(name).or_default() += 1;
            let holder_fails = holder
                .map(|holder| s.failing_holders.contains(&(name, *holder)))
                .unwrap_or(false);
            if s.failing_reads.contains(name) || holder_fails {
                return Err(QueryError::Transport(format!("{} timed out", name)));
            }
            Ok(get(s))
        })
    }

    fn apply(state: &mut ChainState, target: &Pubkey, instruction: &RaffleInstruction) {
        match instruction {
            RaffleInstruction::Activate => set_status(state, target, 1),
            RaffleInstruction::EndRaffle => set_status(state, target, 2),
            RaffleInstruction::RequestRandomWords => set_status(state, target, 3),
            RaffleInstruction::DeleteRaffle => set_status(state, target, 5),
            RaffleInstruction::PurchaseTickets { quantity, .. } => {
                if let Some(snapshot) = state.raffles.get_mut(target) {
                    snapshot.tickets_sold += quantity;
                }
            }
            RaffleInstruction::ApproveFungible {
                token,
                spender,
                amount,
            } => {
                let owner = creator_of(state, spender);
                state.allowances.insert((*token, owner, *spender), *amount);
            }
            RaffleInstruction::ApproveToken {
                collection,
                spender,
                token_id,
            } => {
                state.token_approvals.insert((*collection, *token_id), *spender);
            }
            RaffleInstruction::SetApprovalForAll {
                collection,
                operator,
                ..
            } => {
                let owner = creator_of(state, operator);
                state
                    .operator_approvals
                    .insert((*collection, owner, *operator));
            }
            RaffleInstruction::DepositEscrowPrize { value } => {
                let Some(snapshot) = state.raffles.get(target).cloned() else {
                    return;
                };
                if !value.is_zero() {
                    state.native_balances.insert(*target, *value);
                } else if snapshot.fungible_prize_token != Pubkey::default() {
                    state.fungible_balances.insert(
                        (snapshot.fungible_prize_token, *target),
                        snapshot.fungible_prize_amount,
                    );
                } else if snapshot.standard_tag == 0 {
                    state.owners.insert(
                        (snapshot.prize_collection, snapshot.prize_token_id),
                        *target,
                    );
                } else {
                    state.multi_unit_balances.insert(
                        (snapshot.prize_collection, *target, snapshot.prize_token_id),
                        1,
                    );
                }
            }
            _ => {}
        }
    }
}

fn set_status(state: &mut ChainState, raffle: &Pubkey, code: u8) {
    if let Some(snapshot) = state.raffles.get_mut(raffle) {
        snapshot.status_code = code;
    }
}

fn creator_of(state: &ChainState, raffle: &Pubkey) -> Pubkey {
    state
        .raffles
        .get(raffle)
        .map(|snapshot| snapshot.creator)
        .unwrap_or_default()
}

impl RaffleQuery for MockChain {
    fn name(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<String>> + Send {
        ready(self.raffle_field("name", raffle, |s| s.name.clone()))
    }

    fn creator(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<Pubkey>> + Send {
        ready(self.raffle_field("creator", raffle, |s| s.creator))
    }

    fn start_time(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<UnixTimestamp>> + Send {
        ready(self.raffle_field("startTime", raffle, |s| s.start_time))
    }

    fn duration(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send {
        ready(self.raffle_field("duration", raffle, |s| s.duration))
    }

    fn ticket_price(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        ready(self.raffle_field("ticketPrice", raffle, |s| s.ticket_price))
    }

    fn ticket_limit(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send {
        ready(self.raffle_field("ticketLimit", raffle, |s| s.ticket_limit))
    }

    fn tickets_sold(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send {
        ready(self.raffle_field("ticketsSold", raffle, |s| s.tickets_sold))
    }

    fn winners_count(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send {
        ready(self.raffle_field("winnersCount", raffle, |s| s.winners_count))
    }

    fn max_tickets_per_participant(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        ready(self.raffle_field("maxTicketsPerParticipant", raffle, |s| {
            s.max_tickets_per_participant
        }))
    }

    fn is_prized(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<bool>> + Send {
        ready(self.raffle_field("isPrized", raffle, |s| s.is_prized))
    }

    fn prize_collection(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send {
        ready(self.raffle_field("prizeCollection", raffle, |s| s.prize_collection))
    }

    fn prize_token_id(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u128>> + Send {
        ready(self.raffle_field("prizeTokenId", raffle, |s| s.prize_token_id))
    }

    fn standard_tag(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u8>> + Send {
        ready(self.raffle_field("standardTag", raffle, |s| s.standard_tag))
    }

    fn status_code(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u8>> + Send {
        ready(self.raffle_field("statusCode", raffle, |s| s.status_code))
    }

    fn fungible_prize_token(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send {
        ready(self.raffle_field("fungiblePrizeToken", raffle, |s| s.fungible_prize_token))
    }

    fn fungible_prize_amount(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        ready(self.raffle_field("fungiblePrizeAmount", raffle, |s| s.fungible_prize_amount))
    }

    fn native_prize_amount(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        ready(self.raffle_field("nativePrizeAmount", raffle, |s| s.native_prize_amount))
    }

    fn uses_custom_price(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<bool>> + Send {
        ready(self.raffle_field("usesCustomPrice", raffle, |s| {
            s.uses_custom_price.unwrap_or(false)
        }))
    }

    fn is_escrowed_prize(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<bool>> + Send {
        ready(self.raffle_field("isEscrowedPrize", raffle, |s| s.is_escrowed_prize))
    }

    fn winner_at_index(
        &self,
        raffle: &Pubkey,
        index: u64,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send {
        let raffle = *raffle;
        ready(self.read("winnerAtIndex", None, |s| {
            s.winner_slots
                .get(&raffle)
                .and_then(|slots| slots.get(index as usize).copied())
                .unwrap_or_default()
        }))
    }

    fn win_count_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        let key = (*raffle, *holder);
        ready(self.read("winCountOf", Some(holder), |s| {
            s.wins.get(&key).copied().unwrap_or(0)
        }))
    }

    fn prize_claimed_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<bool>> + Send {
        let key = (*raffle, *holder);
        ready(self.read("prizeClaimedOf", Some(holder), |s| {
            s.claimed.get(&key).copied().unwrap_or(false)
        }))
    }

    fn tickets_purchased_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        let key = (*raffle, *holder);
        ready(self.read("ticketsPurchasedOf", Some(holder), |s| {
            s.tickets.get(&key).copied().unwrap_or(0)
        }))
    }

    fn refundable_amount_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        let key = (*raffle, *holder);
        ready(self.read("refundableAmountOf", Some(holder), |s| {
            s.refundable.get(&key).copied().unwrap_or_default()
        }))
    }

    fn allowance(
        &self,
        token: &Pubkey,
        owner: &Pubkey,
        spender: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        let key = (*token, *owner, *spender);
        ready(self.read("allowance", None, |s| {
            s.allowances.get(&key).copied().unwrap_or_default()
        }))
    }

    fn approved_for_token(
        &self,
        collection: &Pubkey,
        token_id: u128,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send {
        let key = (*collection, token_id);
        ready(self.read("approvedForToken", None, |s| {
            s.token_approvals.get(&key).copied().unwrap_or_default()
        }))
    }

    fn is_approved_for_all(
        &self,
        collection: &Pubkey,
        owner: &Pubkey,
        operator: &Pubkey,
    ) -> impl Future<Output = QueryResult<bool>> + Send {
        let key = (*collection, *owner, *operator);
        ready(self.read("isApprovedForAll", None, |s| {
            s.operator_approvals.contains(&key)
        }))
    }

    fn native_balance(
        &self,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        let key = *holder;
        ready(self.read("nativeBalance", None, |s| {
            s.native_balances.get(&key).copied().unwrap_or_default()
        }))
    }

    fn fungible_balance(
        &self,
        token: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send {
        let key = (*token, *holder);
        ready(self.read("fungibleBalance", None, |s| {
            s.fungible_balances.get(&key).copied().unwrap_or_default()
        }))
    }

    fn owner_of(
        &self,
        collection: &Pubkey,
        token_id: u128,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send {
        let key = (*collection, token_id);
        ready(self.read("ownerOf", None, |s| {
            s.owners.get(&key).copied().unwrap_or_default()
        }))
    }

    fn multi_unit_balance(
        &self,
        collection: &Pubkey,
        holder: &Pubkey,
        token_id: u128,
    ) -> impl Future<Output = QueryResult<u64>> + Send {
        let key = (*collection, *holder, token_id);
        ready(self.read("multiUnitBalance", None, |s| {
            s.multi_unit_balances.get(&key).copied().unwrap_or(0)
        }))
    }

    fn token_symbol(&self, token: &Pubkey) -> impl Future<Output = QueryResult<String>> + Send {
        let key = *token;
        ready(self.read("tokenSymbol", None, |s| {
            s.symbols.get(&key).cloned().unwrap_or_default()
        }))
    }
}

/// Write side of the mock chain
pub struct MockWriter(pub Arc<MockChain>);

impl RaffleWriter for MockWriter {
    fn submit(
        &self,
        target: &Pubkey,
        instruction: &RaffleInstruction,
    ) -> impl Future<Output = Result<Receipt, WriteFailure>> + Send {
        let result = self.0.with(|s| {
            if let Some(failure) = s.write_failure.take() {
                return Err(failure);
            }
            s.submitted.push((*target, instruction.clone()));
            if s.apply_writes {
                MockChain::apply(s, target, instruction);
            }
            Ok(Receipt {
                signature: format!("sig-{}", s.submitted.len()),
            })
        });
        ready(result)
    }
}

/// Active native-prize raffle with an open window around `now = 2_000`
pub fn active_raffle(address: Pubkey, creator: Pubkey) -> RaffleSnapshot {
    RaffleSnapshot {
        address,
        name: "Weekend Raffle".to_string(),
        creator,
        start_time: 1_000,
        duration: 3_600,
        ticket_price: TokenAmount::new(10_000_000_000_000_000),
        ticket_limit: 100,
        tickets_sold: 10,
        max_tickets_per_participant: 5,
        winners_count: 1,
        status_code: 1,
        is_prized: true,
        native_prize_amount: TokenAmount::new(1_500_000_000_000_000_000),
        uses_custom_price: Some(true),
        ..RaffleSnapshot::default()
    }
}
