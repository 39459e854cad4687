// Raffle Entitlement Engine - Contract collaborators
use std::future::Future;

use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::error::{QueryResult, WriteFailure};
use crate::instruction::RaffleInstruction;
use crate::state::{RaffleSnapshot, UNREADABLE_CODE};
use crate::utils::TokenAmount;

/// Read-only view of the raffle contracts and the token contracts they reference.
///
/// Every method is one logical contract read. Implementations own transport,
/// timeouts and retries; the engine only decides what a failure degrades to.
pub trait RaffleQuery {
    fn name(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<String>> + Send;
    fn creator(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<Pubkey>> + Send;
    fn start_time(&self, raffle: &Pubkey)
        -> impl Future<Output = QueryResult<UnixTimestamp>> + Send;
    fn duration(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send;
    fn ticket_price(&self, raffle: &Pubkey)
        -> impl Future<Output = QueryResult<TokenAmount>> + Send;
    fn ticket_limit(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send;
    /// Bounded participant count; never probed index by index
    fn tickets_sold(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send;
    fn winners_count(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u64>> + Send;
    fn max_tickets_per_participant(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<u64>> + Send;
    fn is_prized(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<bool>> + Send;
    fn prize_collection(&self, raffle: &Pubkey)
        -> impl Future<Output = QueryResult<Pubkey>> + Send;
    fn prize_token_id(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u128>> + Send;
    fn standard_tag(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u8>> + Send;
    fn status_code(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<u8>> + Send;
    fn fungible_prize_token(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send;
    fn fungible_prize_amount(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send;
    fn native_prize_amount(
        &self,
        raffle: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send;
    fn uses_custom_price(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<bool>> + Send;
    fn is_escrowed_prize(&self, raffle: &Pubkey) -> impl Future<Output = QueryResult<bool>> + Send;

    fn winner_at_index(
        &self,
        raffle: &Pubkey,
        index: u64,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send;
    fn win_count_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<u64>> + Send;
    fn prize_claimed_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<bool>> + Send;
    fn tickets_purchased_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<u64>> + Send;
    fn refundable_amount_of(
        &self,
        raffle: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send;

    /// Fungible allowance granted by `owner` to `spender`
    fn allowance(
        &self,
        token: &Pubkey,
        owner: &Pubkey,
        spender: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send;
    /// Address approved for one specific unique token
    fn approved_for_token(
        &self,
        collection: &Pubkey,
        token_id: u128,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send;
    /// Blanket operator approval on a collection
    fn is_approved_for_all(
        &self,
        collection: &Pubkey,
        owner: &Pubkey,
        operator: &Pubkey,
    ) -> impl Future<Output = QueryResult<bool>> + Send;
    fn native_balance(&self, holder: &Pubkey)
        -> impl Future<Output = QueryResult<TokenAmount>> + Send;
    fn fungible_balance(
        &self,
        token: &Pubkey,
        holder: &Pubkey,
    ) -> impl Future<Output = QueryResult<TokenAmount>> + Send;
    fn owner_of(
        &self,
        collection: &Pubkey,
        token_id: u128,
    ) -> impl Future<Output = QueryResult<Pubkey>> + Send;
    fn multi_unit_balance(
        &self,
        collection: &Pubkey,
        holder: &Pubkey,
        token_id: u128,
    ) -> impl Future<Output = QueryResult<u64>> + Send;
    fn token_symbol(&self, token: &Pubkey) -> impl Future<Output = QueryResult<String>> + Send;
}

/// Identifier of a confirmed write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub signature: String,
}

/// Broadcasts write intents; signing and confirmation happen behind this trait
pub trait RaffleWriter {
    fn submit(
        &self,
        target: &Pubkey,
        instruction: &RaffleInstruction,
    ) -> impl Future<Output = Result<Receipt, WriteFailure>> + Send;
}

/// Keep a successful read, or log the failure and fall back to `default`
pub(crate) fn or_default<T>(field: &str, result: QueryResult<T>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(field, error = %err, "read failed, using default");
            default
        }
    }
}

/// Read every snapshot field of `raffle` concurrently.
///
/// Each field degrades on its own: a failed read becomes zero, the null
/// address, an unreadable code or `None`, and the rest of the snapshot is kept.
pub async fn load_snapshot<Q: RaffleQuery>(query: &Q, raffle: &Pubkey) -> RaffleSnapshot {
    let (
        name,
        creator,
        start_time,
        duration,
        ticket_price,
        ticket_limit,
        tickets_sold,
        winners_count,
        max_tickets_per_participant,
        is_prized,
        prize_collection,
        prize_token_id,
        standard_tag,
        status_code,
        fungible_prize_token,
        fungible_prize_amount,
        native_prize_amount,
        uses_custom_price,
        is_escrowed_prize,
    ) = tokio::join!(
        query.name(raffle),
        query.creator(raffle),
        query.start_time(raffle),
        query.duration(raffle),
        query.ticket_price(raffle),
        query.ticket_limit(raffle),
        query.tickets_sold(raffle),
        query.winners_count(raffle),
        query.max_tickets_per_participant(raffle),
        query.is_prized(raffle),
        query.prize_collection(raffle),
        query.prize_token_id(raffle),
        query.standard_tag(raffle),
        query.status_code(raffle),
        query.fungible_prize_token(raffle),
        query.fungible_prize_amount(raffle),
        query.native_prize_amount(raffle),
        query.uses_custom_price(raffle),
        query.is_escrowed_prize(raffle),
    );

    let uses_custom_price = match uses_custom_price {
        Ok(flag) => Some(flag),
        Err(err) => {
            tracing::warn!(field = "usesCustomPrice", error = %err, "read failed");
            None
        }
    };

    RaffleSnapshot {
        address: *raffle,
        name: or_default("name", name, String::new()),
        creator: or_default("creator", creator, Pubkey::default()),
        start_time: or_default("startTime", start_time, 0),
        duration: or_default("duration", duration, 0),
        ticket_price: or_default("ticketPrice", ticket_price, TokenAmount::ZERO),
        ticket_limit: or_default("ticketLimit", ticket_limit, 0),
        tickets_sold: or_default("ticketsSold", tickets_sold, 0),
        winners_count: or_default("winnersCount", winners_count, 0),
        max_tickets_per_participant: or_default(
            "maxTicketsPerParticipant",
            max_tickets_per_participant,
            0,
        ),
        status_code: or_default("statusCode", status_code, UNREADABLE_CODE),
        is_prized: or_default("isPrized", is_prized, false),
        native_prize_amount: or_default("nativePrizeAmount", native_prize_amount, TokenAmount::ZERO),
        fungible_prize_token: or_default("fungiblePrizeToken", fungible_prize_token, Pubkey::default()),
        fungible_prize_amount: or_default(
            "fungiblePrizeAmount",
            fungible_prize_amount,
            TokenAmount::ZERO,
        ),
        prize_collection: or_default("prizeCollection", prize_collection, Pubkey::default()),
        prize_token_id: or_default("prizeTokenId", prize_token_id, 0),
        standard_tag: or_default("standardTag", standard_tag, UNREADABLE_CODE),
        uses_custom_price,
        is_escrowed_prize: or_default("isEscrowedPrize", is_escrowed_prize, false),
    }
}
