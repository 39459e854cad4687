// Raffle Entitlement Engine - Winner registry
use std::collections::HashMap;

use futures::future::join_all;
use solana_program::pubkey::Pubkey;

use crate::error::{QueryError, QueryResult};
use crate::query::{or_default, RaffleQuery};
use crate::state::Config;

/// One distinct winning address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinnerEntry {
    pub address: Pubkey,
    /// First winner slot the address appeared in
    pub index: u64,
    pub claimed_wins: u64,
    pub prize_claimed: bool,
}

/// Per-winner statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WinnerStats {
    pub tickets_purchased: u64,
    pub tickets_won: u64,
    pub tickets_lost: u64,
    pub prize_claimed: bool,
}

impl WinnerStats {
    pub fn new(tickets_purchased: u64, tickets_won: u64, prize_claimed: bool) -> Self {
        Self {
            tickets_purchased,
            tickets_won,
            tickets_lost: tickets_purchased.saturating_sub(tickets_won),
            prize_claimed,
        }
    }
}

/// Collapse raw winner slots into one entry per address.
///
/// Zero-address slots are skipped. `claimed_wins` starts as the number of
/// slots the address occupies; `WinnerRegistry::load` replaces it with the
/// contract's own tally.
pub fn build_winners(slots: &[Pubkey]) -> Vec<WinnerEntry> {
    let mut entries: Vec<WinnerEntry> = Vec::new();
    let mut positions: HashMap<Pubkey, usize> = HashMap::new();

    for (index, address) in slots.iter().enumerate() {
        if *address == Pubkey::default() {
            continue;
        }
        match positions.get(address) {
            Some(&position) => entries[position].claimed_wins += 1,
            None => {
                positions.insert(*address, entries.len());
                entries.push(WinnerEntry {
                    address: *address,
                    index: index as u64,
                    claimed_wins: 1,
                    prize_claimed: false,
                });
            }
        }
    }

    entries
}

/// Read winner slots `0..min(winners_count, max_winner_slots)` concurrently.
///
/// A failed slot read becomes the null address and is skipped downstream.
pub async fn read_slots<Q: RaffleQuery>(
    query: &Q,
    raffle: &Pubkey,
    winners_count: u64,
    config: &Config,
) -> Vec<Pubkey> {
    let bound = winners_count.min(config.max_winner_slots);
    let reads = (0..bound).map(|index| query.winner_at_index(raffle, index));

    join_all(reads)
        .await
        .into_iter()
        .map(|result| or_default("winnerAtIndex", result, Pubkey::default()))
        .collect()
}

/// Winner list and lazily filled per-address statistics for one snapshot
#[derive(Clone, Debug, Default)]
pub struct WinnerRegistry {
    raffle: Pubkey,
    entries: Vec<WinnerEntry>,
    stats: HashMap<Pubkey, WinnerStats>,
    loaded: bool,
}

impl WinnerRegistry {
    pub fn new(raffle: Pubkey) -> Self {
        Self {
            raffle,
            ..Self::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn entries(&self) -> &[WinnerEntry] {
        &self.entries
    }

    pub fn entry(&self, address: &Pubkey) -> Option<&WinnerEntry> {
        self.entries.iter().find(|entry| entry.address == *address)
    }

    pub fn is_winner(&self, address: &Pubkey) -> bool {
        self.entry(address).is_some()
    }

    /// Cached statistics, if already computed
    pub fn cached_stats(&self, address: &Pubkey) -> Option<WinnerStats> {
        self.stats.get(address).copied()
    }

    /// Read winner slots and each distinct winner's tally and claim flag
    pub async fn load<Q: RaffleQuery>(&mut self, query: &Q, winners_count: u64, config: &Config) {
        let raffle = self.raffle;
        let slots = read_slots(query, &raffle, winners_count, config).await;
        let mut entries = build_winners(&slots);

        let details = join_all(entries.iter().map(move |entry| async move {
            tokio::join!(
                query.win_count_of(&raffle, &entry.address),
                query.prize_claimed_of(&raffle, &entry.address),
            )
        }))
        .await;

        for (entry, (wins, claimed)) in entries.iter_mut().zip(details) {
            entry.claimed_wins = or_default("winCountOf", wins, entry.claimed_wins);
            entry.prize_claimed = or_default("prizeClaimedOf", claimed, false);
        }

        tracing::debug!(
            raffle = %raffle,
            winners = entries.len(),
            slots = slots.len(),
            "winners loaded"
        );
        self.entries = entries;
        self.stats.clear();
        self.loaded = true;
    }

    /// Statistics for one winner, read on first request and cached after.
    /// Failures are not cached.
    pub async fn stats<Q: RaffleQuery>(
        &mut self,
        query: &Q,
        address: &Pubkey,
    ) -> QueryResult<WinnerStats> {
        if let Some(stats) = self.stats.get(address) {
            return Ok(*stats);
        }

        let stats = read_stats(query, &self.raffle, address).await?;
        self.stats.insert(*address, stats);
        Ok(stats)
    }

    /// Statistics for every winner. One address failing leaves the others intact.
    pub async fn stats_for_all<Q: RaffleQuery>(
        &mut self,
        query: &Q,
    ) -> Vec<(Pubkey, QueryResult<WinnerStats>)> {
        let raffle = self.raffle;
        let missing: Vec<Pubkey> = self
            .entries
            .iter()
            .map(|entry| entry.address)
            .filter(|address| !self.stats.contains_key(address))
            .collect();

        let reads = missing
            .iter()
            .map(|address| read_stats(query, &raffle, address));
        for (address, result) in missing.iter().zip(join_all(reads).await) {
            match result {
                Ok(stats) => {
                    self.stats.insert(*address, stats);
                }
                Err(err) => {
                    tracing::warn!(winner = %address, error = %err, "winner statistics unavailable")
                }
            }
        }

        self.entries
            .iter()
            .map(|entry| {
                let result = self
                    .stats
                    .get(&entry.address)
                    .copied()
                    .ok_or_else(|| QueryError::Transport("statistics unavailable".to_string()));
                (entry.address, result)
            })
            .collect()
    }

    /// Drop winners and statistics; the next `load` re-reads everything
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.stats.clear();
        self.loaded = false;
    }
}

async fn read_stats<Q: RaffleQuery>(
    query: &Q,
    raffle: &Pubkey,
    address: &Pubkey,
) -> QueryResult<WinnerStats> {
    let (purchased, won, claimed) = tokio::join!(
        query.tickets_purchased_of(raffle, address),
        query.win_count_of(raffle, address),
        query.prize_claimed_of(raffle, address),
    );
    Ok(WinnerStats::new(
        purchased?,
        won?,
        or_default("prizeClaimedOf", claimed, false),
    ))
}
