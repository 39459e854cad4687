// Raffle Entitlement Engine - Dashboard catalog
use solana_program::clock::UnixTimestamp;

use crate::lifecycle::{self, LifecyclePhase};
use crate::view::RaffleView;

/// Raffles grouped by resolved phase for listing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub pending: Vec<RaffleView>,
    pub active: Vec<RaffleView>,
    /// Closed for sales (by contract or by time), waiting for a draw
    pub ended: Vec<RaffleView>,
    pub drawing: Vec<RaffleView>,
    /// Completed or all prizes claimed
    pub completed: Vec<RaffleView>,
    /// Deleted, failed activation or unengaged
    pub closed: Vec<RaffleView>,
}

impl Catalog {
    /// Bucket `views` by their phase at `now`. Unknown statuses are left out.
    pub fn build(views: impl IntoIterator<Item = RaffleView>, now: UnixTimestamp) -> Self {
        let mut catalog = Catalog::default();
        for view in views {
            let view = view.at(now);
            let bucket = match view.phase {
                LifecyclePhase::Pending => &mut catalog.pending,
                LifecyclePhase::Active => &mut catalog.active,
                LifecyclePhase::EndedByTime | LifecyclePhase::Ended => &mut catalog.ended,
                LifecyclePhase::Drawing => &mut catalog.drawing,
                LifecyclePhase::Completed | LifecyclePhase::AllPrizesClaimed => {
                    &mut catalog.completed
                }
                LifecyclePhase::Deleted
                | LifecyclePhase::ActivationFailed
                | LifecyclePhase::Unengaged => &mut catalog.closed,
                LifecyclePhase::Unknown => continue,
            };
            bucket.push(view);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.pending.len()
            + self.active.len()
            + self.ended.len()
            + self.drawing.len()
            + self.completed.len()
            + self.closed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pending or Active raffles whose sale window is still running at `now`
pub fn open_raffles<'a>(
    views: impl IntoIterator<Item = &'a RaffleView>,
    now: UnixTimestamp,
) -> Vec<&'a RaffleView> {
    views
        .into_iter()
        .filter(|view| {
            matches!(
                lifecycle::resolve(&view.snapshot, now),
                LifecyclePhase::Pending | LifecyclePhase::Active
            )
        })
        .collect()
}
