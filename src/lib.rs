// Raffle Entitlement Engine
// Client-side lifecycle resolution and action entitlements for on-chain raffles

// Core modules
pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod utils;

// Raffle view
pub mod lifecycle;
pub mod prize;
pub mod view;

// Entitlements
pub mod approval;
pub mod entitlement;
pub mod refund;
pub mod winners;

// Chain access and sessions
pub mod cache;
pub mod catalog;
pub mod query;
pub mod session;

pub use entitlement::{evaluate, Action, ActionSet, ClaimFacts};
pub use error::{QueryError, QueryResult, RaffleError, WriteFailure};
pub use instruction::RaffleInstruction;
pub use lifecycle::{resolve, LifecyclePhase, RaffleStatus};
pub use prize::{classify, PrizeKind};
pub use processor::Processor;
pub use query::{load_snapshot, RaffleQuery, RaffleWriter, Receipt};
pub use session::RaffleSession;
pub use state::{Caller, Config, RaffleSnapshot, Role};
pub use utils::TokenAmount;
pub use view::RaffleView;
