// Raffle Entitlement Engine - Utility Functions
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;

/// Integer token amount in the token's smallest unit.
///
/// Comparisons go through `is_zero`/`gt`/`gte` so a missing read (zero) and a
/// real zero can never be confused with "truthy" checks.
#[derive(
    BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct TokenAmount(pub u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn new(raw: u128) -> Self {
        TokenAmount(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn gt(&self, other: TokenAmount) -> bool {
        self.0 > other.0
    }

    pub fn gte(&self, other: TokenAmount) -> bool {
        self.0 >= other.0
    }

    pub fn checked_mul(&self, factor: u64) -> Option<TokenAmount> {
        self.0.checked_mul(factor as u128).map(TokenAmount)
    }

    /// Render with `decimals` fractional digits, trailing zeros trimmed
    pub fn format_units(&self, decimals: u8) -> String {
        format_units(self.0, decimals)
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        TokenAmount(value as u128)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert a smallest-unit amount into a decimal string (e.g. 1.5 for 1_500_000_000_000_000_000 at 18 decimals)
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    // 10^39 overflows u128; no real token uses that many decimals.
    let decimals = decimals.min(38);
    let scale = 10u128.pow(decimals as u32);
    let whole = amount / scale;
    let fraction = amount % scale;
    if fraction == 0 {
        return format!("{}.0", whole);
    }
    let fraction = format!("{:0>width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Countdown text: `1d 2h 3m 4s`, leading zero units omitted
pub fn format_time(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", secs));
    parts.join(" ")
}

/// Duration text without seconds: `1d 2h 3m`, or `0m`
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 || days > 0 {
        parts.push(format!("{}m", minutes));
    }
    if parts.is_empty() {
        return "0m".to_string();
    }
    parts.join(" ")
}

/// Caller's share of all sold tickets, as a percentage with two decimals
pub fn winning_chance(caller_tickets: u64, tickets_sold: u64) -> Option<String> {
    if caller_tickets == 0 || tickets_sold == 0 {
        return None;
    }
    // Basis points, rounded half up.
    let scaled = (caller_tickets as u128 * 100_000 / tickets_sold as u128 + 5) / 10;
    Some(format!("{}.{:02}", scaled / 100, scaled % 100))
}
