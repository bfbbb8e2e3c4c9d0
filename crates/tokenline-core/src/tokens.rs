//! Token counts and input/output counter pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Represents a count of tokens.
///
/// Used for cumulative counters, per-event deltas and window totals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a new TokenCount.
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    /// Creates a zero TokenCount.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the raw count.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns true if count is zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Formats the token count for display.
    ///
    /// Uses K/M suffixes for large numbers.
    pub fn format(&self) -> String {
        if self.0 < 1_000 {
            format!("{}", self.0)
        } else if self.0 < 10_000 {
            format!("{:.1}K", self.0 as f64 / 1_000.0)
        } else if self.0 < 1_000_000 {
            format!("{}K", self.0 / 1_000)
        } else {
            format!("{:.1}M", self.0 as f64 / 1_000_000.0)
        }
    }

    /// Saturating addition.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Difference floored at zero.
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for TokenCount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for TokenCount {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl From<u64> for TokenCount {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<u32> for TokenCount {
    fn from(n: u32) -> Self {
        Self(n as u64)
    }
}

impl fmt::Display for TokenCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// An input/output pair of token counters.
///
/// Used both for cumulative totals reported by Claude Code and for the
/// deltas derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenPair {
    pub input: TokenCount,
    pub output: TokenCount,
}

impl TokenPair {
    pub const fn new(input: u64, output: u64) -> Self {
        Self {
            input: TokenCount::new(input),
            output: TokenCount::new(output),
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Per-counter difference against an earlier observation, floored at zero.
    ///
    /// A counter that went backwards contributes nothing rather than a
    /// negative amount.
    pub fn saturating_delta(self, earlier: Self) -> Self {
        Self {
            input: self.input.saturating_sub(earlier.input),
            output: self.output.saturating_sub(earlier.output),
        }
    }

    /// True if either counter is non-zero.
    pub fn has_usage(&self) -> bool {
        !self.input.is_zero() || !self.output.is_zero()
    }

    /// Input plus output.
    pub fn total(&self) -> TokenCount {
        self.input.saturating_add(self.output)
    }
}

impl Add for TokenPair {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input: self.input + other.input,
            output: self.output + other.output,
        }
    }
}

impl AddAssign for TokenPair {
    fn add_assign(&mut self, other: Self) {
        self.input += other.input;
        self.output += other.output;
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in / {} out", self.input, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_count_formatting() {
        assert_eq!(TokenCount::new(500).format(), "500");
        assert_eq!(TokenCount::new(5_000).format(), "5.0K");
        assert_eq!(TokenCount::new(50_000).format(), "50K");
        assert_eq!(TokenCount::new(1_500_000).format(), "1.5M");
    }

    #[test]
    fn test_token_count_saturates() {
        let max = TokenCount::new(u64::MAX);
        assert_eq!((max + TokenCount::new(1)).as_u64(), u64::MAX);
        assert_eq!(TokenCount::new(3).saturating_sub(TokenCount::new(5)), TokenCount::zero());
    }

    #[test]
    fn test_delta_increasing_counters() {
        let earlier = TokenPair::new(100, 50);
        let later = TokenPair::new(150, 80);
        assert_eq!(later.saturating_delta(earlier), TokenPair::new(50, 30));
    }

    #[test]
    fn test_delta_floors_decrease_at_zero() {
        let earlier = TokenPair::new(100, 50);
        let later = TokenPair::new(10, 60);
        let delta = later.saturating_delta(earlier);
        assert_eq!(delta, TokenPair::new(0, 10));
        assert!(delta.has_usage());
        assert!(!TokenPair::new(10, 5).saturating_delta(earlier).has_usage());
    }

    #[test]
    fn test_pair_total() {
        assert_eq!(TokenPair::new(1_000_000, 200_000).total().as_u64(), 1_200_000);
    }
}
