//! Money value object for the session cost segment.

use std::fmt;

/// Represents a monetary amount in USD.
///
/// Internally stored as microdollars (millionths of a dollar) for precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in microdollars (1 USD = 1,000,000 microdollars)
    microdollars: i64,
}

impl Money {
    /// One dollar in microdollars.
    const MICRODOLLARS_PER_DOLLAR: i64 = 1_000_000;

    /// Creates Money from a USD dollar amount.
    ///
    /// Non-finite or negative inputs collapse to zero.
    pub fn from_usd(dollars: f64) -> Self {
        if !dollars.is_finite() || dollars <= 0.0 {
            return Self::zero();
        }
        let microdollars = (dollars * Self::MICRODOLLARS_PER_DOLLAR as f64).round() as i64;
        Self { microdollars }
    }

    /// Creates a zero Money value.
    pub const fn zero() -> Self {
        Self { microdollars: 0 }
    }

    /// Returns the amount in USD as a float.
    pub fn as_usd(&self) -> f64 {
        self.microdollars as f64 / Self::MICRODOLLARS_PER_DOLLAR as f64
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.microdollars == 0
    }

    /// Formats the amount for display.
    ///
    /// Returns format like "$0.35", "$1.50", "$12.3"
    pub fn format(&self) -> String {
        let dollars = self.as_usd();
        if dollars < 0.01 && dollars > 0.0 {
            format!("${dollars:.4}")
        } else if dollars < 10.0 {
            format!("${dollars:.2}")
        } else if dollars < 100.0 {
            format!("${dollars:.1}")
        } else {
            format!("${dollars:.0}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}
