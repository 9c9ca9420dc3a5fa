use std::{fmt, str::FromStr};

use crate::{Currency, EngineError};

/// Money amount represented as **whole currency units**.
///
/// Record amounts have no fractional part, so the value is a plain integer.
/// Formatting uses the en-IN digit grouping (last three digits, then pairs).
///
/// # Examples
///
/// ```rust
/// use engine::{Amount, Currency};
///
/// assert_eq!(Amount::new(60_000).format(Currency::Inr), "₹60,000");
/// assert_eq!(Amount::new(1_00_000).format(Currency::Inr), "₹1,00,000");
/// assert_eq!(Amount::new(-5_000).format(Currency::Inr), "-₹5,000");
/// ```
///
/// Parsing from user input (grouping commas and the rupee sign are ignored):
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("60,000".parse::<Amount>().unwrap().units(), 60_000);
/// assert_eq!("₹ 1500".parse::<Amount>().unwrap().units(), 1_500);
/// assert!("12.5".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Returns the raw value in whole units.
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Formats the amount with the currency symbol and grouped digits.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{sign}{}{}",
            currency.symbol(),
            group_digits(self.0.unsigned_abs())
        )
    }
}

/// Groups digits the en-IN way: `1234567` becomes `12,34,567`.
fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{last_three}", groups.join(","))
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Currency::default()))
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a non-negative whole amount.
    ///
    /// Accepts an optional leading currency symbol and `,`/`_` separators.
    /// Rejects empty strings, signs and fractional parts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidRecord("invalid amount".to_string());

        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix(Currency::Inr.symbol())
            .unwrap_or(trimmed)
            .trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidRecord("empty amount".to_string()));
        }

        let digits: String = trimmed.chars().filter(|c| *c != ',' && *c != '_').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        digits
            .parse::<i64>()
            .map(Amount)
            .map_err(|_| EngineError::InvalidRecord("amount too large".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_groups_en_in() {
        assert_eq!(Amount::new(0).format(Currency::Inr), "₹0");
        assert_eq!(Amount::new(999).format(Currency::Inr), "₹999");
        assert_eq!(Amount::new(5_000).format(Currency::Inr), "₹5,000");
        assert_eq!(Amount::new(41_000).format(Currency::Inr), "₹41,000");
        assert_eq!(Amount::new(1_00_000).format(Currency::Inr), "₹1,00,000");
        assert_eq!(Amount::new(12_34_567).format(Currency::Inr), "₹12,34,567");
        assert_eq!(Amount::new(-15_000).format(Currency::Inr), "-₹15,000");
    }

    #[test]
    fn parse_ignores_separators_and_symbol() {
        assert_eq!("60000".parse::<Amount>().unwrap().units(), 60_000);
        assert_eq!("60,000".parse::<Amount>().unwrap().units(), 60_000);
        assert_eq!(" ₹1,00,000 ".parse::<Amount>().unwrap().units(), 100_000);
    }

    #[test]
    fn parse_rejects_signs_fractions_and_garbage() {
        assert!("".parse::<Amount>().is_err());
        assert!("₹".parse::<Amount>().is_err());
        assert!("-10".parse::<Amount>().is_err());
        assert!("10.50".parse::<Amount>().is_err());
        assert!("ten".parse::<Amount>().is_err());
    }
}
