//! Monetary amounts and cost checks.
//!
//! Amounts are held as signed minor units (cents, yen, ...) of a single
//! currency. There is no conversion between currencies; costs are only ever
//! compared for currency equality and sign.

use crate::core::{Schedule, ScheduleValue};
use crate::registry_enum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

registry_enum! {
    /// ISO 4217 currencies accepted for registry costs.
    pub enum CurrencyUnit {
        Usd => "USD",
        Eur => "EUR",
        Gbp => "GBP",
        Cad => "CAD",
        Aud => "AUD",
        Jpy => "JPY",
    }
}

impl CurrencyUnit {
    /// Number of minor-unit digits after the decimal point.
    pub fn decimal_places(self) -> u32 {
        match self {
            Self::Jpy => 0,
            _ => 2,
        }
    }

    fn scale(self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

/// Errors from parsing a money amount.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MoneyError {
    #[error("Money amount must look like '<CURRENCY> <amount>', got '{0}'")]
    Malformed(String),

    #[error("Unknown currency '{0}'")]
    UnknownCurrency(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Amount '{amount}' has more decimal places than {currency} allows")]
    TooPrecise {
        currency: CurrencyUnit,
        amount: String,
    },

    #[error("Amount '{0}' is out of range")]
    Overflow(String),
}

/// A signed amount of a single currency.
///
/// # Example
///
/// ```rust
/// use tld_timetable::money::{CurrencyUnit, Money};
///
/// let cost: Money = "USD 42.42".parse().unwrap();
/// assert_eq!(cost, Money::of_minor(CurrencyUnit::Usd, 4242));
/// assert_eq!(cost.to_string(), "USD 42.42");
///
/// let yen = Money::of_major(CurrencyUnit::Jpy, 12345);
/// assert_eq!(yen.to_string(), "JPY 12345");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Money {
    currency: CurrencyUnit,
    minor_units: i64,
}

impl Money {
    pub fn of_minor(currency: CurrencyUnit, minor_units: i64) -> Self {
        Self {
            currency,
            minor_units,
        }
    }

    /// Whole units of the currency; saturates instead of overflowing.
    pub fn of_major(currency: CurrencyUnit, major_units: i64) -> Self {
        Self::of_minor(currency, major_units.saturating_mul(currency.scale()))
    }

    pub fn zero(currency: CurrencyUnit) -> Self {
        Self::of_minor(currency, 0)
    }

    pub fn currency(&self) -> CurrencyUnit {
        self.currency
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn is_negative(&self) -> bool {
        self.minor_units < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency.decimal_places() as usize;
        let scale = self.currency.scale().unsigned_abs();
        let abs = self.minor_units.unsigned_abs();
        let sign = if self.is_negative() { "-" } else { "" };

        if places == 0 {
            write!(f, "{} {sign}{abs}", self.currency)
        } else {
            write!(
                f,
                "{} {sign}{}.{:0places$}",
                self.currency,
                abs / scale,
                abs % scale
            )
        }
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(code), Some(amount), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(MoneyError::Malformed(s.to_string()));
        };

        let currency = code
            .parse::<CurrencyUnit>()
            .map_err(|_| MoneyError::UnknownCurrency(code.to_string()))?;

        let (negative, digits) = match amount.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, amount),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        let is_numeric = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !is_numeric(whole) || !is_numeric(fraction) {
            return Err(MoneyError::InvalidAmount(amount.to_string()));
        }

        let places = currency.decimal_places();
        if fraction.len() > places as usize {
            return Err(MoneyError::TooPrecise {
                currency,
                amount: amount.to_string(),
            });
        }

        let overflow = || MoneyError::Overflow(amount.to_string());
        let whole: i64 = whole.parse().map_err(|_| overflow())?;
        let fraction_value: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| overflow())?
        };
        let padding = 10_i64.pow(places - fraction.len() as u32);

        let minor = whole
            .checked_mul(currency.scale())
            .and_then(|w| w.checked_add(fraction_value * padding))
            .ok_or_else(overflow)?;

        Ok(Self::of_minor(currency, if negative { -minor } else { minor }))
    }
}

impl ScheduleValue for Money {
    /// Lookups across a currency change would be meaningless.
    fn compatible_with(&self, other: &Self) -> bool {
        self.currency == other.currency
    }
}

/// Errors from checking a cost against its TLD.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CostError {
    #[error("All costs must be in the TLD's currency {expected}, found {found}")]
    CurrencyMismatch {
        expected: CurrencyUnit,
        found: CurrencyUnit,
    },

    #[error("Cost cannot be negative: {amount}")]
    NegativeCost { amount: Money },
}

/// Check a single cost: right currency, not negative.
pub fn check_cost(cost: &Money, currency: CurrencyUnit) -> Result<(), CostError> {
    if cost.currency() != currency {
        return Err(CostError::CurrencyMismatch {
            expected: currency,
            found: cost.currency(),
        });
    }
    if cost.is_negative() {
        return Err(CostError::NegativeCost { amount: *cost });
    }
    Ok(())
}

/// Check every transition of a cost schedule against the TLD's currency.
///
/// A schedule already holds a single currency, so this only has to compare
/// that currency with the TLD's and reject negative amounts.
pub fn check_cost_schedule(
    schedule: &Schedule<Money>,
    currency: CurrencyUnit,
) -> Result<(), CostError> {
    schedule.values().try_for_each(|cost| check_cost(cost, currency))
}
