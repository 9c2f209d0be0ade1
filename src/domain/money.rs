use crate::error::{PaymentError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of decimal places every wire format renders.
pub const WIRE_SCALE: u32 = 2;

/// Rounds half-up to two places and pins the scale so `1000` prints as `1000.00`.
pub fn at_wire_scale(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(WIRE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(WIRE_SCALE);
    rounded
}

/// A ledger balance: an account balance or a bank's liquidity position.
///
/// Balances may go negative. Liquidity holds are applied unconditionally and a
/// debtor bank can be driven below zero by a large transfer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(pub Decimal);

/// A non-negative transfer amount.
///
/// Construction rejects negative values, so anything holding an `Amount` can be
/// rendered to either wire format without further checks.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// ISO 20022 rendering: `1000.00`.
    pub fn to_iso_string(&self) -> String {
        at_wire_scale(self.0).to_string()
    }

    /// SWIFT MT rendering: `1000,00`. Comma separator, no grouping.
    pub fn to_mt_string(&self) -> String {
        self.to_iso_string().replace('.', ",")
    }

    /// Parses an MT amount such as `1000,00` or `1000,`.
    pub fn parse_mt(raw: &str) -> Result<Self> {
        let mut normalized = raw.trim().replace(',', ".");
        if normalized.ends_with('.') {
            normalized.pop();
        }
        Self::parse_iso(&normalized)
    }

    /// Parses a dot-separated amount such as `1000.00`.
    pub fn parse_iso(raw: &str) -> Result<Self> {
        let value = Decimal::from_str(raw.trim()).map_err(|e| {
            PaymentError::ValidationError(format!("Invalid amount '{}': {}", raw, e))
        })?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Balance rendered at wire scale for camt.004 balance reports.
    pub fn to_iso_string(&self) -> String {
        at_wire_scale(self.0).to_string()
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Balance {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}
