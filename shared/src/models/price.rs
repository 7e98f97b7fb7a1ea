//! Price Model
//!
//! Listing prices are denominated in OYD datacoins. Other currencies are only
//! reached through [`ExchangeRates`] at the payment boundary.

use crate::error::{AppError, ErrorCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Payment currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Oyd,
    Eth,
    Usdc,
}

impl Currency {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Oyd => "OYD",
            Self::Eth => "ETH",
            Self::Usdc => "USDC",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Oyd, Self::Eth, Self::Usdc]
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::InvalidPrice, format!("Unknown currency: {s}"))
            })
    }
}

/// An amount in a given currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub unit: Currency,
    pub amount: Decimal,
}

impl Price {
    pub fn new(unit: Currency, amount: Decimal) -> Self {
        Self { unit, amount }
    }

    /// Whole-datacoin OYD price
    pub fn oyd(amount: u64) -> Self {
        Self::new(Currency::Oyd, Decimal::from(amount))
    }

    /// Parse a non-negative decimal amount such as `"0.1"`
    pub fn parse(unit: Currency, raw: &str) -> Result<Self, AppError> {
        let amount = Decimal::from_str(raw.trim()).map_err(|_| {
            AppError::with_message(ErrorCode::InvalidPrice, format!("Invalid {unit} price: {raw}"))
        })?;
        if amount.is_sign_negative() {
            return Err(AppError::with_message(
                ErrorCode::InvalidPrice,
                format!("{unit} price must not be negative"),
            ));
        }
        Ok(Self::new(unit, amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.normalize(), self.unit)
    }
}

/// How a listing price is derived from the stored byte size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// One OYD per started mebibyte
    #[default]
    PerMegabyte,
    /// One OYD per started kibibyte
    PerKilobyte,
}

impl PricePolicy {
    pub fn derive(&self, byte_size: u64) -> Price {
        let unit = match self {
            Self::PerMegabyte => MIB,
            Self::PerKilobyte => KIB,
        };
        Price::oyd(byte_size.div_ceil(unit))
    }
}

/// Units of each target currency per one OYD
#[derive(Debug, Clone, Default)]
pub struct ExchangeRates {
    rates: HashMap<Currency, Decimal>,
}

impl ExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, currency: Currency, per_oyd: Decimal) -> Self {
        self.rates.insert(currency, per_oyd);
        self
    }

    fn per_oyd(&self, currency: Currency) -> Option<Decimal> {
        match currency {
            Currency::Oyd => Some(Decimal::ONE),
            other => self.rates.get(&other).copied(),
        }
    }

    /// Convert `price` into `target`; `None` when a needed rate is missing.
    pub fn convert(&self, price: &Price, target: Currency) -> Option<Price> {
        if price.unit == target {
            return Some(*price);
        }
        let from_rate = self.per_oyd(price.unit)?;
        let to_rate = self.per_oyd(target)?;
        if from_rate.is_zero() {
            return None;
        }
        let in_oyd = price.amount.checked_div(from_rate)?;
        Some(Price::new(target, in_oyd.checked_mul(to_rate)?))
    }
}
