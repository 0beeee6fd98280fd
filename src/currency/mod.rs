use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn minor_units(&self) -> u32 {
        minor_units_for(self.as_str())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("TWD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Foreign currency → rate-to-base. One hop only.
pub type RateTable = BTreeMap<CurrencyCode, Decimal>;

/// Converts `amount` into the `base` currency using the one-hop rate table.
///
/// Amounts already in the base currency pass through untouched; a foreign currency
/// without a registered rate is rejected rather than guessed.
pub fn normalize(
    amount: Decimal,
    currency: &CurrencyCode,
    rates: &RateTable,
    base: &CurrencyCode,
) -> Result<Decimal> {
    if currency == base {
        return Ok(amount);
    }
    rates
        .get(currency)
        .map(|rate| amount * rate)
        .ok_or_else(|| LedgerError::UnknownCurrency(currency.to_string()))
}

pub fn minor_units_for(code: &str) -> u32 {
    match code {
        "JPY" | "KRW" | "VND" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Rounds half away from zero to the currency's minor unit.
pub fn round_to_minor(amount: Decimal, code: &CurrencyCode) -> Decimal {
    amount.round_dp_with_strategy(code.minor_units(), RoundingStrategy::MidpointAwayFromZero)
}

pub fn floor_to_minor(amount: Decimal, code: &CurrencyCode) -> Decimal {
    amount.round_dp_with_strategy(code.minor_units(), RoundingStrategy::ToNegativeInfinity)
}

/// Renders an amount with exactly the currency's minor-unit precision.
pub fn format_amount(amount: Decimal, code: &CurrencyCode) -> String {
    let mut value = round_to_minor(amount, code);
    value.rescale(code.minor_units());
    value.to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateFormatStyle {
    #[default]
    Short,
    Medium,
    Long,
    Us,
}

pub fn format_date(style: DateFormatStyle, date: NaiveDate) -> String {
    match style {
        DateFormatStyle::Short => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::Medium => format!(
            "{:02} {} {}",
            date.day(),
            month_label(date.month()),
            date.year()
        ),
        DateFormatStyle::Long => format!(
            "{} {} {}, {}",
            date.weekday(),
            month_label(date.month()),
            date.day(),
            date.year()
        ),
        DateFormatStyle::Us => date.format("%m/%d/%Y").to_string(),
    }
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}
