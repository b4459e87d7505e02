use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::currency_errors::CurrencyError;

/// Customer pricing segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Starter,
    Rising,
    Pro,
    Pixlbeast,
    Pixlionaire,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Starter,
        Tier::Rising,
        Tier::Pro,
        Tier::Pixlbeast,
        Tier::Pixlionaire,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Starter => "starter",
            Tier::Rising => "rising",
            Tier::Pro => "pro",
            Tier::Pixlbeast => "pixlbeast",
            Tier::Pixlionaire => "pixlionaire",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CurrencyError::UnknownTier(s.to_string()))
    }
}

/// Direction of recent rate movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// One sample of the exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePoint {
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl RatePoint {
    pub fn new(rate: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self { rate, timestamp }
    }
}

/// Pricing multiplier for every tier.
///
/// Construction fails unless all five tiers carry a positive multiplier, so
/// lookups never miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Tier, Decimal>",
    into = "BTreeMap<Tier, Decimal>"
)]
pub struct TierMultipliers(BTreeMap<Tier, Decimal>);

impl TierMultipliers {
    pub fn new(multipliers: BTreeMap<Tier, Decimal>) -> Result<Self, CurrencyError> {
        for tier in Tier::ALL {
            match multipliers.get(&tier) {
                None => {
                    return Err(CurrencyError::InvalidData(format!(
                        "missing multiplier for tier '{}'",
                        tier
                    )))
                }
                Some(m) if *m <= Decimal::ZERO => {
                    return Err(CurrencyError::InvalidData(format!(
                        "multiplier for tier '{}' must be positive, got {}",
                        tier, m
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(Self(multipliers))
    }

    pub fn multiplier(&self, tier: Tier) -> Decimal {
        // Present by construction.
        self.0.get(&tier).copied().unwrap_or(Decimal::ONE)
    }

    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, Decimal)> + '_ {
        self.0.iter().map(|(tier, m)| (*tier, *m))
    }
}

impl Default for TierMultipliers {
    fn default() -> Self {
        Self(BTreeMap::from([
            (Tier::Starter, dec!(1.00)),
            (Tier::Rising, dec!(1.05)),
            (Tier::Pro, dec!(1.10)),
            (Tier::Pixlbeast, dec!(1.20)),
            (Tier::Pixlionaire, dec!(1.30)),
        ]))
    }
}

impl TryFrom<BTreeMap<Tier, Decimal>> for TierMultipliers {
    type Error = CurrencyError;

    fn try_from(value: BTreeMap<Tier, Decimal>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TierMultipliers> for BTreeMap<Tier, Decimal> {
    fn from(value: TierMultipliers) -> Self {
        value.0
    }
}

/// Volume-discount breakpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDiscount {
    pub threshold_amount: Decimal,
    pub discount_percent: Decimal,
}

impl PurchaseDiscount {
    pub fn new(threshold_amount: Decimal, discount_percent: Decimal) -> Self {
        Self {
            threshold_amount,
            discount_percent,
        }
    }
}

/// Ordered discount breakpoints with strictly increasing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PurchaseDiscount>", into = "Vec<PurchaseDiscount>")]
pub struct DiscountSchedule(Vec<PurchaseDiscount>);

impl DiscountSchedule {
    pub fn new(discounts: Vec<PurchaseDiscount>) -> Result<Self, CurrencyError> {
        let mut previous: Option<Decimal> = None;
        for discount in &discounts {
            if discount.threshold_amount < Decimal::ZERO {
                return Err(CurrencyError::InvalidData(format!(
                    "discount threshold must not be negative, got {}",
                    discount.threshold_amount
                )));
            }
            if discount.discount_percent < Decimal::ZERO
                || discount.discount_percent >= Decimal::ONE_HUNDRED
            {
                return Err(CurrencyError::InvalidData(format!(
                    "discount percent must be in [0, 100), got {}",
                    discount.discount_percent
                )));
            }
            if let Some(prev) = previous {
                if discount.threshold_amount <= prev {
                    return Err(CurrencyError::InvalidData(format!(
                        "discount thresholds must be strictly increasing ({} after {})",
                        discount.threshold_amount, prev
                    )));
                }
            }
            previous = Some(discount.threshold_amount);
        }
        Ok(Self(discounts))
    }

    /// Percent off for a spend of `amount`: the highest breakpoint not above it.
    pub fn discount_for(&self, amount: Decimal) -> Decimal {
        self.0
            .iter()
            .rev()
            .find(|d| d.threshold_amount <= amount)
            .map(|d| d.discount_percent)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn as_slice(&self) -> &[PurchaseDiscount] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DiscountSchedule {
    fn default() -> Self {
        Self(vec![
            PurchaseDiscount::new(dec!(10), dec!(2)),
            PurchaseDiscount::new(dec!(25), dec!(5)),
            PurchaseDiscount::new(dec!(50), dec!(8)),
            PurchaseDiscount::new(dec!(100), dec!(12)),
        ])
    }
}

impl TryFrom<Vec<PurchaseDiscount>> for DiscountSchedule {
    type Error = CurrencyError;

    fn try_from(value: Vec<PurchaseDiscount>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountSchedule> for Vec<PurchaseDiscount> {
    fn from(value: DiscountSchedule) -> Self {
        value.0
    }
}

/// Rate history and trend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub trend: Trend,
    pub hourly_rates: Vec<RatePoint>,
    pub daily_rates: Vec<RatePoint>,
}

impl MarketData {
    pub fn validate(&self) -> Result<(), CurrencyError> {
        validate_series("hourlyRates", &self.hourly_rates)?;
        validate_series("dailyRates", &self.daily_rates)
    }
}

fn validate_series(name: &str, series: &[RatePoint]) -> Result<(), CurrencyError> {
    if let Some(point) = series.iter().find(|p| p.rate <= Decimal::ZERO) {
        return Err(CurrencyError::InvalidData(format!(
            "{} contains a non-positive rate {} at {}",
            name, point.rate, point.timestamp
        )));
    }
    if series
        .windows(2)
        .any(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(CurrencyError::InvalidData(format!(
            "{} timestamps must be non-decreasing",
            name
        )));
    }
    Ok(())
}

fn validate_rates(current_rate: Decimal, base_rate: Decimal) -> Result<(), CurrencyError> {
    if current_rate <= Decimal::ZERO {
        return Err(CurrencyError::InvalidData(format!(
            "currentRate must be positive, got {}",
            current_rate
        )));
    }
    if base_rate <= Decimal::ZERO {
        return Err(CurrencyError::InvalidData(format!(
            "baseRate must be positive, got {}",
            base_rate
        )));
    }
    Ok(())
}

/// The persisted PXL currency record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyData {
    pub current_rate: Decimal,
    pub base_rate: Decimal,
    /// Stamped by the store on every write.
    pub last_updated: DateTime<Utc>,
    pub market_data: MarketData,
    pub tier_multipliers: TierMultipliers,
    pub purchase_discounts: DiscountSchedule,
}

impl CurrencyData {
    pub fn validate(&self) -> Result<(), CurrencyError> {
        validate_rates(self.current_rate, self.base_rate)?;
        self.market_data.validate()
    }
}

/// A currency record before the store has stamped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrencyData {
    pub current_rate: Decimal,
    pub base_rate: Decimal,
    pub market_data: MarketData,
    pub tier_multipliers: TierMultipliers,
    pub purchase_discounts: DiscountSchedule,
}

impl NewCurrencyData {
    /// First-time record: one hourly and one daily sample at `rate`.
    pub fn seed(rate: Decimal, now: DateTime<Utc>) -> Result<Self, CurrencyError> {
        let seed = Self {
            current_rate: rate,
            base_rate: rate,
            market_data: MarketData {
                trend: Trend::Stable,
                hourly_rates: vec![RatePoint::new(rate, now)],
                daily_rates: vec![RatePoint::new(rate, now)],
            },
            tier_multipliers: TierMultipliers::default(),
            purchase_discounts: DiscountSchedule::default(),
        };
        seed.validate()?;
        Ok(seed)
    }

    pub fn validate(&self) -> Result<(), CurrencyError> {
        validate_rates(self.current_rate, self.base_rate)?;
        self.market_data.validate()
    }

    pub fn into_currency_data(self, last_updated: DateTime<Utc>) -> CurrencyData {
        CurrencyData {
            current_rate: self.current_rate,
            base_rate: self.base_rate,
            last_updated,
            market_data: self.market_data,
            tier_multipliers: self.tier_multipliers,
            purchase_discounts: self.purchase_discounts,
        }
    }
}

/// Partial write produced by the rate update path. Tiers and discounts are
/// left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataUpdate {
    pub current_rate: Decimal,
    pub market_data: MarketData,
}

/// Granularity of a rate history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePeriod {
    #[default]
    Hourly,
    Daily,
}

impl RatePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatePeriod::Hourly => "hourly",
            RatePeriod::Daily => "daily",
        }
    }
}

impl FromStr for RatePeriod {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(RatePeriod::Hourly),
            "daily" => Ok(RatePeriod::Daily),
            other => Err(CurrencyError::InvalidData(format!(
                "unknown rate period '{}', expected 'hourly' or 'daily'",
                other
            ))),
        }
    }
}

/// Assembled answer to a current-rate query.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentRate {
    pub rate: Decimal,
    pub base_rate: Decimal,
    pub last_updated: DateTime<Utc>,
    pub trend: Trend,
    pub change_24h: Decimal,
    pub purchase_discounts: Vec<PurchaseDiscount>,
}

/// Assembled answer to a rate history query.
#[derive(Debug, Clone, PartialEq)]
pub struct RateHistory {
    pub period: RatePeriod,
    pub rates: Vec<RatePoint>,
    pub current_rate: Decimal,
    pub base_rate: Decimal,
    pub trend: Trend,
    pub change_24h: Decimal,
    pub deviation_percent: Decimal,
}

/// Result of `initialize`.
#[derive(Debug, Clone)]
pub struct InitializationOutcome {
    pub data: Arc<CurrencyData>,
    /// True when this call wrote the seed record.
    pub created: bool,
}

/// Lifecycle of the currency service within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Uninitialized,
    Initializing,
    Ready,
}
