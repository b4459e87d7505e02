//! Stored shape of the currency record.
//!
//! Decimals are written as strings so the document survives a round trip
//! without float drift.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use pxl_core::currency::{
    CurrencyData, DiscountSchedule, MarketData, MarketDataUpdate, NewCurrencyData,
    PurchaseDiscount, RatePoint, Tier, TierMultipliers, Trend,
};
use pxl_core::errors::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePointDB {
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataDB {
    pub trend: Trend,
    pub hourly_rates: Vec<RatePointDB>,
    pub daily_rates: Vec<RatePointDB>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDiscountDB {
    #[serde(with = "rust_decimal::serde::str")]
    pub threshold_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percent: Decimal,
}

/// Body of the `pxl_currency/current` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyDocumentDB {
    #[serde(with = "rust_decimal::serde::str")]
    pub current_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_rate: Decimal,
    pub market_data: MarketDataDB,
    pub tier_multipliers: BTreeMap<Tier, String>,
    pub purchase_discounts: Vec<PurchaseDiscountDB>,
}

impl From<&RatePoint> for RatePointDB {
    fn from(point: &RatePoint) -> Self {
        RatePointDB {
            rate: point.rate,
            timestamp: point.timestamp,
        }
    }
}

impl From<RatePointDB> for RatePoint {
    fn from(point: RatePointDB) -> Self {
        RatePoint::new(point.rate, point.timestamp)
    }
}

impl From<&MarketData> for MarketDataDB {
    fn from(market: &MarketData) -> Self {
        MarketDataDB {
            trend: market.trend,
            hourly_rates: market.hourly_rates.iter().map(RatePointDB::from).collect(),
            daily_rates: market.daily_rates.iter().map(RatePointDB::from).collect(),
        }
    }
}

impl From<MarketDataDB> for MarketData {
    fn from(market: MarketDataDB) -> Self {
        MarketData {
            trend: market.trend,
            hourly_rates: market.hourly_rates.into_iter().map(RatePoint::from).collect(),
            daily_rates: market.daily_rates.into_iter().map(RatePoint::from).collect(),
        }
    }
}

impl From<&NewCurrencyData> for CurrencyDocumentDB {
    fn from(seed: &NewCurrencyData) -> Self {
        CurrencyDocumentDB {
            current_rate: seed.current_rate,
            base_rate: seed.base_rate,
            market_data: MarketDataDB::from(&seed.market_data),
            tier_multipliers: seed
                .tier_multipliers
                .iter()
                .map(|(tier, multiplier)| (tier, multiplier.to_string()))
                .collect(),
            purchase_discounts: seed
                .purchase_discounts
                .as_slice()
                .iter()
                .map(|d| PurchaseDiscountDB {
                    threshold_amount: d.threshold_amount,
                    discount_percent: d.discount_percent,
                })
                .collect(),
        }
    }
}

impl CurrencyDocumentDB {
    /// Rebuilds the domain record, re-checking tier and discount invariants.
    pub fn into_domain(self, last_updated: DateTime<Utc>) -> Result<CurrencyData> {
        let multipliers = self
            .tier_multipliers
            .into_iter()
            .map(|(tier, value)| {
                Decimal::from_str(&value)
                    .map(|multiplier| (tier, multiplier))
                    .map_err(ValidationError::from)
            })
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        let discounts = self
            .purchase_discounts
            .into_iter()
            .map(|d| PurchaseDiscount::new(d.threshold_amount, d.discount_percent))
            .collect();

        Ok(CurrencyData {
            current_rate: self.current_rate,
            base_rate: self.base_rate,
            last_updated,
            market_data: self.market_data.into(),
            tier_multipliers: TierMultipliers::new(multipliers)?,
            purchase_discounts: DiscountSchedule::new(discounts)?,
        })
    }

    /// Merge patch for the rate update path. Tiers and discounts are left out
    /// so they stay as stored.
    pub fn market_patch(update: &MarketDataUpdate) -> Result<Value> {
        let market = serde_json::to_value(MarketDataDB::from(&update.market_data))
            .map_err(|e| ValidationError::InvalidInput(e.to_string()))?;
        Ok(json!({
            "currentRate": update.current_rate.to_string(),
            "marketData": market,
        }))
    }
}
