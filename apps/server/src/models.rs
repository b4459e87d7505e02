//! Wire shapes of the HTTP API.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use pxl_core::currency::{
    CurrentRate, InitializationOutcome, PriceQuote, PurchaseDiscount as CorePurchaseDiscount,
    RateHistory, RatePoint as CoreRatePoint,
};
use pxl_core::payments::{AvailablePaymentMethod, PaymentMethodsQuote};

/// ISO-8601 in UTC with a `Z` suffix, e.g. `2026-10-16T09:00:00.000Z`.
fn iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDiscount {
    pub threshold_amount: Decimal,
    pub discount_percent: Decimal,
}

impl From<&CorePurchaseDiscount> for PurchaseDiscount {
    fn from(d: &CorePurchaseDiscount) -> Self {
        Self {
            threshold_amount: d.threshold_amount,
            discount_percent: d.discount_percent,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRateResponse {
    pub rate: Decimal,
    pub base_rate: Decimal,
    pub last_updated: String,
    pub trend: String,
    pub change_24h: Decimal,
    pub purchase_discounts: Vec<PurchaseDiscount>,
}

impl From<CurrentRate> for CurrentRateResponse {
    fn from(c: CurrentRate) -> Self {
        Self {
            rate: c.rate,
            base_rate: c.base_rate,
            last_updated: iso8601(c.last_updated),
            trend: c.trend.as_str().to_string(),
            change_24h: c.change_24h,
            purchase_discounts: c.purchase_discounts.iter().map(PurchaseDiscount::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializedData {
    pub current_rate: Decimal,
    pub base_rate: Decimal,
    pub trend: String,
    pub hourly_rates_count: usize,
    pub daily_rates_count: usize,
    pub tiers: Vec<String>,
    pub purchase_discounts: Vec<PurchaseDiscount>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    pub message: String,
    pub data: InitializedData,
}

impl From<InitializationOutcome> for InitializeResponse {
    fn from(outcome: InitializationOutcome) -> Self {
        let data = &outcome.data;
        let message = if outcome.created {
            "PXL currency data initialized successfully"
        } else {
            "PXL currency data already initialized"
        };
        Self {
            message: message.to_string(),
            data: InitializedData {
                current_rate: data.current_rate,
                base_rate: data.base_rate,
                trend: data.market_data.trend.as_str().to_string(),
                hourly_rates_count: data.market_data.hourly_rates.len(),
                daily_rates_count: data.market_data.daily_rates.len(),
                tiers: data
                    .tier_multipliers
                    .tiers()
                    .map(|t| t.as_str().to_string())
                    .collect(),
                purchase_discounts: data
                    .purchase_discounts
                    .as_slice()
                    .iter()
                    .map(PurchaseDiscount::from)
                    .collect(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub initialize: String,
    pub current_rate: String,
    pub rate_history: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializeInfoResponse {
    pub message: String,
    pub endpoints: Endpoints,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RatePoint {
    pub rate: Decimal,
    pub timestamp: String,
}

impl From<&CoreRatePoint> for RatePoint {
    fn from(p: &CoreRatePoint) -> Self {
        Self {
            rate: p.rate,
            timestamp: iso8601(p.timestamp),
        }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct RateHistoryQuery {
    /// `hourly` (default) or `daily`
    pub period: Option<String>,
    /// Number of newest samples to return
    pub limit: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RateHistoryResponse {
    pub period: String,
    pub rates: Vec<RatePoint>,
    pub current_rate: Decimal,
    pub base_rate: Decimal,
    pub trend: String,
    pub change_24h: Decimal,
    pub deviation_percent: Decimal,
}

impl From<RateHistory> for RateHistoryResponse {
    fn from(h: RateHistory) -> Self {
        Self {
            period: h.period.as_str().to_string(),
            rates: h.rates.iter().map(RatePoint::from).collect(),
            current_rate: h.current_rate,
            base_rate: h.base_rate,
            trend: h.trend.as_str().to_string(),
            change_24h: h.change_24h,
            deviation_percent: h.deviation_percent,
        }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    /// Spend in the base currency
    pub amount: Option<String>,
    /// Pricing tier, defaults to `starter`
    pub tier: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub amount: Decimal,
    pub tier: String,
    pub rate: Decimal,
    pub multiplier: Decimal,
    pub discount_percent: Decimal,
    pub pxl_amount: Decimal,
    pub charged_amount: Decimal,
}

impl From<PriceQuote> for QuoteResponse {
    fn from(q: PriceQuote) -> Self {
        Self {
            amount: q.amount,
            tier: q.tier.as_str().to_string(),
            rate: q.rate,
            multiplier: q.multiplier,
            discount_percent: q.discount_percent,
            pxl_amount: q.pxl_amount,
            charged_amount: q.charged_amount,
        }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct PaymentMethodsQuery {
    /// Purchase amount; required
    pub amount: Option<String>,
    /// ISO currency code, defaults to USD
    pub currency: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub fee: Decimal,
    pub total: Decimal,
}

impl From<AvailablePaymentMethod> for PaymentMethod {
    fn from(m: AvailablePaymentMethod) -> Self {
        Self {
            id: m.id,
            name: m.name,
            kind: m.kind.as_str().to_string(),
            fee: m.fee,
            total: m.total,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsResponse {
    pub amount: Decimal,
    pub currency: String,
    pub methods: Vec<PaymentMethod>,
}

impl From<PaymentMethodsQuote> for PaymentMethodsResponse {
    fn from(q: PaymentMethodsQuote) -> Self {
        Self {
            amount: q.amount,
            currency: q.currency,
            methods: q.methods.into_iter().map(PaymentMethod::from).collect(),
        }
    }
}
