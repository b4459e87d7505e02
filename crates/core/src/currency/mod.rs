//! PXL currency module - exchange rate, rate history, tier pricing.
//!
//! - [`currency_model`] - the persisted record and query results
//! - [`currency_traits`] - repository and service contracts
//! - [`currency_service`] - snapshot-caching service with the init state machine
//! - [`rate_history`] - 24h change, trend and retention
//! - [`rate_model`] - rate evolution used by the periodic update job
//! - [`pricing`] - tier multiplier and volume-discount quotes

pub mod currency_errors;
pub mod currency_model;
pub mod currency_service;
pub mod currency_traits;
pub mod pricing;
pub mod rate_history;
pub mod rate_model;

#[cfg(test)]
mod currency_service_tests;

pub use currency_errors::CurrencyError;
pub use currency_model::{
    CurrencyData, CurrentRate, DiscountSchedule, InitializationOutcome, MarketData,
    MarketDataUpdate, NewCurrencyData, PurchaseDiscount, RateHistory, RatePeriod, RatePoint,
    ServiceStatus, Tier, TierMultipliers, Trend,
};
pub use currency_service::CurrencyService;
pub use currency_traits::{CurrencyRepositoryTrait, CurrencyServiceTrait};
pub use pricing::{quote_purchase, PriceQuote};
pub use rate_history::{
    append_sample, classify_trend, compute_change_24h, deviation_percent, RetentionPolicy,
};
pub use rate_model::{draw_standard_normal, MeanReversionModel, RateEvolutionModel};
