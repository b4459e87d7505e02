use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency_model::{
    CurrencyData, CurrentRate, InitializationOutcome, MarketDataUpdate, NewCurrencyData,
    RateHistory, RatePeriod, ServiceStatus, Tier,
};
use super::pricing::PriceQuote;
use crate::errors::Result;

/// Trait defining the contract for the currency record store.
///
/// The store holds exactly one record and stamps `last_updated` on every write.
#[async_trait]
pub trait CurrencyRepositoryTrait: Send + Sync {
    /// Reads the record, `None` if it was never created.
    fn get_currency_data(&self) -> Result<Option<CurrencyData>>;

    /// Creates the record from `seed` unless one exists, atomically.
    ///
    /// Returns the stored record and whether this call created it.
    async fn create_currency_data_if_absent(
        &self,
        seed: NewCurrencyData,
    ) -> Result<(CurrencyData, bool)>;

    /// Merges the rate and market data into the existing record.
    async fn update_market_data(&self, update: MarketDataUpdate) -> Result<CurrencyData>;
}

/// Trait defining the contract for the exchange-rate and tier pricing service.
#[async_trait]
pub trait CurrencyServiceTrait: Send + Sync {
    /// Creates the seed record if absent and loads the record into memory.
    async fn initialize(&self) -> Result<InitializationOutcome>;

    fn status(&self) -> ServiceStatus;

    /// Cached snapshot; fails with `NotInitialized` before `initialize`.
    fn get_current_data(&self) -> Result<Arc<CurrencyData>>;

    fn get_current_rate(&self) -> Result<CurrentRate>;

    fn get_rate_history(&self, period: RatePeriod, limit: Option<usize>) -> Result<RateHistory>;

    fn quote_purchase(&self, amount: Decimal, tier: Tier) -> Result<PriceQuote>;

    /// Appends a rate sample and persists it.
    async fn record_rate(&self, rate: Decimal, at: DateTime<Utc>) -> Result<Arc<CurrencyData>>;

    /// Draws the next rate from the rate model and records it.
    async fn advance_rate(&self) -> Result<Arc<CurrencyData>>;
}
