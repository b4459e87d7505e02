use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::currency_errors::CurrencyError;
use super::currency_model::{
    CurrencyData, CurrentRate, InitializationOutcome, MarketDataUpdate, NewCurrencyData,
    RateHistory, RatePeriod, ServiceStatus, Tier,
};
use super::currency_traits::{CurrencyRepositoryTrait, CurrencyServiceTrait};
use super::pricing::{self, PriceQuote};
use super::rate_history::{append_sample, compute_change_24h, deviation_percent, RetentionPolicy};
use super::rate_model::{draw_standard_normal, MeanReversionModel, RateEvolutionModel};
use crate::errors::{Result, ValidationError};

enum ServiceState {
    Uninitialized,
    Initializing,
    Ready(Arc<CurrencyData>),
}

impl ServiceState {
    fn status(&self) -> ServiceStatus {
        match self {
            ServiceState::Uninitialized => ServiceStatus::Uninitialized,
            ServiceState::Initializing => ServiceStatus::Initializing,
            ServiceState::Ready(_) => ServiceStatus::Ready,
        }
    }
}

/// Exchange-rate and tier pricing service.
///
/// Holds one immutable snapshot of the currency record. Writers build a new
/// record and swap the snapshot; readers clone the `Arc`.
pub struct CurrencyService {
    repository: Arc<dyn CurrencyRepositoryTrait>,
    seed_rate: Decimal,
    retention: RetentionPolicy,
    rate_model: Arc<dyn RateEvolutionModel>,
    state: RwLock<ServiceState>,
    // Serializes initialize and rate writes within this process.
    write_lock: Mutex<()>,
}

impl CurrencyService {
    pub fn new(repository: Arc<dyn CurrencyRepositoryTrait>, seed_rate: Decimal) -> Self {
        Self {
            repository,
            seed_rate,
            retention: RetentionPolicy::default(),
            rate_model: Arc::new(MeanReversionModel::default()),
            state: RwLock::new(ServiceState::Uninitialized),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_rate_model(mut self, rate_model: Arc<dyn RateEvolutionModel>) -> Self {
        self.rate_model = rate_model;
        self
    }

    fn set_state(&self, next: ServiceState) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CurrencyError::CacheError(e.to_string()))?;
        *state = next;
        Ok(())
    }

    fn current_status(&self) -> Result<ServiceStatus> {
        let state = self
            .state
            .read()
            .map_err(|e| CurrencyError::CacheError(e.to_string()))?;
        Ok(state.status())
    }

    /// Records the next rate for a given standard normal draw.
    pub async fn advance_rate_with(&self, draw: f64) -> Result<Arc<CurrencyData>> {
        let current = self.get_current_data()?;
        let next = self
            .rate_model
            .next_rate(current.current_rate, current.base_rate, draw);
        debug!(
            "{} model moved PXL rate {} -> {}",
            self.rate_model.name(),
            current.current_rate,
            next
        );
        self.record_rate(next, Utc::now()).await
    }
}

#[async_trait]
impl CurrencyServiceTrait for CurrencyService {
    async fn initialize(&self) -> Result<InitializationOutcome> {
        let _guard = self.write_lock.lock().await;

        let was_ready = self.current_status()? == ServiceStatus::Ready;
        if !was_ready {
            self.set_state(ServiceState::Initializing)?;
        }

        let loaded = async {
            let (data, created) = match self.repository.get_currency_data()? {
                Some(existing) => (existing, false),
                None => {
                    let seed = NewCurrencyData::seed(self.seed_rate, Utc::now())?;
                    self.repository
                        .create_currency_data_if_absent(seed)
                        .await?
                }
            };
            data.validate()?;
            Ok::<_, crate::Error>((data, created))
        }
        .await;

        match loaded {
            Ok((data, created)) => {
                let data = Arc::new(data);
                self.set_state(ServiceState::Ready(data.clone()))?;
                if created {
                    info!(
                        "Seeded PXL currency record at rate {}",
                        data.current_rate
                    );
                } else {
                    info!(
                        "Loaded existing PXL currency record (rate {}, {} hourly samples)",
                        data.current_rate,
                        data.market_data.hourly_rates.len()
                    );
                }
                Ok(InitializationOutcome { data, created })
            }
            Err(e) => {
                warn!("PXL currency initialization failed: {}", e);
                if !was_ready {
                    self.set_state(ServiceState::Uninitialized)?;
                }
                Err(e)
            }
        }
    }

    fn status(&self) -> ServiceStatus {
        self.current_status()
            .unwrap_or(ServiceStatus::Uninitialized)
    }

    fn get_current_data(&self) -> Result<Arc<CurrencyData>> {
        let state = self
            .state
            .read()
            .map_err(|e| CurrencyError::CacheError(e.to_string()))?;
        match &*state {
            ServiceState::Ready(data) => Ok(data.clone()),
            ServiceState::Uninitialized | ServiceState::Initializing => {
                Err(CurrencyError::NotInitialized.into())
            }
        }
    }

    fn get_current_rate(&self) -> Result<CurrentRate> {
        let data = self.get_current_data()?;
        Ok(CurrentRate {
            rate: data.current_rate,
            base_rate: data.base_rate,
            last_updated: data.last_updated,
            trend: data.market_data.trend,
            change_24h: compute_change_24h(&data.market_data.hourly_rates),
            purchase_discounts: data.purchase_discounts.as_slice().to_vec(),
        })
    }

    fn get_rate_history(&self, period: RatePeriod, limit: Option<usize>) -> Result<RateHistory> {
        let data = self.get_current_data()?;
        let (series, retained) = match period {
            RatePeriod::Hourly => (&data.market_data.hourly_rates, self.retention.hourly),
            RatePeriod::Daily => (&data.market_data.daily_rates, self.retention.daily),
        };

        let limit = match limit {
            Some(0) => {
                return Err(ValidationError::InvalidInput(
                    "limit must be at least 1".to_string(),
                )
                .into())
            }
            Some(n) => n.min(retained),
            None => retained,
        };
        let start = series.len().saturating_sub(limit);

        Ok(RateHistory {
            period,
            rates: series[start..].to_vec(),
            current_rate: data.current_rate,
            base_rate: data.base_rate,
            trend: data.market_data.trend,
            change_24h: compute_change_24h(&data.market_data.hourly_rates),
            deviation_percent: deviation_percent(data.current_rate, data.base_rate),
        })
    }

    fn quote_purchase(&self, amount: Decimal, tier: Tier) -> Result<PriceQuote> {
        let data = self.get_current_data()?;
        pricing::quote_purchase(&data, amount, tier)
    }

    async fn record_rate(&self, rate: Decimal, at: DateTime<Utc>) -> Result<Arc<CurrencyData>> {
        if rate <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(format!(
                "rate must be positive, got {}",
                rate
            ))
            .into());
        }

        let _guard = self.write_lock.lock().await;
        let current = self.get_current_data()?;

        let mut market_data = current.market_data.clone();
        let point = append_sample(&mut market_data, rate, at, &self.retention);

        let stored = self
            .repository
            .update_market_data(MarketDataUpdate {
                current_rate: rate,
                market_data,
            })
            .await?;
        stored.validate()?;

        let stored = Arc::new(stored);
        self.set_state(ServiceState::Ready(stored.clone()))?;
        debug!(
            "Recorded PXL rate {} at {} (trend {})",
            point.rate,
            point.timestamp,
            stored.market_data.trend.as_str()
        );
        Ok(stored)
    }

    async fn advance_rate(&self) -> Result<Arc<CurrencyData>> {
        // ThreadRng is not Send; draw before any await.
        let draw = draw_standard_normal(&mut rand::thread_rng());
        self.advance_rate_with(draw).await
    }
}
