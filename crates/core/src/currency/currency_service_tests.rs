//! Tests for CurrencyService state machine, snapshot and update path.

#[cfg(test)]
mod tests {
    use crate::currency::{
        CurrencyData, CurrencyError, CurrencyRepositoryTrait, CurrencyService,
        CurrencyServiceTrait, MarketDataUpdate, NewCurrencyData, RatePeriod, RetentionPolicy,
        ServiceStatus, Tier,
    };
    use crate::errors::{DatabaseError, Error, Result};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Mock repository
    // =========================================================================

    #[derive(Default)]
    struct MockCurrencyRepository {
        record: Mutex<Option<CurrencyData>>,
        seed_writes: AtomicUsize,
        create_calls: AtomicUsize,
        offline: AtomicBool,
    }

    impl MockCurrencyRepository {
        fn with_record(data: CurrencyData) -> Self {
            Self {
                record: Mutex::new(Some(data)),
                ..Default::default()
            }
        }

        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn seed_writes(&self) -> usize {
            self.seed_writes.load(Ordering::SeqCst)
        }

        fn check_online(&self) -> Result<()> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(DatabaseError::ConnectionFailed("store offline".to_string()).into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CurrencyRepositoryTrait for MockCurrencyRepository {
        fn get_currency_data(&self) -> Result<Option<CurrencyData>> {
            self.check_online()?;
            Ok(self.record.lock().unwrap().clone())
        }

        async fn create_currency_data_if_absent(
            &self,
            seed: NewCurrencyData,
        ) -> Result<(CurrencyData, bool)> {
            self.check_online()?;
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            let mut record = self.record.lock().unwrap();
            if let Some(existing) = record.as_ref() {
                return Ok((existing.clone(), false));
            }
            let data = seed.into_currency_data(Utc::now());
            *record = Some(data.clone());
            self.seed_writes.fetch_add(1, Ordering::SeqCst);
            Ok((data, true))
        }

        async fn update_market_data(&self, update: MarketDataUpdate) -> Result<CurrencyData> {
            self.check_online()?;
            let mut record = self.record.lock().unwrap();
            let existing = record
                .as_mut()
                .ok_or_else(|| DatabaseError::NotFound("pxl_currency/current".to_string()))?;
            existing.current_rate = update.current_rate;
            existing.market_data = update.market_data;
            existing.last_updated = Utc::now().max(existing.last_updated);
            Ok(existing.clone())
        }
    }

    fn service() -> (Arc<MockCurrencyRepository>, CurrencyService) {
        let repo = Arc::new(MockCurrencyRepository::default());
        let service = CurrencyService::new(repo.clone(), dec!(100));
        (repo, service)
    }

    fn is_not_initialized<T: std::fmt::Debug>(result: Result<T>) -> bool {
        matches!(result, Err(Error::Currency(CurrencyError::NotInitialized)))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[tokio::test]
    async fn queries_fail_fast_before_initialize() {
        let (repo, service) = service();

        assert_eq!(service.status(), ServiceStatus::Uninitialized);
        assert!(is_not_initialized(service.get_current_data()));
        assert!(is_not_initialized(service.get_current_rate()));
        assert!(is_not_initialized(
            service.get_rate_history(RatePeriod::Hourly, None)
        ));
        assert!(is_not_initialized(
            service.quote_purchase(dec!(10), Tier::Starter)
        ));
        assert!(is_not_initialized(
            service.record_rate(dec!(101), Utc::now()).await
        ));

        // Reads never create data implicitly.
        assert_eq!(repo.seed_writes(), 0);
        assert!(repo.get_currency_data().unwrap().is_none());
    }

    #[tokio::test]
    async fn initialize_seeds_once_and_is_idempotent() {
        let (repo, service) = service();

        let first = service.initialize().await.unwrap();
        assert!(first.created);
        assert!(first.data.current_rate > Decimal::ZERO);
        assert!(first.data.base_rate > Decimal::ZERO);
        assert_eq!(service.status(), ServiceStatus::Ready);

        let second = service.initialize().await.unwrap();
        assert!(!second.created);
        assert_eq!(second.data.last_updated, first.data.last_updated);
        assert_eq!(second.data.market_data, first.data.market_data);
        assert_eq!(repo.seed_writes(), 1);
    }

    #[tokio::test]
    async fn initialize_loads_existing_record_without_reset() {
        let now = Utc::now();
        let mut existing = NewCurrencyData::seed(dec!(100), now)
            .unwrap()
            .into_currency_data(now);
        existing.current_rate = dec!(123.45);
        let repo = Arc::new(MockCurrencyRepository::with_record(existing));
        let service = CurrencyService::new(repo.clone(), dec!(100));

        let outcome = service.initialize().await.unwrap();
        assert!(!outcome.created);
        assert_eq!(service.get_current_rate().unwrap().rate, dec!(123.45));
        assert_eq!(repo.seed_writes(), 0);
    }

    #[tokio::test]
    async fn initialize_with_stored_record_skips_conditional_create() {
        let (repo, service) = service();
        service.initialize().await.unwrap();
        assert_eq!(repo.create_calls.load(Ordering::SeqCst), 1);

        let again = service.initialize().await.unwrap();
        assert!(!again.created);
        assert_eq!(repo.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_initialize_returns_to_uninitialized() {
        let (repo, service) = service();
        repo.set_offline(true);

        let result = service.initialize().await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(service.status(), ServiceStatus::Uninitialized);
        assert!(is_not_initialized(service.get_current_data()));

        repo.set_offline(false);
        assert!(service.initialize().await.is_ok());
        assert_eq!(service.status(), ServiceStatus::Ready);
    }

    #[tokio::test]
    async fn reinitialize_failure_keeps_ready_snapshot() {
        let (repo, service) = service();
        service.initialize().await.unwrap();

        repo.set_offline(true);
        assert!(service.initialize().await.is_err());
        assert_eq!(service.status(), ServiceStatus::Ready);
        assert!(service.get_current_rate().is_ok());
    }

    #[tokio::test]
    async fn concurrent_initialize_creates_one_seed() {
        let (repo, service) = service();
        let service = Arc::new(service);

        let (a, b, c) = tokio::join!(
            service.initialize(),
            service.initialize(),
            service.initialize()
        );
        let created = [a.unwrap(), b.unwrap(), c.unwrap()]
            .iter()
            .filter(|o| o.created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(repo.seed_writes(), 1);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[tokio::test]
    async fn fresh_record_reports_zero_change() {
        let (_repo, service) = service();
        service.initialize().await.unwrap();

        let current = service.get_current_rate().unwrap();
        assert_eq!(current.rate, dec!(100));
        assert_eq!(current.base_rate, dec!(100));
        assert_eq!(current.change_24h, Decimal::ZERO);
        assert_eq!(current.purchase_discounts.len(), 4);
    }

    #[tokio::test]
    async fn rate_history_returns_newest_samples_oldest_first() {
        let (_repo, service) = service();
        service.initialize().await.unwrap();
        let start = Utc::now();
        for i in 1..=5 {
            service
                .record_rate(dec!(100) + Decimal::from(i), start + Duration::hours(i))
                .await
                .unwrap();
        }

        let history = service
            .get_rate_history(RatePeriod::Hourly, Some(2))
            .unwrap();
        assert_eq!(history.rates.len(), 2);
        assert_eq!(history.rates[0].rate, dec!(104));
        assert_eq!(history.rates[1].rate, dec!(105));
        assert_eq!(history.current_rate, dec!(105));
        assert_eq!(history.deviation_percent, dec!(5));

        let all = service.get_rate_history(RatePeriod::Hourly, None).unwrap();
        assert_eq!(all.rates.len(), 6);

        let result = service.get_rate_history(RatePeriod::Daily, Some(0));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn quote_uses_cached_snapshot() {
        let (_repo, service) = service();
        service.initialize().await.unwrap();

        let quote = service.quote_purchase(dec!(25), Tier::Pro).unwrap();
        assert_eq!(quote.rate, dec!(100));
        assert_eq!(quote.discount_percent, dec!(5));
        assert_eq!(quote.pxl_amount, dec!(2750));
    }

    // =========================================================================
    // Update path
    // =========================================================================

    #[tokio::test]
    async fn record_rate_swaps_snapshot_and_keeps_timestamps_ordered() {
        let (_repo, service) = service();
        let initial = service.initialize().await.unwrap().data;

        let updated = service
            .record_rate(dec!(101), Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        // Earlier snapshot stays untouched for readers that hold it.
        assert_eq!(initial.current_rate, dec!(100));
        assert_eq!(initial.market_data.hourly_rates.len(), 1);

        assert_eq!(updated.current_rate, dec!(101));
        assert_eq!(updated.market_data.hourly_rates.len(), 2);
        assert!(updated.last_updated >= initial.last_updated);

        let current = service.get_current_rate().unwrap();
        assert_eq!(current.change_24h, dec!(1));
        assert_eq!(current.last_updated, updated.last_updated);
        assert_eq!(current.trend.as_str(), "up");
    }

    #[tokio::test]
    async fn record_rate_rejects_non_positive_rate() {
        let (_repo, service) = service();
        service.initialize().await.unwrap();

        let result = service.record_rate(Decimal::ZERO, Utc::now()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn record_rate_store_failure_keeps_previous_snapshot() {
        let (repo, service) = service();
        service.initialize().await.unwrap();
        repo.set_offline(true);

        let result = service.record_rate(dec!(150), Utc::now()).await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(service.get_current_rate().unwrap().rate, dec!(100));
    }

    #[tokio::test]
    async fn retention_bounds_hourly_history() {
        let repo = Arc::new(MockCurrencyRepository::default());
        let service =
            CurrencyService::new(repo, dec!(100)).with_retention(RetentionPolicy::new(24, 7));
        service.initialize().await.unwrap();

        let start = Utc::now();
        for i in 1..=40 {
            service
                .record_rate(dec!(100), start + Duration::hours(i))
                .await
                .unwrap();
        }
        let data = service.get_current_data().unwrap();
        assert_eq!(data.market_data.hourly_rates.len(), 24);
        assert!(data.market_data.daily_rates.len() <= 7);
    }

    #[tokio::test]
    async fn advance_rate_at_base_with_zero_draw_keeps_rate() {
        let (_repo, service) = service();
        service.initialize().await.unwrap();

        let data = service.advance_rate_with(0.0).await.unwrap();
        assert_eq!(data.current_rate, dec!(100));
        assert_eq!(data.market_data.hourly_rates.len(), 2);
    }

    #[tokio::test]
    async fn advance_rate_keeps_rate_positive() {
        let (_repo, service) = service();
        service.initialize().await.unwrap();

        for _ in 0..20 {
            let data = service.advance_rate().await.unwrap();
            assert!(data.current_rate > Decimal::ZERO);
        }
    }
}
