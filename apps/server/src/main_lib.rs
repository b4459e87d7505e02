use std::sync::Arc;

use crate::config::Config;
use pxl_core::{
    currency::{CurrencyService, CurrencyServiceTrait},
    payments::{PaymentMethodService, PaymentMethodServiceTrait},
};
use pxl_storage_sqlite::{
    currency::CurrencyRepository,
    db::{self, spawn_writer},
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub currency_service: Arc<dyn CurrencyServiceTrait + Send + Sync>,
    pub payment_method_service: Arc<dyn PaymentMethodServiceTrait + Send + Sync>,
}

pub fn init_tracing() {
    let log_format = std::env::var("PXL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let currency_repository = Arc::new(CurrencyRepository::new(pool.clone(), writer.clone()));
    let currency_service = Arc::new(CurrencyService::new(
        currency_repository,
        config.seed_rate,
    ));

    if config.auto_initialize {
        let outcome = currency_service.initialize().await?;
        tracing::info!(
            created = outcome.created,
            rate = %outcome.data.current_rate,
            "PXL currency data loaded at startup"
        );
    }

    let payment_method_service = Arc::new(PaymentMethodService::default());

    Ok(Arc::new(AppState {
        currency_service,
        payment_method_service,
    }))
}
