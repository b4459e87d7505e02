use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Document collection holding the PXL currency record
pub const CURRENCY_COLLECTION: &str = "pxl_currency";

/// Document id of the single currency record
pub const CURRENCY_DOCUMENT_ID: &str = "current";

/// Base currency the PXL rate is quoted against
pub const BASE_CURRENCY: &str = "USD";

/// Maximum hourly samples retained (7 days)
pub const HOURLY_RETENTION: usize = 168;

/// Maximum daily samples retained
pub const DAILY_RETENTION: usize = 365;

/// Samples looked back by the 24h change (one per hour)
pub const CHANGE_WINDOW: usize = 24;

/// Decimal places of the 24h change
pub const CHANGE_PRECISION: u32 = 3;

/// Decimal places of a simulated rate
pub const RATE_PRECISION: u32 = 4;

/// Decimal places for display amounts
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Percent move over the change window that flips the trend away from stable
pub const TREND_THRESHOLD_PERCENT: Decimal = dec!(0.5);
