//! Derivations over the rate history: 24h change, trend, retention.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency_model::{MarketData, RatePoint, Trend};
use crate::constants::{
    CHANGE_PRECISION, CHANGE_WINDOW, DAILY_RETENTION, DISPLAY_DECIMAL_PRECISION, HOURLY_RETENTION,
    TREND_THRESHOLD_PERCENT,
};

/// Reference and current sample of the 24h window, or `None` with fewer than
/// two samples. The reference is the sample `CHANGE_WINDOW` steps back, or the
/// oldest one when the history is shorter.
fn change_window(hourly_rates: &[RatePoint]) -> Option<(&RatePoint, &RatePoint)> {
    if hourly_rates.len() < 2 {
        return None;
    }
    let current = hourly_rates.last()?;
    let reference = &hourly_rates[hourly_rates.len().saturating_sub(CHANGE_WINDOW)];
    Some((reference, current))
}

/// Absolute rate change over the last 24 hourly samples, rounded to three
/// decimal places with banker's rounding (half-to-even).
pub fn compute_change_24h(hourly_rates: &[RatePoint]) -> Decimal {
    match change_window(hourly_rates) {
        Some((reference, current)) => (current.rate - reference.rate).round_dp(CHANGE_PRECISION),
        None => Decimal::ZERO,
    }
}

/// Classifies the relative move over the same window as [`compute_change_24h`].
pub fn classify_trend(hourly_rates: &[RatePoint]) -> Trend {
    let Some((reference, current)) = change_window(hourly_rates) else {
        return Trend::Stable;
    };
    if reference.rate.is_zero() {
        return Trend::Stable;
    }
    let percent = (current.rate - reference.rate) / reference.rate * Decimal::ONE_HUNDRED;
    if percent > TREND_THRESHOLD_PERCENT {
        Trend::Up
    } else if percent < -TREND_THRESHOLD_PERCENT {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Percent distance of the current rate from the base rate, two decimals.
pub fn deviation_percent(current_rate: Decimal, base_rate: Decimal) -> Decimal {
    if base_rate.is_zero() {
        return Decimal::ZERO;
    }
    ((current_rate - base_rate) / base_rate * Decimal::ONE_HUNDRED)
        .round_dp(DISPLAY_DECIMAL_PRECISION)
}

/// Bounded window kept for each history series. Oldest samples go first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub hourly: usize,
    pub daily: usize,
}

impl RetentionPolicy {
    pub fn new(hourly: usize, daily: usize) -> Self {
        Self {
            hourly: hourly.max(1),
            daily: daily.max(1),
        }
    }

    pub fn prune(&self, market: &mut MarketData) {
        prune_front(&mut market.hourly_rates, self.hourly);
        prune_front(&mut market.daily_rates, self.daily);
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(HOURLY_RETENTION, DAILY_RETENTION)
    }
}

fn prune_front(series: &mut Vec<RatePoint>, max_len: usize) {
    if series.len() > max_len {
        let excess = series.len() - max_len;
        series.drain(..excess);
    }
}

/// Appends an hourly sample, rolls a daily sample on the first sample of a
/// new UTC day, prunes, and recomputes the trend.
///
/// The sample timestamp is clamped to the newest existing sample so the
/// series stays ordered even if the caller's clock stepped backwards.
pub fn append_sample(
    market: &mut MarketData,
    rate: Decimal,
    at: DateTime<Utc>,
    policy: &RetentionPolicy,
) -> RatePoint {
    let timestamp = market
        .hourly_rates
        .last()
        .map(|last| last.timestamp.max(at))
        .unwrap_or(at);
    let point = RatePoint::new(rate, timestamp);
    market.hourly_rates.push(point.clone());

    let starts_new_day = match market.daily_rates.last() {
        Some(last) => timestamp.date_naive() > last.timestamp.date_naive(),
        None => true,
    };
    if starts_new_day {
        market.daily_rates.push(point.clone());
    }

    policy.prune(market);
    market.trend = classify_trend(&market.hourly_rates);
    point
}
