//! Rate evolution for the periodic update job.
//!
//! The PXL rate drifts around its base rate following a discretised
//! Ornstein-Uhlenbeck process:
//!
//! ```text
//! X(t+1) = θ + (X(t) - θ)·e^(-κ) + σ·θ·sqrt((1 - e^(-2κ)) / 2κ)·Z
//! ```
//!
//! where θ is the base rate, κ the reversion speed, σ the per-step volatility
//! as a fraction of θ and Z a standard normal draw. The result is clamped to a
//! band around θ.

use num_traits::{FromPrimitive, ToPrimitive};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rust_decimal::Decimal;

use crate::constants::RATE_PRECISION;

/// Produces the next rate from the current one.
pub trait RateEvolutionModel: Send + Sync {
    /// Evolve `current` one step given a standard normal `draw`.
    fn next_rate(&self, current: Decimal, base: Decimal, draw: f64) -> Decimal;

    fn name(&self) -> &'static str;
}

/// Mean-reverting model anchored on the base rate.
#[derive(Debug, Clone)]
pub struct MeanReversionModel {
    /// Reversion speed per step (κ)
    pub speed: f64,
    /// Per-step volatility as a fraction of the base rate (σ)
    pub volatility: f64,
    /// Lowest allowed rate as a fraction of the base rate
    pub floor_ratio: f64,
    /// Highest allowed rate as a fraction of the base rate
    pub ceiling_ratio: f64,
}

impl MeanReversionModel {
    pub fn new(speed: f64, volatility: f64, floor_ratio: f64, ceiling_ratio: f64) -> Self {
        Self {
            speed,
            volatility,
            floor_ratio,
            ceiling_ratio,
        }
    }
}

impl Default for MeanReversionModel {
    fn default() -> Self {
        Self::new(0.1, 0.01, 0.5, 2.0)
    }
}

impl RateEvolutionModel for MeanReversionModel {
    fn next_rate(&self, current: Decimal, base: Decimal, draw: f64) -> Decimal {
        let (Some(x), Some(theta)) = (current.to_f64(), base.to_f64()) else {
            return current;
        };
        if theta <= 0.0 || !draw.is_finite() {
            return current;
        }

        let e_k = (-self.speed).exp();
        let mean = theta + (x - theta) * e_k;
        let std_dev = if self.speed > 0.0 {
            self.volatility * theta * ((1.0 - e_k * e_k) / (2.0 * self.speed)).sqrt()
        } else {
            self.volatility * theta
        };

        let floor = theta * self.floor_ratio;
        let ceiling = theta * self.ceiling_ratio;
        let next = (mean + std_dev * draw).clamp(floor.min(ceiling), ceiling.max(floor));

        match Decimal::from_f64(next) {
            Some(rate) => {
                let rate = rate.round_dp(RATE_PRECISION);
                if rate > Decimal::ZERO {
                    rate
                } else {
                    current
                }
            }
            None => current,
        }
    }

    fn name(&self) -> &'static str {
        "MeanReversion"
    }
}

/// Standard normal draw for [`RateEvolutionModel::next_rate`].
pub fn draw_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_draw_reverts_toward_base() {
        let model = MeanReversionModel::default();
        let next = model.next_rate(dec!(120), dec!(100), 0.0);
        assert!(next < dec!(120));
        assert!(next > dec!(100));

        let next = model.next_rate(dec!(80), dec!(100), 0.0);
        assert!(next > dec!(80));
        assert!(next < dec!(100));
    }

    #[test]
    fn at_base_with_zero_draw_stays_put() {
        let model = MeanReversionModel::default();
        assert_eq!(model.next_rate(dec!(100), dec!(100), 0.0), dec!(100));
    }

    #[test]
    fn extreme_draws_are_clamped_to_band() {
        let model = MeanReversionModel::default();
        assert_eq!(model.next_rate(dec!(100), dec!(100), -1e6), dec!(50));
        assert_eq!(model.next_rate(dec!(100), dec!(100), 1e6), dec!(200));
    }

    #[test]
    fn non_finite_draw_keeps_current() {
        let model = MeanReversionModel::default();
        assert_eq!(model.next_rate(dec!(101), dec!(100), f64::NAN), dec!(101));
    }

    #[test]
    fn seeded_walk_stays_positive_and_rounded() {
        let model = MeanReversionModel::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mut rate = dec!(100);
        for _ in 0..500 {
            rate = model.next_rate(rate, dec!(100), draw_standard_normal(&mut rng));
            assert!(rate >= dec!(50) && rate <= dec!(200));
            assert!(rate.scale() <= RATE_PRECISION);
        }
    }
}
