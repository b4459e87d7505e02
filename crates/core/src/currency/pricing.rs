use rust_decimal::Decimal;
use serde::Serialize;

use super::currency_model::{CurrencyData, Tier};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

/// Priced purchase of PXL for a spend in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub amount: Decimal,
    pub tier: Tier,
    pub rate: Decimal,
    pub multiplier: Decimal,
    pub discount_percent: Decimal,
    pub pxl_amount: Decimal,
    pub charged_amount: Decimal,
}

/// Quotes a purchase of `amount` base-currency units for a customer in `tier`.
///
/// The tier multiplier scales the PXL credited; the volume discount reduces
/// the amount charged.
pub fn quote_purchase(data: &CurrencyData, amount: Decimal, tier: Tier) -> Result<PriceQuote> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "Amount must be a positive number, got {}",
            amount
        ))
        .into());
    }

    let multiplier = data.tier_multipliers.multiplier(tier);
    let discount_percent = data.purchase_discounts.discount_for(amount);
    let pxl_amount = amount
        .checked_mul(data.current_rate)
        .and_then(|v| v.checked_mul(multiplier))
        .ok_or_else(|| out_of_range(amount))?
        .round_dp(DISPLAY_DECIMAL_PRECISION);
    let charged_amount = amount
        .checked_mul(Decimal::ONE - discount_percent / Decimal::ONE_HUNDRED)
        .ok_or_else(|| out_of_range(amount))?
        .round_dp(DISPLAY_DECIMAL_PRECISION);

    Ok(PriceQuote {
        amount,
        tier,
        rate: data.current_rate,
        multiplier,
        discount_percent,
        pxl_amount,
        charged_amount,
    })
}

fn out_of_range(amount: Decimal) -> Error {
    ValidationError::InvalidInput(format!("Amount {} is too large to quote", amount)).into()
}
