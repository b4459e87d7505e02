use log::debug;
use rust_decimal::Decimal;

use super::payments_model::{
    default_catalogue, AvailablePaymentMethod, PaymentMethod, PaymentMethodsQuote,
};
use crate::constants::BASE_CURRENCY;
use crate::errors::{Result, ValidationError};

pub trait PaymentMethodServiceTrait: Send + Sync {
    /// Methods that accept `amount` in `currency`, cheapest fee first.
    fn available_methods(&self, amount: Decimal, currency: Option<&str>)
        -> Result<PaymentMethodsQuote>;
}

pub struct PaymentMethodService {
    catalogue: Vec<PaymentMethod>,
}

impl PaymentMethodService {
    pub fn new(catalogue: Vec<PaymentMethod>) -> Self {
        Self { catalogue }
    }
}

impl Default for PaymentMethodService {
    fn default() -> Self {
        Self::new(default_catalogue())
    }
}

impl PaymentMethodServiceTrait for PaymentMethodService {
    fn available_methods(
        &self,
        amount: Decimal,
        currency: Option<&str>,
    ) -> Result<PaymentMethodsQuote> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "Amount must be a positive number".to_string(),
            )
            .into());
        }
        let currency = currency
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(BASE_CURRENCY)
            .to_ascii_uppercase();

        let mut methods = self
            .catalogue
            .iter()
            .filter(|m| m.accepts(amount, &currency))
            .map(|m| -> Result<AvailablePaymentMethod> {
                let (fee, total) = m
                    .fee_for(amount)
                    .and_then(|fee| amount.checked_add(fee).map(|total| (fee, total)))
                    .ok_or_else(|| {
                        ValidationError::InvalidInput(format!(
                            "Amount {} is too large for {}",
                            amount, m.name
                        ))
                    })?;
                Ok(AvailablePaymentMethod {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    kind: m.kind,
                    fee,
                    total,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        methods.sort_by(|a, b| a.fee.cmp(&b.fee).then_with(|| a.id.cmp(&b.id)));

        debug!(
            "{} payment methods available for {} {}",
            methods.len(),
            amount,
            currency
        );

        Ok(PaymentMethodsQuote {
            amount,
            currency,
            methods,
        })
    }
}
