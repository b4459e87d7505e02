use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Card,
    Wallet,
    BankTransfer,
    Crypto,
}

impl PaymentMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodKind::Card => "card",
            PaymentMethodKind::Wallet => "wallet",
            PaymentMethodKind::BankTransfer => "bank_transfer",
            PaymentMethodKind::Crypto => "crypto",
        }
    }
}

/// Catalogue entry: limits, supported currencies and fee schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub kind: PaymentMethodKind,
    pub min_amount: Decimal,
    /// `None` means unbounded.
    pub max_amount: Option<Decimal>,
    pub currencies: Vec<String>,
    pub fee_percent: Decimal,
    pub fixed_fee: Decimal,
}

impl PaymentMethod {
    pub fn accepts(&self, amount: Decimal, currency: &str) -> bool {
        amount >= self.min_amount
            && self.max_amount.map_or(true, |max| amount <= max)
            && self
                .currencies
                .iter()
                .any(|c| c.eq_ignore_ascii_case(currency))
    }

    /// `None` when the fee does not fit in a `Decimal`.
    pub fn fee_for(&self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.fee_percent)?
            .checked_div(Decimal::ONE_HUNDRED)?
            .checked_add(self.fixed_fee)
            .map(|fee| fee.round_dp(DISPLAY_DECIMAL_PRECISION))
    }
}

/// A method that accepts the requested amount, with its computed fee.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailablePaymentMethod {
    pub id: String,
    pub name: String,
    pub kind: PaymentMethodKind,
    pub fee: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsQuote {
    pub amount: Decimal,
    pub currency: String,
    pub methods: Vec<AvailablePaymentMethod>,
}

fn method(
    id: &str,
    name: &str,
    kind: PaymentMethodKind,
    limits: (Decimal, Option<Decimal>),
    currencies: &[&str],
    fees: (Decimal, Decimal),
) -> PaymentMethod {
    PaymentMethod {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        min_amount: limits.0,
        max_amount: limits.1,
        currencies: currencies.iter().map(|c| c.to_string()).collect(),
        fee_percent: fees.0,
        fixed_fee: fees.1,
    }
}

/// Methods offered at checkout.
pub fn default_catalogue() -> Vec<PaymentMethod> {
    vec![
        method(
            "card",
            "Credit / Debit Card",
            PaymentMethodKind::Card,
            (dec!(0.50), Some(dec!(10000))),
            &["USD", "EUR", "GBP"],
            (dec!(2.9), dec!(0.30)),
        ),
        method(
            "paypal",
            "PayPal",
            PaymentMethodKind::Wallet,
            (dec!(1), Some(dec!(5000))),
            &["USD", "EUR", "GBP"],
            (dec!(3.49), dec!(0.49)),
        ),
        method(
            "apple_pay",
            "Apple Pay",
            PaymentMethodKind::Wallet,
            (dec!(0.50), Some(dec!(10000))),
            &["USD", "EUR"],
            (dec!(2.9), dec!(0.30)),
        ),
        method(
            "bank_transfer",
            "Bank Transfer",
            PaymentMethodKind::BankTransfer,
            (dec!(20), None),
            &["USD", "EUR"],
            (dec!(0.8), Decimal::ZERO),
        ),
        method(
            "crypto",
            "Crypto (USDC)",
            PaymentMethodKind::Crypto,
            (dec!(10), None),
            &["USD"],
            (dec!(1), Decimal::ZERO),
        ),
    ]
}
