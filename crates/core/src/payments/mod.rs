//! Payment-method lookup for storefront checkout.

mod payments_model;
mod payments_service;

pub use payments_model::{
    default_catalogue, AvailablePaymentMethod, PaymentMethod, PaymentMethodKind,
    PaymentMethodsQuote,
};
pub use payments_service::{PaymentMethodService, PaymentMethodServiceTrait};
