mod model;
mod repository;

pub use model::CurrencyDocumentDB;
pub use repository::CurrencyRepository;
