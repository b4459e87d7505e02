use async_trait::async_trait;
use std::sync::Arc;

use super::model::CurrencyDocumentDB;
use crate::db::{DbPool, WriteHandle};
use crate::documents::{DocumentRepository, StoredDocument};
use crate::errors::IntoCore;
use pxl_core::constants::{CURRENCY_COLLECTION, CURRENCY_DOCUMENT_ID};
use pxl_core::currency::{
    CurrencyData, CurrencyRepositoryTrait, MarketDataUpdate, NewCurrencyData,
};
use pxl_core::errors::Result;

/// Currency record persisted as the `pxl_currency/current` document.
pub struct CurrencyRepository {
    documents: DocumentRepository,
}

impl CurrencyRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CurrencyRepository {
            documents: DocumentRepository::new(pool, writer),
        }
    }
}

fn decode(doc: StoredDocument) -> Result<CurrencyData> {
    let body: CurrencyDocumentDB = serde_json::from_value(doc.body).into_core()?;
    body.into_domain(doc.updated_at)
}

#[async_trait]
impl CurrencyRepositoryTrait for CurrencyRepository {
    fn get_currency_data(&self) -> Result<Option<CurrencyData>> {
        self.documents
            .get(CURRENCY_COLLECTION, CURRENCY_DOCUMENT_ID)?
            .map(decode)
            .transpose()
    }

    async fn create_currency_data_if_absent(
        &self,
        seed: NewCurrencyData,
    ) -> Result<(CurrencyData, bool)> {
        let body = serde_json::to_value(CurrencyDocumentDB::from(&seed)).into_core()?;
        let (doc, created) = self
            .documents
            .create_if_absent(CURRENCY_COLLECTION, CURRENCY_DOCUMENT_ID, body)
            .await?;
        Ok((decode(doc)?, created))
    }

    async fn update_market_data(&self, update: MarketDataUpdate) -> Result<CurrencyData> {
        let patch = CurrencyDocumentDB::market_patch(&update)?;
        let doc = self
            .documents
            .update(CURRENCY_COLLECTION, CURRENCY_DOCUMENT_ID, patch)
            .await?;
        decode(doc)
    }
}
