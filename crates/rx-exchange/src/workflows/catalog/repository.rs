use async_trait::async_trait;

use super::domain::{CatalogProduct, CatalogQuery, ProductCode};

/// Read access to the external product catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_by_code(&self, code: ProductCode)
        -> Result<Option<CatalogProduct>, CatalogError>;

    /// Case-insensitive substring match on the product name, at most `limit` rows.
    async fn find_by_name(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<CatalogProduct>, CatalogError>;
}

/// Catalog lookup failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogQuery {
    /// Runs the lookup this query describes. Non-lookups resolve to an empty
    /// result without touching the catalog.
    pub async fn resolve(
        &self,
        catalog: &dyn CatalogReader,
        limit: usize,
    ) -> Result<Vec<CatalogProduct>, CatalogError> {
        match self {
            CatalogQuery::TooShort | CatalogQuery::UnknownCode => Ok(Vec::new()),
            CatalogQuery::Code(code) => Ok(catalog.find_by_code(*code).await?.into_iter().collect()),
            CatalogQuery::Name(text) => catalog.find_by_name(text, limit).await,
        }
    }
}

/// Immediate (non-debounced) catalog search shared by the board and HTTP layer.
pub async fn search_catalog(
    catalog: &dyn CatalogReader,
    query: &str,
    limit: usize,
) -> Result<Vec<CatalogProduct>, CatalogError> {
    CatalogQuery::parse(query).resolve(catalog, limit).await
}
