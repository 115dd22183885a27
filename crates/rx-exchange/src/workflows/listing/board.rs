//! Read side of the marketplace: approved listings, newest first, optionally
//! narrowed to the products a search term resolves to.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use super::domain::{Listing, PhotoRole};
use super::store::{ListingStore, PersistenceError};
use crate::workflows::catalog::{
    CatalogError, CatalogProduct, CatalogQuery, CatalogReader, ProductCode,
};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_CODE_RESOLUTION_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSettings {
    pub page_size: usize,
    /// Upper bound on name matches used to build the product-code filter.
    pub code_resolution_limit: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            code_resolution_limit: DEFAULT_CODE_RESOLUTION_LIMIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Approved listing joined with its catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub listing: Listing,
    pub product: Option<CatalogProduct>,
    /// Informational only; expired listings are still shown.
    pub is_expired: bool,
}

impl BoardEntry {
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|product| product.name.as_str())
            .unwrap_or("Unknown product")
    }

    pub fn expiry_display(&self) -> String {
        self.listing.expiry_date.format("%Y.%m.%d").to_string()
    }

    pub fn thumbnail(&self) -> &str {
        self.listing.image_url(PhotoRole::FullView)
    }

    pub fn condition_label(&self) -> &'static str {
        self.listing.condition.label()
    }

    pub fn price_display(&self) -> Option<String> {
        self.product
            .as_ref()
            .map(|product| format!("{}₩ / {}", product.ceiling_price, product.unit))
    }
}

#[derive(Clone)]
pub struct BoardQuery {
    catalog: Arc<dyn CatalogReader>,
    listings: Arc<dyn ListingStore>,
    settings: BoardSettings,
}

impl BoardQuery {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        listings: Arc<dyn ListingStore>,
        settings: BoardSettings,
    ) -> Self {
        Self {
            catalog,
            listings,
            settings,
        }
    }

    pub fn settings(&self) -> BoardSettings {
        self.settings
    }

    /// First page, evaluated against today's local date.
    pub async fn list(&self, term: &str) -> Result<Vec<BoardEntry>, BoardError> {
        self.list_as_of(term, Local::now().date_naive()).await
    }

    pub async fn list_as_of(
        &self,
        term: &str,
        today: NaiveDate,
    ) -> Result<Vec<BoardEntry>, BoardError> {
        self.fetch(term, 0, today).await
    }

    /// Zero-based page of `page_size` entries.
    pub async fn list_page(&self, term: &str, page: usize) -> Result<Vec<BoardEntry>, BoardError> {
        self.fetch(term, page, Local::now().date_naive()).await
    }

    async fn fetch(
        &self,
        term: &str,
        page: usize,
        today: NaiveDate,
    ) -> Result<Vec<BoardEntry>, BoardError> {
        let limit = self.settings.page_size;
        let offset = page.saturating_mul(limit);

        let codes = match CatalogQuery::parse(term) {
            CatalogQuery::TooShort => None,
            query => {
                let codes: Vec<ProductCode> = query
                    .resolve(self.catalog.as_ref(), self.settings.code_resolution_limit)
                    .await?
                    .into_iter()
                    .map(|product| product.code)
                    .collect();
                if codes.is_empty() {
                    debug!(%term, "board filter matched no catalog products");
                    return Ok(Vec::new());
                }
                Some(codes)
            }
        };

        let listings = self
            .listings
            .query_approved(codes.as_deref(), limit, offset)
            .await?;

        let mut products: BTreeMap<ProductCode, Option<CatalogProduct>> = BTreeMap::new();
        let mut entries = Vec::with_capacity(listings.len());
        for listing in listings {
            if !listing.status.is_visible_on_board() {
                continue;
            }
            let product = match products.get(&listing.product_code) {
                Some(product) => product.clone(),
                None => {
                    let product = self.catalog.find_by_code(listing.product_code).await?;
                    products.insert(listing.product_code, product.clone());
                    product
                }
            };
            let is_expired = listing.expiry_date < today;
            entries.push(BoardEntry {
                listing,
                product,
                is_expired,
            });
        }

        debug!(%term, page, entries = entries.len(), "loaded board page");
        Ok(entries)
    }
}

impl std::fmt::Debug for BoardQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardQuery")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
