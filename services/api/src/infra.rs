use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rx_exchange::config::MarketplaceConfig;
use rx_exchange::error::AppError;
use rx_exchange::workflows::catalog::{CatalogProduct, Classification, ProductCode};
use rx_exchange::workflows::memory::{
    InMemoryCatalog, InMemoryListingStore, InMemoryObjectStorage, StaticIdentity,
};
use rx_exchange::workflows::seller::VerificationStatus;
use rx_exchange::workflows::MarketplacePorts;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Concrete in-memory adapters kept alongside the type-erased ports so the
/// demo can play the moderator.
pub(crate) struct InMemoryMarketplace {
    pub(crate) catalog: Arc<InMemoryCatalog>,
    pub(crate) storage: Arc<InMemoryObjectStorage>,
    pub(crate) listings: Arc<InMemoryListingStore>,
    pub(crate) identity: Arc<StaticIdentity>,
}

impl InMemoryMarketplace {
    pub(crate) fn build(
        config: &MarketplaceConfig,
        identity: StaticIdentity,
    ) -> Result<Self, AppError> {
        let catalog = match &config.catalog_csv {
            Some(path) => {
                let catalog = InMemoryCatalog::from_path(path)?;
                info!(path = %path.display(), products = catalog.len(), "loaded catalog export");
                catalog
            }
            None => InMemoryCatalog::from_products(seed_catalog()),
        };

        Ok(Self {
            catalog: Arc::new(catalog),
            storage: Arc::new(InMemoryObjectStorage::new(config.storage_base_url.clone())),
            listings: Arc::new(InMemoryListingStore::new()),
            identity: Arc::new(identity),
        })
    }

    pub(crate) fn ports(&self) -> MarketplacePorts {
        MarketplacePorts {
            catalog: self.catalog.clone(),
            storage: self.storage.clone(),
            listings: self.listings.clone(),
            identity: self.identity.clone(),
        }
    }
}

fn product(
    code: u64,
    name: &str,
    manufacturer: &str,
    ceiling_price: &str,
    unit: &str,
    classification: Classification,
) -> CatalogProduct {
    CatalogProduct {
        code: ProductCode(code),
        name: name.to_string(),
        manufacturer: manufacturer.to_string(),
        ceiling_price: ceiling_price.to_string(),
        unit: unit.to_string(),
        classification,
    }
}

/// Small built-in catalog used when no export is configured.
pub(crate) fn seed_catalog() -> Vec<CatalogProduct> {
    use Classification::{Otc, Prescription};

    vec![
        product(12345, "타이레놀정", "한국얀센", "51", "1정", Otc),
        product(12346, "타이레놀이알서방정", "한국얀센", "77", "1정", Otc),
        product(23456, "어린이부루펜시럽", "삼일제약", "1,830", "100mL", Otc),
        product(34567, "베아제정", "대웅제약", "98", "1정", Otc),
        product(45678, "노바스크정5mg", "한국비아트리스", "453", "1정", Prescription),
        product(56789, "리피토정10mg", "한국비아트리스", "612", "1정", Prescription),
        product(67890, "아모잘탄정5/50mg", "한미약품", "733", "1정", Prescription),
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_verification_status(raw: &str) -> Result<VerificationStatus, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "unverified" => Ok(VerificationStatus::Unverified),
        "pending" => Ok(VerificationStatus::Pending),
        "verified" => Ok(VerificationStatus::Verified),
        "rejected" => Ok(VerificationStatus::Rejected),
        other => Err(format!(
            "unknown verification status '{other}' (expected unverified, pending, verified, or rejected)"
        )),
    }
}
