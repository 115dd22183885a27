use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::catalog::{CatalogProduct, Classification, ProductCode};
use crate::workflows::listing::{
    Condition, ListingId, ListingStatus, ListingStore, NewListing, OpenedState, PhotoFile,
    PhotoRole, SubmissionWizard, WizardSettings,
};
use crate::workflows::memory::{
    InMemoryCatalog, InMemoryListingStore, InMemoryObjectStorage, StaticIdentity,
};
use crate::workflows::seller::{SellerId, SessionContext, VerificationStatus};
use crate::workflows::MarketplacePorts;

pub(super) const SELLER: &str = "pharm-001";

pub(super) fn product(code: u64, name: &str, price: &str, unit: &str) -> CatalogProduct {
    CatalogProduct {
        code: ProductCode(code),
        name: name.to_string(),
        manufacturer: "한국얀센".to_string(),
        ceiling_price: price.to_string(),
        unit: unit.to_string(),
        classification: Classification::Otc,
    }
}

pub(super) fn tylenol() -> CatalogProduct {
    product(12345, "타이레놀정", "51", "1정")
}

pub(super) fn products() -> Vec<CatalogProduct> {
    vec![
        tylenol(),
        product(12346, "타이레놀이알서방정", "77", "1정"),
        product(23456, "어린이부루펜시럽", "1,830", "100mL"),
        product(34567, "베아제정", "98", "1정"),
    ]
}

pub(super) fn seller() -> SellerId {
    SellerId(SELLER.to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn jpeg(name: &str) -> PhotoFile {
    PhotoFile::new(name, mime::IMAGE_JPEG, vec![0xFF_u8; 2048])
}

pub(super) fn photo_set() -> [(PhotoRole, PhotoFile); 3] {
    [
        (PhotoRole::FullView, jpeg("box.jpg")),
        (PhotoRole::ExpiryLot, PhotoFile::from_name("lot.PNG", vec![0x89_u8; 1024])),
        (PhotoRole::Detail, jpeg("blister.jpeg")),
    ]
}

pub(super) struct Harness {
    pub(super) catalog: Arc<InMemoryCatalog>,
    pub(super) storage: Arc<InMemoryObjectStorage>,
    pub(super) listings: Arc<InMemoryListingStore>,
    pub(super) identity: Arc<StaticIdentity>,
}

impl Harness {
    pub(super) fn new(status: VerificationStatus) -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalog::from_products(products())),
            storage: Arc::new(InMemoryObjectStorage::new("https://cdn.example/listing-images")),
            listings: Arc::new(InMemoryListingStore::new()),
            identity: Arc::new(StaticIdentity::signed_in(
                SELLER,
                "owner@pharmacy.example",
                status,
            )),
        }
    }

    pub(super) fn verified() -> Self {
        Self::new(VerificationStatus::Verified)
    }

    pub(super) fn ports(&self) -> MarketplacePorts {
        MarketplacePorts {
            catalog: self.catalog.clone(),
            storage: self.storage.clone(),
            listings: self.listings.clone(),
            identity: self.identity.clone(),
        }
    }

    pub(super) async fn session(&self) -> SessionContext {
        SessionContext::establish(self.identity.as_ref())
            .await
            .expect("session established")
    }

    pub(super) async fn open_wizard(&self) -> SubmissionWizard {
        let session = self.session().await;
        SubmissionWizard::open(&self.ports(), WizardSettings::default(), &session)
            .await
            .expect("verified seller opens the wizard")
    }

    /// Inserts a listing and moves it to `status` the way moderation would.
    pub(super) async fn seed_listing(
        &self,
        product_code: u64,
        created_at: DateTime<Utc>,
        expiry_date: NaiveDate,
        status: ListingStatus,
    ) -> ListingId {
        let id = self
            .listings
            .insert(NewListing {
                product_code: ProductCode(product_code),
                seller_id: seller(),
                quantity: 3,
                expiry_date,
                opened_state: OpenedState::Unopened,
                condition: Condition::B,
                image_urls: [
                    format!("https://cdn.example/{product_code}/full.jpg"),
                    format!("https://cdn.example/{product_code}/lot.jpg"),
                    format!("https://cdn.example/{product_code}/detail.jpg"),
                ],
                status: ListingStatus::Pending,
                created_at,
            })
            .await
            .expect("listing inserted");
        self.listings.set_status(&id, status);
        id
    }
}

/// Searches, waits for the debounced results, and selects the first hit.
pub(super) async fn choose_product(wizard: &mut SubmissionWizard, query: &str) {
    let mut receiver = wizard.subscribe_search();
    wizard.search_input(query).expect("search accepted");
    receiver
        .wait_for(|snapshot| !snapshot.searching)
        .await
        .expect("search state sender alive");
    wizard.select_product(0).expect("first result selectable");
}

/// Walks a fresh wizard through every step with valid input.
pub(super) async fn completed_wizard(harness: &Harness) -> SubmissionWizard {
    let mut wizard = harness.open_wizard().await;
    choose_product(&mut wizard, "12345").await;
    wizard.advance().expect("product step valid");

    wizard.set_quantity(5);
    wizard.set_expiry_date(date(2026, 8, 31));
    wizard.set_condition(Condition::A);
    wizard.advance().expect("detail step valid");

    for (role, file) in photo_set() {
        wizard.attach_photo(role, file).expect("photo accepted");
    }
    wizard
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
