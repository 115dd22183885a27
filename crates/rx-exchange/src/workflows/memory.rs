//! In-memory adapters for every marketplace port. Used by the API service, the
//! demo command, and tests.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::catalog::{
    load_catalog, parse_catalog, CatalogError, CatalogImportError, CatalogProduct, CatalogReader,
    ProductCode,
};
use super::listing::{
    Listing, ListingId, ListingStatus, ListingStore, NewListing, ObjectStorage, PersistenceError,
    PhotoFile, StorageError,
};
use super::seller::{IdentityError, IdentityProvider, SellerId, SessionUser, VerificationStatus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Catalog held in memory. Name matches rank prefix hits first, then by name.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: Vec<CatalogProduct>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryCatalog {
    pub fn from_products(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        Self {
            products: products.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogImportError> {
        Ok(Self::from_products(parse_catalog(reader)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogImportError> {
        Ok(Self::from_products(load_catalog(path)?))
    }

    /// Delays every lookup, simulating a remote catalog.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn begin_lookup(&self) -> Result<(), CatalogError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn find_by_code(
        &self,
        code: ProductCode,
    ) -> Result<Option<CatalogProduct>, CatalogError> {
        self.begin_lookup().await?;
        Ok(self
            .products
            .iter()
            .find(|product| product.code == code)
            .cloned())
    }

    async fn find_by_name(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<CatalogProduct>, CatalogError> {
        self.begin_lookup().await?;
        let needle = text.to_lowercase();
        let mut matches: Vec<(bool, &CatalogProduct)> = self
            .products
            .iter()
            .filter_map(|product| {
                let name = product.name.to_lowercase();
                name.contains(&needle)
                    .then(|| (!name.starts_with(&needle), product))
            })
            .collect();
        matches.sort_by(|(a_rank, a), (b_rank, b)| {
            a_rank.cmp(b_rank).then_with(|| a.name.cmp(&b.name))
        });
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|(_, product)| product.clone())
            .collect())
    }
}

/// Object storage keeping only object paths and sizes.
#[derive(Debug)]
pub struct InMemoryObjectStorage {
    base_url: String,
    objects: Mutex<BTreeMap<String, usize>>,
    failing: Mutex<Vec<(String, StorageError)>>,
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new("memory://listing-images")
    }
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(Vec::new()),
        }
    }

    /// Makes every put whose path contains `fragment` fail with `error`.
    pub fn fail_paths_containing(&self, fragment: impl Into<String>, error: StorageError) {
        lock(&self.failing).push((fragment.into(), error));
    }

    pub fn clear_failures(&self) {
        lock(&self.failing).clear();
    }

    /// Paths stored so far.
    pub fn paths(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }

    pub fn object_size(&self, path: &str) -> Option<usize> {
        lock(&self.objects).get(path).copied()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(&self, path: &str, file: &PhotoFile) -> Result<String, StorageError> {
        let failure = lock(&self.failing)
            .iter()
            .find(|(fragment, _)| path.contains(fragment.as_str()))
            .map(|(_, error)| error.clone());
        if let Some(error) = failure {
            return Err(error);
        }

        lock(&self.objects).insert(path.to_string(), file.size());
        Ok(format!("{}/{path}", self.base_url))
    }
}

/// Listing table. `set_status` stands in for the moderation actor.
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    rows: Mutex<Vec<Listing>>,
    sequence: AtomicU64,
    fail_next_insert: AtomicBool,
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Moderation decision. Returns false when no listing has that id.
    pub fn set_status(&self, id: &ListingId, status: ListingStatus) -> bool {
        let mut rows = lock(&self.rows);
        match rows.iter_mut().find(|listing| &listing.id == id) {
            Some(listing) => {
                listing.status = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &ListingId) -> Option<Listing> {
        lock(&self.rows).iter().find(|listing| &listing.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Listing> {
        lock(&self.rows).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.rows).is_empty()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn insert(&self, listing: NewListing) -> Result<ListingId, PersistenceError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("listing table offline".to_string()));
        }
        if listing.quantity == 0 {
            return Err(PersistenceError::Constraint("quantity must be positive".to_string()));
        }

        let id = ListingId(format!(
            "lst-{:06}",
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        ));
        lock(&self.rows).push(Listing::from_new(id.clone(), listing));
        Ok(id)
    }

    async fn query_approved(
        &self,
        product_codes: Option<&[ProductCode]>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Listing>, PersistenceError> {
        let rows = lock(&self.rows);
        let mut approved: Vec<&Listing> = rows
            .iter()
            .filter(|listing| listing.status == ListingStatus::Approved)
            .filter(|listing| {
                product_codes.map_or(true, |codes| codes.contains(&listing.product_code))
            })
            .collect();
        approved.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(approved
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Identity collaborator with a fixed current user and editable statuses.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    current: Mutex<Option<SessionUser>>,
    statuses: Mutex<BTreeMap<SellerId, VerificationStatus>>,
    unavailable: AtomicBool,
}

impl StaticIdentity {
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(
        seller_id: impl Into<String>,
        email: impl Into<String>,
        status: VerificationStatus,
    ) -> Self {
        let identity = Self::default();
        let id = SellerId(seller_id.into());
        lock(&identity.statuses).insert(id.clone(), status);
        *lock(&identity.current) = Some(SessionUser {
            id,
            email: email.into(),
        });
        identity
    }

    /// External verification review outcome.
    pub fn set_status(&self, seller_id: &SellerId, status: VerificationStatus) {
        lock(&self.statuses).insert(seller_id.clone(), status);
    }

    pub fn sign_out(&self) {
        *lock(&self.current) = None;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(IdentityError::Unavailable("identity service offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self) -> Result<Option<SessionUser>, IdentityError> {
        self.ensure_available()?;
        Ok(lock(&self.current).clone())
    }

    async fn verification_status(
        &self,
        user_id: &SellerId,
    ) -> Result<VerificationStatus, IdentityError> {
        self.ensure_available()?;
        Ok(lock(&self.statuses)
            .get(user_id)
            .copied()
            .unwrap_or_default())
    }
}
