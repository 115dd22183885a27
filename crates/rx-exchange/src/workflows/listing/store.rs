use async_trait::async_trait;

use super::domain::{Listing, ListingId, NewListing};
use crate::workflows::catalog::ProductCode;

/// Persistence collaborator for listings.
///
/// Listings are only ever created here with status `pending`; moving them to
/// `approved` or `rejected` is the moderation actor's job.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, listing: NewListing) -> Result<ListingId, PersistenceError>;

    /// Approved listings, newest first. `product_codes` of `None` means no
    /// product filter; `Some(&[])` must never reach the store.
    async fn query_approved(
        &self,
        product_codes: Option<&[ProductCode]>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Listing>, PersistenceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    #[error("listing violates a store constraint: {0}")]
    Constraint(String),
    #[error("listing store unavailable: {0}")]
    Unavailable(String),
}
