pub mod catalog;
pub mod listing;
pub mod memory;
pub mod router;
pub mod seller;

use std::sync::Arc;

use catalog::CatalogReader;
use listing::{ListingStore, ObjectStorage};
use seller::IdentityProvider;

/// External collaborators the marketplace workflows run against.
#[derive(Clone)]
pub struct MarketplacePorts {
    pub catalog: Arc<dyn CatalogReader>,
    pub storage: Arc<dyn ObjectStorage>,
    pub listings: Arc<dyn ListingStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for MarketplacePorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplacePorts").finish_non_exhaustive()
    }
}
