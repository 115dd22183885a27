//! Read-only product catalog: matching rules, CSV import, and the debounced
//! search used by the submission wizard.

pub mod domain;
pub mod import;
pub mod repository;
pub mod search;


pub use domain::{CatalogProduct, CatalogQuery, Classification, ProductCode, MIN_QUERY_CHARS};
pub use import::{load_catalog, parse_catalog, CatalogImportError};
pub use repository::{search_catalog, CatalogError, CatalogReader};
pub use search::{DrugCatalogSearch, SearchError, SearchSettings, SearchSnapshot};
