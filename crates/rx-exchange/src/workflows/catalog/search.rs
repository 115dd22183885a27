//! Incremental catalog search used while a seller picks the product to list.
//!
//! Every keystroke restarts a quiet-period timer; only the last term typed
//! within the window reaches the catalog. Each input bumps a generation
//! counter and a response is published only if its generation is still the
//! current one when it resolves, so a slow, superseded lookup can never
//! overwrite the results of a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::domain::{CatalogProduct, CatalogQuery};
use super::repository::{search_catalog, CatalogError, CatalogReader};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_RESULT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

/// State visible to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchSnapshot {
    pub query: String,
    pub results: Vec<CatalogProduct>,
    pub searching: bool,
    pub locked: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("a product is already selected; clear the selection before searching again")]
    SelectionLocked,
    #[error("result {index} is not in the current result list")]
    UnknownResult { index: usize },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct DrugCatalogSearch {
    catalog: Arc<dyn CatalogReader>,
    settings: SearchSettings,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchSnapshot>>,
    pending: Option<JoinHandle<()>>,
    selected: Option<CatalogProduct>,
}

impl DrugCatalogSearch {
    pub fn new(catalog: Arc<dyn CatalogReader>, settings: SearchSettings) -> Self {
        let (state, _) = watch::channel(SearchSnapshot::default());
        Self {
            catalog,
            settings,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            pending: None,
            selected: None,
        }
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    pub fn selected(&self) -> Option<&CatalogProduct> {
        self.selected.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.selected.is_some()
    }

    /// Records a keystroke. Must be called from within a tokio runtime.
    pub fn input(&mut self, query: &str) -> Result<(), SearchError> {
        if self.selected.is_some() {
            return Err(SearchError::SelectionLocked);
        }

        self.cancel_pending();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let parsed = CatalogQuery::parse(query);

        if !parsed.is_lookup() {
            self.state.send_modify(|snapshot| {
                snapshot.query = query.to_string();
                snapshot.results.clear();
                snapshot.searching = false;
            });
            return Ok(());
        }

        self.state.send_modify(|snapshot| {
            snapshot.query = query.to_string();
            snapshot.searching = true;
        });

        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let SearchSettings { debounce, limit } = self.settings;
        let query = query.to_string();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            debug!(%query, generation, "issuing catalog search");
            let outcome = parsed.resolve(catalog.as_ref(), limit).await;

            let applied = state.send_if_modified(|snapshot| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                snapshot.searching = false;
                match &outcome {
                    Ok(results) => snapshot.results = results.clone(),
                    Err(_) => snapshot.results.clear(),
                }
                true
            });

            match outcome {
                Err(err) if applied => warn!(%query, error = %err, "catalog search failed"),
                _ if !applied => debug!(%query, generation, "discarded stale search response"),
                _ => {}
            }
        }));

        Ok(())
    }

    /// Locks the query to the result at `index` of the current result list.
    pub fn select(&mut self, index: usize) -> Result<CatalogProduct, SearchError> {
        if self.selected.is_some() {
            return Err(SearchError::SelectionLocked);
        }

        let product = self
            .state
            .borrow()
            .results
            .get(index)
            .cloned()
            .ok_or(SearchError::UnknownResult { index })?;

        self.cancel_pending();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SearchSnapshot {
            query: product.name.clone(),
            results: Vec::new(),
            searching: false,
            locked: true,
        });
        self.selected = Some(product.clone());
        Ok(product)
    }

    pub fn clear_selection(&mut self) {
        self.cancel_pending();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.selected = None;
        self.state.send_replace(SearchSnapshot::default());
    }

    /// Immediate lookup that bypasses the debounce and leaves visible state alone.
    pub async fn search(&self, query: &str) -> Result<Vec<CatalogProduct>, SearchError> {
        Ok(search_catalog(self.catalog.as_ref(), query, self.settings.limit).await?)
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DrugCatalogSearch {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl std::fmt::Debug for DrugCatalogSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrugCatalogSearch")
            .field("settings", &self.settings)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}
