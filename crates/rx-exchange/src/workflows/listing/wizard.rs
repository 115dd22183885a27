//! Three-step listing submission wizard.
//!
//! Steps only move forward after their own validation passes. The final
//! commit re-checks every step, asks the verification gate again, uploads
//! the photos and only then persists a `pending` listing. A failed commit
//! keeps the draft so the seller can retry.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::domain::{Condition, ListingId, ListingStatus, NewListing, OpenedState, PhotoRole};
use super::draft::{ListingDraft, PhotoFile, PreviewRegistry};
use super::media::{MediaUploadCoordinator, UploadError};
use super::store::{ListingStore, PersistenceError};
use super::validation::{Field, FieldErrors, PhotoPolicy};
use crate::workflows::catalog::{
    CatalogProduct, DrugCatalogSearch, SearchError, SearchSettings, SearchSnapshot,
};
use crate::workflows::seller::{
    AuthorizationError, BlockingNotice, GateDecision, IdentityError, SessionContext,
    VerificationGate,
};
use crate::workflows::MarketplacePorts;

pub const SUBMITTED_MESSAGE: &str =
    "Listing submitted. It will appear on the board after moderator approval.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ProductSelection,
    DetailEntry,
    PhotoUpload,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::ProductSelection,
        WizardStep::DetailEntry,
        WizardStep::PhotoUpload,
    ];

    pub const fn index(self) -> usize {
        match self {
            WizardStep::ProductSelection => 0,
            WizardStep::DetailEntry => 1,
            WizardStep::PhotoUpload => 2,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::ProductSelection => "Select product",
            WizardStep::DetailEntry => "Enter details",
            WizardStep::PhotoUpload => "Upload photos",
        }
    }

    pub const fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::ProductSelection => Some(WizardStep::DetailEntry),
            WizardStep::DetailEntry => Some(WizardStep::PhotoUpload),
            WizardStep::PhotoUpload => None,
        }
    }

    pub const fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::ProductSelection => None,
            WizardStep::DetailEntry => Some(WizardStep::ProductSelection),
            WizardStep::PhotoUpload => Some(WizardStep::DetailEntry),
        }
    }

    /// Checks the fields owned by this step.
    pub fn validate(self, draft: &ListingDraft, policy: &PhotoPolicy) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            WizardStep::ProductSelection => {
                if draft.selected_product().is_none() {
                    errors.insert(Field::Product, "Search for and select a product.");
                }
            }
            WizardStep::DetailEntry => {
                if !draft.quantity().is_some_and(|quantity| quantity > 0) {
                    errors.insert(Field::Quantity, "Enter a quantity of at least 1.");
                }
                if draft.expiry_date().is_none() {
                    errors.insert(Field::ExpiryDate, "Select an expiry date.");
                }
            }
            WizardStep::PhotoUpload => {
                for slot in draft.photos() {
                    let role = slot.role();
                    match slot.file() {
                        None => {
                            errors.insert(Field::Photo(role), format!("Upload the {role} photo."))
                        }
                        Some(file) => {
                            if let Err(message) = policy.check(role, file) {
                                errors.insert(Field::Photo(role), message);
                            }
                        }
                    }
                }
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardSettings {
    pub search: SearchSettings,
    pub photos: PhotoPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("the listing is incomplete: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("photos were uploaded but the listing could not be saved: {0}")]
    Persistence(#[from] PersistenceError),
}

impl CommitError {
    /// Whether retrying the same draft can succeed without seller edits.
    pub fn is_retryable(&self) -> bool {
        match self {
            CommitError::Validation(_) => false,
            CommitError::Unauthorized(AuthorizationError::Identity(_)) => true,
            CommitError::Unauthorized(_) => false,
            CommitError::Upload(_) | CommitError::Persistence(_) => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardOpenError {
    #[error("{}", .0.explanation)]
    Blocked(BlockingNotice),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReceipt {
    pub listing_id: ListingId,
    pub image_urls: [String; 3],
    pub status: ListingStatus,
    pub message: &'static str,
}

pub struct SubmissionWizard {
    step: WizardStep,
    draft: ListingDraft,
    search: DrugCatalogSearch,
    errors: FieldErrors,
    policy: PhotoPolicy,
    gate: VerificationGate,
    media: MediaUploadCoordinator,
    listings: Arc<dyn ListingStore>,
}

impl SubmissionWizard {
    /// Opens a wizard for the session's seller. Sellers who are not verified
    /// get the blocking notice instead.
    pub async fn open(
        ports: &MarketplacePorts,
        settings: WizardSettings,
        session: &SessionContext,
    ) -> Result<Self, WizardOpenError> {
        let gate = VerificationGate::new(Arc::clone(&ports.identity));
        match gate.evaluate(session).await? {
            GateDecision::Permitted { seller_id } => {
                debug!(%seller_id, "opened submission wizard");
            }
            GateDecision::Blocked(notice) => return Err(WizardOpenError::Blocked(notice)),
        }

        Ok(Self {
            step: WizardStep::ProductSelection,
            draft: ListingDraft::new(PreviewRegistry::new()),
            search: DrugCatalogSearch::new(Arc::clone(&ports.catalog), settings.search),
            errors: FieldErrors::new(),
            policy: settings.photos,
            gate,
            media: MediaUploadCoordinator::new(Arc::clone(&ports.storage)),
            listings: Arc::clone(&ports.listings),
        })
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn progress_percent(&self) -> u8 {
        let completed = self.step.index() + 1;
        (completed * 100 / WizardStep::ALL.len()) as u8
    }

    pub fn search_input(&mut self, query: &str) -> Result<(), SearchError> {
        self.search.input(query)
    }

    pub fn subscribe_search(&self) -> watch::Receiver<SearchSnapshot> {
        self.search.subscribe()
    }

    pub fn search_snapshot(&self) -> SearchSnapshot {
        self.search.snapshot()
    }

    /// Picks a result from the current search list and locks the search field.
    pub fn select_product(&mut self, index: usize) -> Result<CatalogProduct, SearchError> {
        let product = self.search.select(index)?;
        self.draft.select_product(product.clone());
        self.errors.remove(Field::Product);
        Ok(product)
    }

    pub fn clear_product(&mut self) {
        self.search.clear_selection();
        self.draft.clear_product();
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.draft.set_quantity(quantity);
        self.errors.remove(Field::Quantity);
    }

    pub fn set_expiry_date(&mut self, expiry_date: NaiveDate) {
        self.draft.set_expiry_date(expiry_date);
        self.errors.remove(Field::ExpiryDate);
    }

    pub fn set_opened_state(&mut self, opened_state: OpenedState) {
        self.draft.set_opened_state(opened_state);
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.draft.set_condition(condition);
    }

    pub fn attach_photo(&mut self, role: PhotoRole, file: PhotoFile) -> Result<(), FieldErrors> {
        match self.draft.attach_photo(role, file, &self.policy) {
            Ok(()) => {
                self.errors.remove(Field::Photo(role));
                Ok(())
            }
            Err(message) => {
                self.errors.insert(Field::Photo(role), message.clone());
                Err(FieldErrors::single(Field::Photo(role), message))
            }
        }
    }

    pub fn remove_photo(&mut self, role: PhotoRole) {
        self.draft.remove_photo(role);
    }

    /// Validates the current step and moves to the next one. On failure the
    /// step is unchanged and the errors are returned and kept.
    pub fn advance(&mut self) -> Result<WizardStep, FieldErrors> {
        let errors = self.step.validate(&self.draft, &self.policy);
        if !errors.is_empty() {
            debug!(step = ?self.step, errors = errors.len(), "step validation failed");
            self.errors = errors.clone();
            return Err(errors);
        }

        self.errors.clear();
        if let Some(next) = self.step.next() {
            debug!(from = ?self.step, to = ?next, "advanced wizard step");
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn retreat(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Discards the draft, the search and any errors and returns to the first step.
    pub fn reset(&mut self) {
        self.draft.reset();
        self.search.clear_selection();
        self.errors.clear();
        self.step = WizardStep::ProductSelection;
    }

    pub async fn commit(&mut self, session: &SessionContext) -> Result<CommitReceipt, CommitError> {
        let mut errors = FieldErrors::new();
        for step in WizardStep::ALL {
            errors.merge(step.validate(&self.draft, &self.policy));
        }
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(CommitError::Validation(errors));
        }

        let Some(contents) = self.draft.contents() else {
            let errors = FieldErrors::single(Field::Product, "Search for and select a product.");
            return Err(CommitError::Validation(errors));
        };

        let seller_id = self.gate.authorize(session).await?;
        let image_urls = self.media.upload(&seller_id, &contents.photos).await?;

        let listing = NewListing {
            product_code: contents.product.code,
            seller_id: seller_id.clone(),
            quantity: contents.quantity,
            expiry_date: contents.expiry_date,
            opened_state: contents.opened_state,
            condition: contents.condition,
            image_urls: image_urls.clone(),
            status: ListingStatus::Pending,
            created_at: Utc::now(),
        };

        let listing_id = match self.listings.insert(listing).await {
            Ok(listing_id) => listing_id,
            Err(error) => {
                warn!(
                    %seller_id,
                    orphaned = ?image_urls,
                    error = %error,
                    "listing insert failed after photo upload"
                );
                return Err(CommitError::Persistence(error));
            }
        };

        info!(
            %seller_id,
            %listing_id,
            product_code = %contents.product.code,
            "listing submitted for moderation"
        );
        self.reset();

        Ok(CommitReceipt {
            listing_id,
            image_urls,
            status: ListingStatus::Pending,
            message: SUBMITTED_MESSAGE,
        })
    }
}

impl std::fmt::Debug for SubmissionWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionWizard")
            .field("step", &self.step)
            .field("draft", &self.draft)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
