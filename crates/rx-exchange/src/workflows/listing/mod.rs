//! Listing submission and the public board.

pub mod board;
pub mod domain;
pub mod draft;
pub mod media;
pub mod store;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use board::{BoardEntry, BoardError, BoardQuery, BoardSettings};
pub use domain::{
    Condition, Listing, ListingId, ListingStatus, NewListing, OpenedState, PhotoRole,
};
pub use draft::{ListingDraft, PhotoFile, PhotoSlot, PreviewHandle, PreviewRegistry};
pub use media::{upload_path, MediaUploadCoordinator, ObjectStorage, StorageError, UploadError};
pub use store::{ListingStore, PersistenceError};
pub use validation::{Field, FieldErrors, PhotoPolicy};
pub use wizard::{
    CommitError, CommitReceipt, SubmissionWizard, WizardOpenError, WizardSettings, WizardStep,
};
