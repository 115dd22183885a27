//! Uploads the three listing photos to object storage.
//!
//! Files are written under `<seller>/<timestamp>_<role>.<ext>`. Every upload
//! runs as its own task and is awaited to completion; the batch succeeds only
//! when all three objects were stored. Objects written before a failure are
//! left in storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use super::domain::PhotoRole;
use super::draft::PhotoFile;
use crate::workflows::seller::SellerId;

/// Object storage collaborator for listing images.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `file` at `path` and returns its public URL.
    async fn put(&self, path: &str, file: &PhotoFile) -> Result<String, StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("storage rejected the object: {0}")]
    Rejected(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("failed to upload the {role} photo: {source}")]
    Storage {
        role: PhotoRole,
        #[source]
        source: StorageError,
    },
    #[error("upload of the {role} photo was interrupted")]
    Interrupted { role: PhotoRole },
}

impl UploadError {
    pub fn role(&self) -> PhotoRole {
        match self {
            UploadError::Storage { role, .. } | UploadError::Interrupted { role } => *role,
        }
    }
}

/// Builds the storage path for one photo.
pub fn upload_path(
    seller_id: &SellerId,
    timestamp_millis: i64,
    role: PhotoRole,
    file: &PhotoFile,
) -> String {
    format!(
        "{seller_id}/{timestamp_millis}_{}.{}",
        role.storage_label(),
        file.extension()
    )
}

#[derive(Clone)]
pub struct MediaUploadCoordinator {
    storage: Arc<dyn ObjectStorage>,
}

impl MediaUploadCoordinator {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Uploads the photos in role order using the current time as timestamp.
    pub async fn upload(
        &self,
        seller_id: &SellerId,
        files: &[PhotoFile; 3],
    ) -> Result<[String; 3], UploadError> {
        self.upload_at(seller_id, files, Utc::now().timestamp_millis())
            .await
    }

    pub async fn upload_at(
        &self,
        seller_id: &SellerId,
        files: &[PhotoFile; 3],
        timestamp_millis: i64,
    ) -> Result<[String; 3], UploadError> {
        let handles = PhotoRole::ALL.map(|role| {
            let storage = Arc::clone(&self.storage);
            let file = files[role.index()].clone();
            let path = upload_path(seller_id, timestamp_millis, role, &file);
            tokio::spawn(async move {
                let outcome = storage.put(&path, &file).await;
                (path, outcome)
            })
        });

        let mut urls: [Option<String>; 3] = Default::default();
        let mut failure = None;

        for (role, handle) in PhotoRole::ALL.into_iter().zip(handles) {
            match handle.await {
                Ok((path, Ok(url))) => {
                    debug!(%seller_id, %path, "stored listing photo");
                    urls[role.index()] = Some(url);
                }
                Ok((path, Err(source))) => {
                    warn!(%seller_id, %path, error = %source, "listing photo upload failed");
                    failure.get_or_insert(UploadError::Storage { role, source });
                }
                Err(join_error) => {
                    warn!(%seller_id, role = role.storage_label(), error = %join_error, "listing photo upload task ended abnormally");
                    failure.get_or_insert(UploadError::Interrupted { role });
                }
            }
        }

        if let Some(error) = failure {
            let orphaned = urls.iter().flatten().count();
            if orphaned > 0 {
                warn!(%seller_id, orphaned, "photos stored before the failure were left in storage");
            }
            return Err(error);
        }

        let [full, lot, detail] = urls;
        match (full, lot, detail) {
            (Some(full), Some(lot), Some(detail)) => Ok([full, lot, detail]),
            _ => Err(UploadError::Interrupted {
                role: PhotoRole::FullView,
            }),
        }
    }
}

impl std::fmt::Debug for MediaUploadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUploadCoordinator").finish_non_exhaustive()
    }
}
