use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use mime::Mime;

use super::domain::{Condition, OpenedState, PhotoRole};
use super::validation::PhotoPolicy;
use crate::workflows::catalog::CatalogProduct;

/// Photo picked by the seller. Bytes are shared so a commit can hand them to
/// upload tasks while the draft keeps its copy for a retry.
#[derive(Clone)]
pub struct PhotoFile {
    name: String,
    content_type: Mime,
    bytes: Arc<[u8]>,
}

impl PhotoFile {
    pub fn new(name: impl Into<String>, content_type: Mime, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    /// Builds a file whose content type is guessed from its name.
    pub fn from_name(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let content_type = mime_guess::from_path(&name).first_or_octet_stream();
        Self::new(name, content_type, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Extension used for the stored object: the file name's when it is plain
    /// ASCII alphanumeric, else one registered for the content type, else `bin`.
    pub fn extension(&self) -> String {
        if let Some((stem, ext)) = self.name.rsplit_once('.') {
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return ext.to_ascii_lowercase();
            }
        }

        mime_guess::get_mime_extensions(&self.content_type)
            .and_then(|extensions| extensions.first())
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| "bin".to_string())
    }
}

impl fmt::Debug for PhotoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type.essence_str())
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Issues preview handles and tracks the ones still alive.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: AtomicU64,
    live: Mutex<BTreeMap<u64, String>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn issue(self: &Arc<Self>, file: &PhotoFile) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let uri = format!("preview://{id}/{}", file.name());
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, uri.clone());
        PreviewHandle {
            id,
            uri,
            registry: Arc::clone(self),
        }
    }

    pub fn live_handles(&self) -> usize {
        self.live.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, id: u64) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Transient preview of a picked file. Released when dropped, which happens
/// when its slot is replaced or cleared and when the draft is reset.
pub struct PreviewHandle {
    id: u64,
    uri: String,
    registry: Arc<PreviewRegistry>,
}

impl PreviewHandle {
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("uri", &self.uri)
            .finish()
    }
}

#[derive(Debug)]
pub struct PhotoSlot {
    role: PhotoRole,
    file: Option<PhotoFile>,
    preview: Option<PreviewHandle>,
}

impl PhotoSlot {
    fn empty(role: PhotoRole) -> Self {
        Self {
            role,
            file: None,
            preview: None,
        }
    }

    pub fn role(&self) -> PhotoRole {
        self.role
    }

    pub fn file(&self) -> Option<&PhotoFile> {
        self.file.as_ref()
    }

    pub fn preview_uri(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewHandle::uri)
    }

    pub fn is_filled(&self) -> bool {
        self.file.is_some()
    }
}

/// Everything a commit needs, pulled from a complete draft.
#[derive(Debug, Clone)]
pub(crate) struct DraftContents {
    pub(crate) product: CatalogProduct,
    pub(crate) quantity: u32,
    pub(crate) expiry_date: NaiveDate,
    pub(crate) opened_state: OpenedState,
    pub(crate) condition: Condition,
    pub(crate) photos: [PhotoFile; 3],
}

/// In-progress listing for one wizard session. Never persisted.
#[derive(Debug)]
pub struct ListingDraft {
    selected_product: Option<CatalogProduct>,
    quantity: Option<u32>,
    expiry_date: Option<NaiveDate>,
    opened_state: OpenedState,
    condition: Condition,
    photos: [PhotoSlot; 3],
    previews: Arc<PreviewRegistry>,
}

impl ListingDraft {
    pub fn new(previews: Arc<PreviewRegistry>) -> Self {
        Self {
            selected_product: None,
            quantity: None,
            expiry_date: None,
            opened_state: OpenedState::default(),
            condition: Condition::default(),
            photos: PhotoRole::ALL.map(PhotoSlot::empty),
            previews,
        }
    }

    pub fn selected_product(&self) -> Option<&CatalogProduct> {
        self.selected_product.as_ref()
    }

    pub fn quantity(&self) -> Option<u32> {
        self.quantity
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn opened_state(&self) -> OpenedState {
        self.opened_state
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn photos(&self) -> &[PhotoSlot; 3] {
        &self.photos
    }

    pub fn photo(&self, role: PhotoRole) -> &PhotoSlot {
        &self.photos[role.index()]
    }

    /// Previews issued for this draft that have not been released yet.
    pub fn live_previews(&self) -> usize {
        self.previews.live_handles()
    }

    pub fn select_product(&mut self, product: CatalogProduct) {
        self.selected_product = Some(product);
    }

    pub fn clear_product(&mut self) {
        self.selected_product = None;
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = Some(quantity);
    }

    pub fn set_expiry_date(&mut self, expiry_date: NaiveDate) {
        self.expiry_date = Some(expiry_date);
    }

    pub fn set_opened_state(&mut self, opened_state: OpenedState) {
        self.opened_state = opened_state;
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
    }

    /// Places `file` in the slot for `role` if it satisfies `policy`. A
    /// rejected file leaves the slot untouched.
    pub fn attach_photo(
        &mut self,
        role: PhotoRole,
        file: PhotoFile,
        policy: &PhotoPolicy,
    ) -> Result<(), String> {
        policy.check(role, &file)?;
        let preview = self.previews.issue(&file);
        let slot = &mut self.photos[role.index()];
        slot.file = Some(file);
        slot.preview = Some(preview);
        Ok(())
    }

    pub fn remove_photo(&mut self, role: PhotoRole) {
        self.photos[role.index()] = PhotoSlot::empty(role);
    }

    /// Discards every entered value and releases all previews.
    pub fn reset(&mut self) {
        let previews = Arc::clone(&self.previews);
        *self = Self::new(previews);
    }

    pub(crate) fn contents(&self) -> Option<DraftContents> {
        let [full, lot, detail] = &self.photos;
        Some(DraftContents {
            product: self.selected_product.clone()?,
            quantity: self.quantity.filter(|quantity| *quantity > 0)?,
            expiry_date: self.expiry_date?,
            opened_state: self.opened_state,
            condition: self.condition,
            photos: [full.file.clone()?, lot.file.clone()?, detail.file.clone()?],
        })
    }
}
