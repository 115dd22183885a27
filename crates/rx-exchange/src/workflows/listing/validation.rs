use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::domain::PhotoRole;
use super::draft::PhotoFile;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Draft field a validation message is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Product,
    Quantity,
    ExpiryDate,
    Photo(PhotoRole),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Product => f.write_str("product"),
            Field::Quantity => f.write_str("quantity"),
            Field::ExpiryDate => f.write_str("expiry_date"),
            Field::Photo(role) => write!(f, "photo_{}", role.storage_label()),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Field → message map produced by step validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Size and type limits applied to each photo as it is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPolicy {
    pub max_bytes: usize,
    /// Accepted `image/*` subtypes.
    pub accepted_subtypes: Vec<String>,
}

impl Default for PhotoPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_PHOTO_BYTES,
            accepted_subtypes: ["jpeg", "png", "webp"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl PhotoPolicy {
    pub fn check(&self, role: PhotoRole, file: &PhotoFile) -> Result<(), String> {
        let content_type = file.content_type();
        let accepted = content_type.type_() == mime::IMAGE
            && self
                .accepted_subtypes
                .iter()
                .any(|subtype| subtype.eq_ignore_ascii_case(content_type.subtype().as_str()));
        if !accepted {
            return Err(format!(
                "The {role} photo must be a {} image.",
                self.accepted_list()
            ));
        }

        if file.size() > self.max_bytes {
            return Err(format!(
                "The {role} photo is larger than {}.",
                human_size(self.max_bytes)
            ));
        }

        Ok(())
    }

    fn accepted_list(&self) -> String {
        let names: Vec<String> = self
            .accepted_subtypes
            .iter()
            .map(|subtype| subtype.to_ascii_uppercase())
            .collect();
        match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => "supported".to_string(),
        }
    }
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
