use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::ProductCode;
use crate::workflows::seller::SellerId;

/// Store-assigned listing identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenedState {
    #[default]
    Unopened,
    Opened,
}

impl OpenedState {
    pub const fn label(self) -> &'static str {
        match self {
            OpenedState::Unopened => "unopened",
            OpenedState::Opened => "opened",
        }
    }
}

/// Package condition grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Condition {
    #[default]
    A,
    B,
    C,
}

impl Condition {
    pub const fn grade(self) -> &'static str {
        match self {
            Condition::A => "A",
            Condition::B => "B",
            Condition::C => "C",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Condition::A => "A (like new)",
            Condition::B => "B (good)",
            Condition::C => "C (visibly used)",
        }
    }
}

/// Moderation status. Only the external moderation actor moves a listing out
/// of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub const fn is_visible_on_board(self) -> bool {
        matches!(self, ListingStatus::Approved)
    }
}

/// The three required photos, in the order they are uploaded and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoRole {
    FullView,
    ExpiryLot,
    Detail,
}

impl PhotoRole {
    pub const ALL: [PhotoRole; 3] = [PhotoRole::FullView, PhotoRole::ExpiryLot, PhotoRole::Detail];

    pub const fn index(self) -> usize {
        match self {
            PhotoRole::FullView => 0,
            PhotoRole::ExpiryLot => 1,
            PhotoRole::Detail => 2,
        }
    }

    /// Path segment used in object storage.
    pub const fn storage_label(self) -> &'static str {
        match self {
            PhotoRole::FullView => "full",
            PhotoRole::ExpiryLot => "expiry_lot",
            PhotoRole::Detail => "detail",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PhotoRole::FullView => "full view",
            PhotoRole::ExpiryLot => "expiry date and lot number",
            PhotoRole::Detail => "product detail",
        }
    }

    pub const fn capture_hint(self) -> &'static str {
        match self {
            PhotoRole::FullView => "Photograph the whole package so the product name is visible.",
            PhotoRole::ExpiryLot => "Make sure the expiry date and lot number are readable.",
            PhotoRole::Detail => "Show the condition of the product clearly.",
        }
    }
}

impl fmt::Display for PhotoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Listing as handed to the store by a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListing {
    pub product_code: ProductCode,
    pub seller_id: SellerId,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub opened_state: OpenedState,
    pub condition: Condition,
    pub image_urls: [String; 3],
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub product_code: ProductCode,
    pub seller_id: SellerId,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub opened_state: OpenedState,
    pub condition: Condition,
    pub image_urls: [String; 3],
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn from_new(id: ListingId, listing: NewListing) -> Self {
        let NewListing {
            product_code,
            seller_id,
            quantity,
            expiry_date,
            opened_state,
            condition,
            image_urls,
            status,
            created_at,
        } = listing;

        Self {
            id,
            product_code,
            seller_id,
            quantity,
            expiry_date,
            opened_state,
            condition,
            image_urls,
            status,
            created_at,
        }
    }

    pub fn image_url(&self, role: PhotoRole) -> &str {
        &self.image_urls[role.index()]
    }
}
