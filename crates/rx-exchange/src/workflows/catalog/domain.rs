use std::fmt;

use serde::{Deserialize, Serialize};

/// Queries shorter than this (in characters) never reach the catalog.
pub const MIN_QUERY_CHARS: usize = 2;

/// Insurance product code identifying a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(pub u64);

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dispensing class published with each catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Otc,
    Prescription,
}

impl Classification {
    pub const fn label(self) -> &'static str {
        match self {
            Classification::Otc => "otc",
            Classification::Prescription => "prescription",
        }
    }

    /// Accepts the codes used by the public drug price list (`OTC`/`ETC`) and
    /// their Korean equivalents.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "otc" | "일반" | "일반의약품" => Some(Classification::Otc),
            "etc" | "rx" | "prescription" | "전문" | "전문의약품" => {
                Some(Classification::Prescription)
            }
            _ => None,
        }
    }
}

/// Immutable reference record owned by the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub code: ProductCode,
    pub name: String,
    pub manufacturer: String,
    pub ceiling_price: String,
    pub unit: String,
    pub classification: Classification,
}

/// How a raw search term is matched against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    /// Fewer than [`MIN_QUERY_CHARS`] characters; nothing is looked up.
    TooShort,
    /// All-digit term, matched by code equality.
    Code(ProductCode),
    /// All-digit term too large to be a product code; matches nothing.
    UnknownCode,
    /// Case-insensitive substring on the product name.
    Name(String),
}

impl CatalogQuery {
    pub fn parse(raw: &str) -> Self {
        if raw.chars().count() < MIN_QUERY_CHARS {
            return CatalogQuery::TooShort;
        }

        if raw.bytes().all(|byte| byte.is_ascii_digit()) {
            return match raw.parse::<u64>() {
                Ok(code) => CatalogQuery::Code(ProductCode(code)),
                Err(_) => CatalogQuery::UnknownCode,
            };
        }

        CatalogQuery::Name(raw.to_string())
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, CatalogQuery::Code(_) | CatalogQuery::Name(_))
    }
}
