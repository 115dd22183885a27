use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::domain::{CatalogProduct, Classification, ProductCode};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Classification { code: u64, value: String },
    DuplicateCode { code: u64 },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog export: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::Classification { code, value } => write!(
                f,
                "product {} has unknown classification '{}'",
                code, value
            ),
            CatalogImportError::DuplicateCode { code } => {
                write!(f, "product code {} appears more than once", code)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::Classification { .. }
            | CatalogImportError::DuplicateCode { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogProduct>, CatalogImportError> {
    let file = std::fs::File::open(path)?;
    parse_catalog(file)
}

/// Parses a drug price list export. The classification column is accepted
/// under its published header (`OTC,ETC`) as well as `classification`.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<CatalogProduct>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    if !has_classification_column(csv_reader.headers()?) {
        warn!(
            "catalog export has no classification column; \
             every product is imported as prescription-only"
        );
    }

    let mut products = Vec::new();
    let mut seen = HashSet::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        let row = record?;
        if !seen.insert(row.product_code) {
            return Err(CatalogImportError::DuplicateCode {
                code: row.product_code,
            });
        }
        let classification = match row.classification.as_deref() {
            None => Classification::Prescription,
            Some(value) => Classification::parse(value).ok_or_else(|| {
                CatalogImportError::Classification {
                    code: row.product_code,
                    value: value.to_string(),
                }
            })?,
        };

        products.push(CatalogProduct {
            code: ProductCode(row.product_code),
            name: row.product_name,
            manufacturer: row.company_name,
            ceiling_price: row.max_price,
            unit: row.unit,
            classification,
        });
    }

    Ok(products)
}

fn has_classification_column(headers: &csv::StringRecord) -> bool {
    headers
        .iter()
        .any(|header| header == "classification" || header == "OTC,ETC")
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    product_code: u64,
    product_name: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    max_price: String,
    #[serde(default)]
    unit: String,
    #[serde(
        rename = "classification",
        alias = "OTC,ETC",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    classification: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
