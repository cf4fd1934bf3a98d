// ListingDesk - core/import.rs
//
// Normalisation of incoming records from spreadsheet or OCR collaborators.
//
// Rules:
// - TITLE is the one hard requirement. Records without it are rejected and
//   counted, never merged.
// - Every other missing or unusable field gets a default, and the listing
//   records an autofill annotation so the user can review it later.
// - A field that is supplied but blank stays blank (CONDITION becomes
//   unset, OFFER SHIPPING becomes No). Exported CSV re-imports unchanged.
// - A malformed record never aborts the batch.

use crate::core::model::{AutoFill, Condition, Field, Listing, ListingId, Shipping};
use crate::util::constants::DEFAULT_CATEGORY;
use crate::util::error::ImportError;
use regex::Regex;
use std::io::Read;
use std::sync::OnceLock;

/// One incoming record as handed over by a collaborator. Every field is
/// optional raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    pub title: Option<String>,
    pub price: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub offer_shipping: Option<String>,
}

impl RawListing {
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Price => &mut self.price,
            Field::Condition => &mut self.condition,
            Field::Description => &mut self.description,
            Field::Category => &mut self.category,
            Field::OfferShipping => &mut self.offer_shipping,
        };
        *slot = Some(value);
    }
}

/// Defaults substituted for missing fields.
#[derive(Debug, Clone)]
pub struct ImportDefaults {
    pub category: String,
    pub condition: Condition,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            condition: Condition::New,
        }
    }
}

/// Why a record was not merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position of the record within the incoming batch (0-based).
    pub batch_index: usize,
    pub reason: String,
}

/// Result of normalising a batch.
#[derive(Debug, Clone, Default)]
pub struct NormalisedBatch {
    /// Accepted listings. Ids are placeholders until the store assigns them.
    pub listings: Vec<Listing>,
    pub rejected: Vec<RejectedRecord>,
}

impl NormalisedBatch {
    /// Accepted listings that carry at least one autofill annotation.
    pub fn autofilled_count(&self) -> usize {
        self.listings
            .iter()
            .filter(|l| !l.auto_filled.is_empty())
            .count()
    }
}

/// Normalise a batch. Ids are not assigned here.
pub fn normalise_batch(batch: Vec<RawListing>, defaults: &ImportDefaults) -> NormalisedBatch {
    let mut out = NormalisedBatch::default();
    for (batch_index, raw) in batch.into_iter().enumerate() {
        match normalise_record(raw, defaults) {
            Ok(listing) => out.listings.push(listing),
            Err(reason) => {
                tracing::warn!(batch_index, reason = %reason, "Rejected import record");
                out.rejected.push(RejectedRecord { batch_index, reason });
            }
        }
    }
    tracing::debug!(
        accepted = out.listings.len(),
        autofilled = out.autofilled_count(),
        rejected = out.rejected.len(),
        "Normalised import batch"
    );
    out
}

fn normalise_record(raw: RawListing, defaults: &ImportDefaults) -> Result<Listing, String> {
    let title = match cell(raw.title) {
        Cell::Text(title) => title,
        Cell::Missing | Cell::Blank => return Err("missing TITLE".to_string()),
    };

    const PLACEHOLDER_ID: ListingId = 0;
    let mut listing = Listing::blank(PLACEHOLDER_ID);
    listing.title = title;

    let mut note = |field: Field, reason: String| {
        listing.auto_filled.push(AutoFill { field, reason });
    };

    let price = match cell(raw.price) {
        Cell::Missing => {
            note(Field::Price, "missing price, set to 0".to_string());
            0.0
        }
        Cell::Blank => 0.0,
        Cell::Text(text) => match parse_price(&text) {
            Some(p) => p,
            None => {
                note(Field::Price, format!("unreadable price '{text}', set to 0"));
                0.0
            }
        },
    };

    let condition = match cell(raw.condition) {
        Cell::Missing => {
            note(
                Field::Condition,
                format!("missing condition, set to {}", defaults.condition),
            );
            Some(defaults.condition)
        }
        Cell::Blank => None,
        Cell::Text(text) => match Condition::parse(&text) {
            Some(c) => Some(c),
            None => {
                note(
                    Field::Condition,
                    format!("unknown condition '{text}', set to {}", defaults.condition),
                );
                Some(defaults.condition)
            }
        },
    };

    let description = match cell(raw.description) {
        Cell::Missing => {
            note(Field::Description, "missing description, left blank".to_string());
            String::new()
        }
        Cell::Blank => String::new(),
        Cell::Text(d) => d,
    };

    let category = match cell(raw.category) {
        Cell::Missing => {
            note(
                Field::Category,
                format!("missing category, set to {}", defaults.category),
            );
            defaults.category.clone()
        }
        Cell::Blank => String::new(),
        Cell::Text(c) => c,
    };

    let offer_shipping = match cell(raw.offer_shipping) {
        Cell::Missing => {
            note(Field::OfferShipping, "missing shipping option, set to No".to_string());
            Shipping::No
        }
        Cell::Blank => Shipping::No,
        Cell::Text(text) => match Shipping::parse(&text) {
            Some(s) => s,
            None => {
                note(
                    Field::OfferShipping,
                    format!("unknown shipping option '{text}', set to No"),
                );
                Shipping::No
            }
        },
    };

    listing.price = price;
    listing.condition = condition;
    listing.description = description;
    listing.category = category;
    listing.offer_shipping = offer_shipping;
    Ok(listing)
}

/// How one raw field arrived.
enum Cell {
    /// Not supplied at all (absent column, OCR miss).
    Missing,
    /// Supplied but empty after trimming.
    Blank,
    Text(String),
}

fn cell(value: Option<String>) -> Cell {
    match value.map(|v| v.trim().to_string()) {
        None => Cell::Missing,
        Some(v) if v.is_empty() => Cell::Blank,
        Some(v) => Cell::Text(v),
    }
}

fn price_regex() -> &'static Regex {
    static PRICE: OnceLock<Regex> = OnceLock::new();
    PRICE.get_or_init(|| {
        Regex::new(r"^\$?\s*(\d[\d,]*(?:\.\d+)?|\.\d+)$").expect("price pattern is valid")
    })
}

/// Lenient price parse: accepts `12`, `12.5`, `$1,234.50`. Negative or
/// non-numeric text is rejected.
pub fn parse_price(text: &str) -> Option<f64> {
    let caps = price_regex().captures(text.trim())?;
    let digits = caps.get(1)?.as_str().replace(',', "");
    digits.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Read CSV data with a header row into raw records.
///
/// Header labels are matched with `Field::parse`; unknown columns are
/// ignored. Empty cells of known columns are kept as blank text; only
/// columns the file does not have (or short rows) stay `None`.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawListing>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ImportError::Csv { source: e })?
        .clone();
    let columns: Vec<Option<Field>> = headers.iter().map(Field::parse).collect();

    if !columns.iter().any(|c| *c == Some(Field::Title)) {
        tracing::warn!(headers = ?headers, "CSV has no TITLE column; every row will be rejected");
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.map_err(|e| ImportError::Csv { source: e })?;
        let mut raw = RawListing::default();
        for (cell, column) in row.iter().zip(&columns) {
            if let Some(field) = column {
                raw.set(*field, cell.to_string());
            }
        }
        records.push(raw);
    }
    Ok(records)
}

/// Open and read a CSV file.
pub fn read_csv_file(path: &std::path::Path) -> Result<Vec<RawListing>, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_csv(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, price: &str, condition: &str) -> RawListing {
        RawListing {
            title: Some(title.to_string()),
            price: Some(price.to_string()),
            condition: Some(condition.to_string()),
            description: Some("desc".to_string()),
            category: Some("Tools".to_string()),
            offer_shipping: Some("Yes".to_string()),
        }
    }

    #[test]
    fn test_complete_record_has_no_autofill() {
        let batch = normalise_batch(vec![raw("Drill", "$45.00", "Used - Good")], &ImportDefaults::default());
        assert_eq!(batch.listings.len(), 1);
        let l = &batch.listings[0];
        assert_eq!(l.price, 45.0);
        assert_eq!(l.condition, Some(Condition::UsedGood));
        assert_eq!(l.offer_shipping, Shipping::Yes);
        assert!(l.auto_filled.is_empty());
        assert_eq!(batch.autofilled_count(), 0);
    }

    #[test]
    fn test_missing_title_is_rejected_and_counted() {
        let mut no_title = raw("", "5", "New");
        no_title.title = Some("   ".to_string());
        let batch = normalise_batch(
            vec![raw("Saw", "5", "New"), no_title, RawListing::default()],
            &ImportDefaults::default(),
        );
        assert_eq!(batch.listings.len(), 1);
        assert_eq!(batch.rejected.len(), 2);
        assert_eq!(batch.rejected[0].batch_index, 1);
    }

    #[test]
    fn test_missing_fields_are_defaulted_and_annotated() {
        let record = RawListing {
            title: Some("Chair".to_string()),
            ..Default::default()
        };
        let batch = normalise_batch(vec![record], &ImportDefaults::default());
        let l = &batch.listings[0];
        assert_eq!(l.category, DEFAULT_CATEGORY);
        assert_eq!(l.condition, Some(Condition::New));
        assert_eq!(l.price, 0.0);
        for field in [
            Field::Price,
            Field::Condition,
            Field::Description,
            Field::Category,
            Field::OfferShipping,
        ] {
            assert!(l.is_auto_filled(field), "{field} should be annotated");
        }
        assert!(!l.is_auto_filled(Field::Title));
        assert_eq!(batch.autofilled_count(), 1);
    }

    #[test]
    fn test_invalid_condition_is_defaulted_with_reason() {
        let batch = normalise_batch(vec![raw("Vase", "10", "Mint")], &ImportDefaults::default());
        let l = &batch.listings[0];
        assert_eq!(l.condition, Some(Condition::New));
        assert!(l.auto_filled[0].reason.contains("Mint"));
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price("12"), Some(12.0));
        assert_eq!(parse_price("$1,234.50"), Some(1234.5));
        assert_eq!(parse_price(".99"), Some(0.99));
        assert_eq!(parse_price("-5"), None);
        assert_eq!(parse_price("twelve"), None);
    }

    #[test]
    fn test_read_csv_maps_headers() {
        let data = "Title,PRICE,condition,Colour,OFFER SHIPPING\nLamp,12.5,New,red,Yes\nBare,,,,\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title.as_deref(), Some("Lamp"));
        assert_eq!(rows[0].offer_shipping.as_deref(), Some("Yes"));
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[1].price.as_deref(), Some(""));
    }

    #[test]
    fn test_blank_fields_stay_blank_without_annotation() {
        let record = RawListing {
            title: Some("Chair".to_string()),
            price: Some(" ".to_string()),
            condition: Some(String::new()),
            description: Some(String::new()),
            category: Some(String::new()),
            offer_shipping: Some(String::new()),
        };
        let batch = normalise_batch(vec![record], &ImportDefaults::default());
        let l = &batch.listings[0];
        assert_eq!(l.price, 0.0);
        assert_eq!(l.condition, None);
        assert_eq!(l.category, "");
        assert_eq!(l.offer_shipping, Shipping::No);
        assert!(l.auto_filled.is_empty());
    }

    #[test]
    fn test_short_csv_row_counts_as_missing_fields() {
        let data = "TITLE,PRICE,CATEGORY\nLamp,5\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].category, None);
        let batch = normalise_batch(rows, &ImportDefaults::default());
        assert_eq!(batch.listings[0].category, DEFAULT_CATEGORY);
        assert!(batch.listings[0].is_auto_filled(Field::Category));
    }
}
