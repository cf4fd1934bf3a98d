// ListingDesk - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque listing identifier, unique within a working set and never reused.
pub type ListingId = u64;

// =============================================================================
// Listing
// =============================================================================

/// One marketplace record.
///
/// This is the data unit that flows through search, filtering, sorting,
/// pagination, grouping, and export. Every collaborator (spreadsheet import,
/// OCR extraction, manual add-row) produces these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Assigned by the store; immutable once assigned.
    pub id: ListingId,

    pub title: String,

    /// Never negative. Zero means "no price yet" and fails validation.
    pub price: f64,

    /// `None` is the cleared/empty state.
    pub condition: Option<Condition>,

    pub description: String,

    pub category: String,

    pub offer_shipping: Shipping,

    /// Fields that were defaulted during import, kept for later review.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_filled: Vec<AutoFill>,
}

impl Listing {
    /// A blank row as produced by "add row".
    pub fn blank(id: ListingId) -> Self {
        Self {
            id,
            title: String::new(),
            price: 0.0,
            condition: None,
            description: String::new(),
            category: String::new(),
            offer_shipping: Shipping::No,
            auto_filled: Vec::new(),
        }
    }

    /// Typed read access to a column.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Title => FieldValue::text(&self.title),
            Field::Price => FieldValue::Number(self.price),
            Field::Condition => match self.condition {
                Some(c) => FieldValue::Text(c.label().to_string()),
                None => FieldValue::Empty,
            },
            Field::Description => FieldValue::text(&self.description),
            Field::Category => FieldValue::text(&self.category),
            Field::OfferShipping => FieldValue::Text(self.offer_shipping.label().to_string()),
        }
    }

    /// Raw stringified value of a column, as used by search, grouping,
    /// and the advanced filter string operators.
    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Price => format_price(self.price),
            Field::Condition => self
                .condition
                .map(|c| c.label().to_string())
                .unwrap_or_default(),
            Field::Description => self.description.clone(),
            Field::Category => self.category.clone(),
            Field::OfferShipping => self.offer_shipping.label().to_string(),
        }
    }

    /// Coerce `raw` into the field's type and store it.
    ///
    /// Leaves the listing untouched and returns the reason when `raw`
    /// cannot be represented (non-numeric or negative price, unknown
    /// condition or shipping value). Blank input clears the field.
    pub fn set_from_text(&mut self, field: Field, raw: &str) -> Result<(), &'static str> {
        let coerced = CellInput::coerce(field, raw)?;
        self.apply(coerced);
        Ok(())
    }

    /// Store an already-coerced value.
    pub fn apply(&mut self, input: CellInput) {
        match input {
            CellInput::Title(s) => self.title = s,
            CellInput::Price(p) => self.price = p,
            CellInput::Condition(c) => self.condition = c,
            CellInput::Description(s) => self.description = s,
            CellInput::Category(s) => self.category = s,
            CellInput::OfferShipping(s) => self.offer_shipping = s,
        }
    }

    /// Reset a field to its zero value: 0 for PRICE, empty otherwise
    /// (OFFER_SHIPPING has no empty state and resets to No).
    pub fn clear(&mut self, field: Field) {
        self.apply(CellInput::zero(field));
    }

    /// Whether `field` carries an autofill annotation.
    pub fn is_auto_filled(&self, field: Field) -> bool {
        self.auto_filled.iter().any(|a| a.field == field)
    }
}

/// Stringify a price the way search and export see it: shortest
/// representation that round-trips (`10`, `10.5`, `0.01`).
pub fn format_price(price: f64) -> String {
    format!("{price}")
}

// =============================================================================
// Field
// =============================================================================

/// The editable columns of a listing, in default display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    Title,
    Price,
    Condition,
    Description,
    Category,
    OfferShipping,
}

impl Field {
    /// All columns in display order.
    pub fn all() -> &'static [Field] {
        &[
            Field::Title,
            Field::Price,
            Field::Condition,
            Field::Description,
            Field::Category,
            Field::OfferShipping,
        ]
    }

    /// Column header label, matching the marketplace bulk-upload template.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "TITLE",
            Field::Price => "PRICE",
            Field::Condition => "CONDITION",
            Field::Description => "DESCRIPTION",
            Field::Category => "CATEGORY",
            Field::OfferShipping => "OFFER SHIPPING",
        }
    }

    /// Parse a header label or key. Case-insensitive; spaces, hyphens and
    /// underscores are interchangeable (`offer_shipping`, `OFFER SHIPPING`).
    pub fn parse(raw: &str) -> Option<Field> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "title" => Some(Field::Title),
            "price" => Some(Field::Price),
            "condition" => Some(Field::Condition),
            "description" => Some(Field::Description),
            "category" => Some(Field::Category),
            "offershipping" | "shipping" => Some(Field::OfferShipping),
            _ => None,
        }
    }

    /// Whether the sorter compares this column numerically.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Price)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Field values
// =============================================================================

/// Result of a typed field read.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Blank string or cleared condition. Sorts last in both directions.
    Empty,
}

impl FieldValue {
    fn text(s: &str) -> Self {
        if s.trim().is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

/// A value already coerced into a field's type, ready to be stored.
///
/// Bulk edits coerce once up front so a bad value is rejected before any
/// record is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum CellInput {
    Title(String),
    Price(f64),
    Condition(Option<Condition>),
    Description(String),
    Category(String),
    OfferShipping(Shipping),
}

impl CellInput {
    /// Coerce raw text into `field`'s type.
    pub fn coerce(field: Field, raw: &str) -> Result<CellInput, &'static str> {
        match field {
            Field::Title => Ok(CellInput::Title(raw.to_string())),
            Field::Description => Ok(CellInput::Description(raw.to_string())),
            Field::Category => Ok(CellInput::Category(raw.to_string())),
            Field::Price => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(CellInput::Price(0.0));
                }
                let price: f64 = trimmed.parse().map_err(|_| "not a number")?;
                if !price.is_finite() {
                    return Err("not a number");
                }
                if price < 0.0 {
                    return Err("price cannot be negative");
                }
                Ok(CellInput::Price(price))
            }
            Field::Condition => {
                if raw.trim().is_empty() {
                    return Ok(CellInput::Condition(None));
                }
                Condition::parse(raw)
                    .map(|c| CellInput::Condition(Some(c)))
                    .ok_or("not one of New, Used-Like New, Used-Good, Used-Fair")
            }
            Field::OfferShipping => {
                if raw.trim().is_empty() {
                    return Ok(CellInput::OfferShipping(Shipping::No));
                }
                Shipping::parse(raw)
                    .map(CellInput::OfferShipping)
                    .ok_or("expected Yes or No")
            }
        }
    }

    /// The zero value of a field.
    pub fn zero(field: Field) -> CellInput {
        match field {
            Field::Title => CellInput::Title(String::new()),
            Field::Price => CellInput::Price(0.0),
            Field::Condition => CellInput::Condition(None),
            Field::Description => CellInput::Description(String::new()),
            Field::Category => CellInput::Category(String::new()),
            Field::OfferShipping => CellInput::OfferShipping(Shipping::No),
        }
    }
}

// =============================================================================
// Condition
// =============================================================================

/// Item condition as accepted by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Used-Like New")]
    UsedLikeNew,
    #[serde(rename = "Used-Good")]
    UsedGood,
    #[serde(rename = "Used-Fair")]
    UsedFair,
}

impl Condition {
    pub fn all() -> &'static [Condition] {
        &[
            Condition::New,
            Condition::UsedLikeNew,
            Condition::UsedGood,
            Condition::UsedFair,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::UsedLikeNew => "Used-Like New",
            Condition::UsedGood => "Used-Good",
            Condition::UsedFair => "Used-Fair",
        }
    }

    /// Case-insensitive parse that tolerates spacing around the hyphen
    /// ("used - like new").
    pub fn parse(raw: &str) -> Option<Condition> {
        let normalised: String = raw
            .split('-')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        Condition::all()
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == normalised)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Shipping
// =============================================================================

/// Whether the seller offers shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Shipping {
    Yes,
    #[default]
    No,
}

impl Shipping {
    pub fn label(&self) -> &'static str {
        match self {
            Shipping::Yes => "Yes",
            Shipping::No => "No",
        }
    }

    pub fn parse(raw: &str) -> Option<Shipping> {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Some(Shipping::Yes),
            "no" | "n" | "false" => Some(Shipping::No),
            _ => None,
        }
    }
}

// =============================================================================
// Autofill annotation
// =============================================================================

/// Marks a field whose value was substituted during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFill {
    pub field: Field,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse_tolerates_spacing_and_case() {
        assert_eq!(Condition::parse("used - like new"), Some(Condition::UsedLikeNew));
        assert_eq!(Condition::parse("USED-GOOD"), Some(Condition::UsedGood));
        assert_eq!(Condition::parse(" New "), Some(Condition::New));
        assert_eq!(Condition::parse("Refurbished"), None);
    }

    #[test]
    fn test_field_parse_accepts_header_variants() {
        assert_eq!(Field::parse("OFFER SHIPPING"), Some(Field::OfferShipping));
        assert_eq!(Field::parse("offer_shipping"), Some(Field::OfferShipping));
        assert_eq!(Field::parse("Price"), Some(Field::Price));
        assert_eq!(Field::parse("colour"), None);
    }

    #[test]
    fn test_price_text_is_shortest_form() {
        assert_eq!(format_price(10.0), "10");
        assert_eq!(format_price(10.5), "10.5");
        assert_eq!(format_price(0.01), "0.01");
    }

    #[test]
    fn test_set_from_text_rejects_without_mutating() {
        let mut listing = Listing::blank(1);
        listing.price = 5.0;
        assert!(listing.set_from_text(Field::Price, "abc").is_err());
        assert!(listing.set_from_text(Field::Price, "-3").is_err());
        assert_eq!(listing.price, 5.0);

        listing.set_from_text(Field::Condition, "used-fair").unwrap();
        assert_eq!(listing.condition, Some(Condition::UsedFair));
    }

    #[test]
    fn test_clear_resets_to_zero_values() {
        let mut listing = Listing::blank(1);
        listing.title = "Lamp".to_string();
        listing.price = 12.0;
        listing.condition = Some(Condition::New);
        listing.offer_shipping = Shipping::Yes;

        for field in Field::all() {
            listing.clear(*field);
        }
        assert_eq!(listing.title, "");
        assert_eq!(listing.price, 0.0);
        assert_eq!(listing.condition, None);
        assert_eq!(listing.offer_shipping, Shipping::No);
    }

    #[test]
    fn test_value_reports_blank_text_as_empty() {
        let mut listing = Listing::blank(1);
        listing.title = "   ".to_string();
        assert!(listing.value(Field::Title).is_empty());
        assert!(listing.value(Field::Condition).is_empty());
        assert_eq!(listing.value(Field::Price), FieldValue::Number(0.0));
    }
}
