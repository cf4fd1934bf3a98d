// ListingDesk - core/validate.rs
//
// Per-record field checks. Issues are inline markers: they never block
// editing. The same predicates drive the "remove empty rows" eviction.

use crate::core::model::{Condition, Field, Listing};
use crate::util::constants::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use std::fmt;

/// A single field-level problem on one listing.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// TITLE is blank (whitespace counts as blank).
    EmptyTitle,
    /// TITLE exceeds the marketplace limit.
    TitleTooLong { chars: usize },
    /// PRICE is zero or less.
    ZeroPrice,
    /// CONDITION has been cleared.
    EmptyCondition,
    /// Incoming CONDITION text is not one of the enumerated values.
    InvalidCondition { raw: String },
    /// DESCRIPTION exceeds the marketplace limit.
    DescriptionTooLong { chars: usize },
}

impl ValidationIssue {
    /// The column the marker belongs to.
    pub fn field(&self) -> Field {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => Field::Title,
            Self::ZeroPrice => Field::Price,
            Self::EmptyCondition | Self::InvalidCondition { .. } => Field::Condition,
            Self::DescriptionTooLong { .. } => Field::Description,
        }
    }

    /// Whether this issue means the row lacks a required field.
    pub fn is_missing_required(&self) -> bool {
        matches!(self, Self::EmptyTitle | Self::ZeroPrice | Self::EmptyCondition)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::TitleTooLong { chars } => write!(
                f,
                "Title is {chars} characters, maximum is {MAX_TITLE_CHARS}"
            ),
            Self::ZeroPrice => write!(f, "Price must be greater than zero"),
            Self::EmptyCondition => write!(f, "Condition is required"),
            Self::InvalidCondition { raw } => write!(f, "'{raw}' is not a valid condition"),
            Self::DescriptionTooLong { chars } => write!(
                f,
                "Description is {chars} characters, maximum is {MAX_DESCRIPTION_CHARS}"
            ),
        }
    }
}

/// Run every check against one listing.
pub fn validate(listing: &Listing) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if is_empty_title(listing) {
        issues.push(ValidationIssue::EmptyTitle);
    } else {
        let chars = listing.title.chars().count();
        if chars > MAX_TITLE_CHARS {
            issues.push(ValidationIssue::TitleTooLong { chars });
        }
    }

    if is_zero_price(listing) {
        issues.push(ValidationIssue::ZeroPrice);
    }

    if listing.condition.is_none() {
        issues.push(ValidationIssue::EmptyCondition);
    }

    let chars = listing.description.chars().count();
    if chars > MAX_DESCRIPTION_CHARS {
        issues.push(ValidationIssue::DescriptionTooLong { chars });
    }

    issues
}

/// Check raw CONDITION text before it is coerced into a listing.
pub fn validate_condition_text(raw: &str) -> Option<ValidationIssue> {
    if raw.trim().is_empty() {
        Some(ValidationIssue::EmptyCondition)
    } else if Condition::parse(raw).is_none() {
        Some(ValidationIssue::InvalidCondition {
            raw: raw.to_string(),
        })
    } else {
        None
    }
}

/// The eviction rule for "remove empty rows":
/// empty title OR price <= 0 OR empty condition.
pub fn is_missing_required(listing: &Listing) -> bool {
    is_empty_title(listing) || is_zero_price(listing) || listing.condition.is_none()
}

fn is_empty_title(listing: &Listing) -> bool {
    listing.title.trim().is_empty()
}

fn is_zero_price(listing: &Listing) -> bool {
    listing.price <= 0.0
}
