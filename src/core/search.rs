// ListingDesk - core/search.rs
//
// Multi-term quick search. Every whitespace-separated term must appear
// (case-insensitive substring) somewhere in the listing's combined text.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{format_price, Listing};

/// A parsed quick-search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Split on whitespace and lower-case each term.
    pub fn parse(raw: &str) -> Self {
        Self {
            terms: raw.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// True when the query has no terms and therefore matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// AND across terms.
    pub fn matches(&self, listing: &Listing) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let haystack = searchable_text(listing);
        self.terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

/// Lower-cased concatenation of title, description, category, condition,
/// price and shipping flag.
pub fn searchable_text(listing: &Listing) -> String {
    let condition = listing.condition.map(|c| c.label()).unwrap_or("");
    let price = format_price(listing.price);
    [
        listing.title.as_str(),
        listing.description.as_str(),
        listing.category.as_str(),
        condition,
        price.as_str(),
        listing.offer_shipping.label(),
    ]
    .join(" ")
    .to_lowercase()
}

/// Apply the query to `candidates` (indices into `listings`), keeping order.
///
/// Recomputed in full on every call so results always reflect the latest
/// edits.
pub fn apply_search(listings: &[Listing], candidates: &[usize], raw_query: &str) -> Vec<usize> {
    let query = SearchQuery::parse(raw_query);
    if query.is_empty() {
        return candidates.to_vec();
    }
    candidates
        .iter()
        .copied()
        .filter(|&idx| query.matches(&listings[idx]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Condition, Shipping};

    fn make_listing(id: u64, title: &str, description: &str, category: &str) -> Listing {
        Listing {
            id,
            title: title.to_string(),
            price: 20.0,
            condition: Some(Condition::UsedGood),
            description: description.to_string(),
            category: category.to_string(),
            offer_shipping: Shipping::No,
            auto_filled: Vec::new(),
        }
    }

    fn all(listings: &[Listing]) -> Vec<usize> {
        (0..listings.len()).collect()
    }

    #[test]
    fn test_empty_query_returns_all() {
        let listings = vec![
            make_listing(1, "Lamp", "", ""),
            make_listing(2, "Chair", "", ""),
        ];
        assert_eq!(apply_search(&listings, &all(&listings), "   "), vec![0, 1]);
    }

    #[test]
    fn test_terms_are_and_combined_across_fields() {
        let listings = vec![
            make_listing(1, "Desk lamp", "brass", "Lighting"),
            make_listing(2, "Lamp", "fits any desk", "Lighting"),
            make_listing(3, "Floor lamp", "tall", "Lighting"),
            make_listing(4, "Desk", "oak", "Furniture"),
        ];
        let result = apply_search(&listings, &all(&listings), "lamp desk");
        assert_eq!(result, vec![0, 1]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let listings = vec![make_listing(1, "IKEA Shelf", "", "")];
        assert_eq!(apply_search(&listings, &all(&listings), "ikea SHELF"), vec![0]);
    }

    #[test]
    fn test_condition_price_and_shipping_are_searchable() {
        let mut l = make_listing(1, "Bike", "", "");
        l.price = 125.5;
        l.offer_shipping = Shipping::Yes;
        let listings = vec![l];
        let idx = all(&listings);
        assert_eq!(apply_search(&listings, &idx, "used-good"), vec![0]);
        assert_eq!(apply_search(&listings, &idx, "125.5"), vec![0]);
        assert_eq!(apply_search(&listings, &idx, "yes"), vec![0]);
    }

    #[test]
    fn test_search_respects_candidate_subset() {
        let listings = vec![
            make_listing(1, "Lamp", "", ""),
            make_listing(2, "Lamp", "", ""),
        ];
        assert_eq!(apply_search(&listings, &[1], "lamp"), vec![1]);
    }
}
