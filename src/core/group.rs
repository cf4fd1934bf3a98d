// ListingDesk - core/group.rs
//
// Field-based grouping with per-group price aggregates.
// Membership is computed from the snapshot alone; expand/collapse is a
// separate piece of UI state that never affects which items a group holds.

use crate::core::model::{Field, Listing};
use std::collections::{HashMap, HashSet};

/// Columns that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupField {
    Category,
    Condition,
    OfferShipping,
}

impl GroupField {
    pub fn field(&self) -> Field {
        match self {
            GroupField::Category => Field::Category,
            GroupField::Condition => Field::Condition,
            GroupField::OfferShipping => Field::OfferShipping,
        }
    }

    /// Only CATEGORY, CONDITION and OFFER SHIPPING are groupable.
    pub fn from_field(field: Field) -> Option<GroupField> {
        match field {
            Field::Category => Some(GroupField::Category),
            Field::Condition => Some(GroupField::Condition),
            Field::OfferShipping => Some(GroupField::OfferShipping),
            _ => None,
        }
    }
}

/// One partition of the working set.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    /// Raw stringified field value shared by every item.
    pub value: String,
    pub items: Vec<&'a Listing>,
    pub count: usize,
    pub total_price: f64,
    pub avg_price: f64,
}

/// Partition `listings` by the raw text of `by`.
///
/// Keys compare by exact string equality with no trimming or case
/// folding. Groups are returned in order of first appearance.
pub fn group_by<'a>(listings: &'a [Listing], by: GroupField) -> Vec<Group<'a>> {
    let field = by.field();
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for listing in listings {
        let key = listing.field_text(field);
        let slot = match position.get(&key) {
            Some(&slot) => slot,
            None => {
                position.insert(key.clone(), groups.len());
                groups.push(Group {
                    value: key,
                    items: Vec::new(),
                    count: 0,
                    total_price: 0.0,
                    avg_price: 0.0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[slot];
        group.items.push(listing);
        group.count += 1;
        group.total_price += listing.price;
    }

    for group in &mut groups {
        group.avg_price = group.total_price / group.count as f64;
    }

    tracing::debug!(field = %field, groups = groups.len(), "Grouped listings");
    groups
}

/// Which groups are collapsed. Groups start expanded.
#[derive(Debug, Clone, Default)]
pub struct GroupExpansion {
    collapsed: HashSet<String>,
}

impl GroupExpansion {
    pub fn is_expanded(&self, value: &str) -> bool {
        !self.collapsed.contains(value)
    }

    pub fn toggle(&mut self, value: &str) {
        if !self.collapsed.remove(value) {
            self.collapsed.insert(value.to_string());
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all(&mut self, groups: &[Group<'_>]) {
        self.collapsed = groups.iter().map(|g| g.value.clone()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Condition, Shipping};

    fn make_listing(id: u64, category: &str, price: f64, shipping: Shipping) -> Listing {
        Listing {
            id,
            title: format!("Item {id}"),
            price,
            condition: Some(Condition::UsedGood),
            description: String::new(),
            category: category.to_string(),
            offer_shipping: shipping,
            auto_filled: Vec::new(),
        }
    }

    #[test]
    fn test_groups_in_first_appearance_order_with_aggregates() {
        let listings = vec![
            make_listing(1, "Tools", 10.0, Shipping::No),
            make_listing(2, "Books", 4.0, Shipping::Yes),
            make_listing(3, "Tools", 30.0, Shipping::Yes),
        ];
        let groups = group_by(&listings, GroupField::Category);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].value, "Tools");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].total_price, 40.0);
        assert_eq!(groups[0].avg_price, 20.0);
        assert_eq!(groups[0].items[1].id, 3);
        assert_eq!(groups[1].value, "Books");
    }

    #[test]
    fn test_keys_are_exact_strings() {
        let listings = vec![
            make_listing(1, "Tools", 1.0, Shipping::No),
            make_listing(2, "tools", 1.0, Shipping::No),
            make_listing(3, "Tools ", 1.0, Shipping::No),
        ];
        assert_eq!(group_by(&listings, GroupField::Category).len(), 3);
    }

    #[test]
    fn test_group_by_shipping_and_empty_condition() {
        let mut listings = vec![
            make_listing(1, "", 1.0, Shipping::Yes),
            make_listing(2, "", 1.0, Shipping::No),
        ];
        listings[1].condition = None;
        let by_ship = group_by(&listings, GroupField::OfferShipping);
        assert_eq!(by_ship.iter().map(|g| g.value.as_str()).collect::<Vec<_>>(), ["Yes", "No"]);
        let by_cond = group_by(&listings, GroupField::Condition);
        assert_eq!(by_cond[1].value, "");
    }

    #[test]
    fn test_expansion_is_independent_of_membership() {
        let listings = vec![make_listing(1, "Tools", 1.0, Shipping::No)];
        let groups = group_by(&listings, GroupField::Category);
        let mut expansion = GroupExpansion::default();
        assert!(expansion.is_expanded("Tools"));
        expansion.toggle("Tools");
        assert!(!expansion.is_expanded("Tools"));
        assert_eq!(group_by(&listings, GroupField::Category)[0].count, 1);
        expansion.expand_all();
        expansion.collapse_all(&groups);
        assert!(!expansion.is_expanded("Tools"));
    }

    #[test]
    fn test_only_three_fields_are_groupable() {
        assert_eq!(GroupField::from_field(Field::Price), None);
        assert_eq!(GroupField::from_field(Field::Category), Some(GroupField::Category));
    }
}
