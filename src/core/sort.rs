// ListingDesk - core/sort.rs
//
// Stable column sort with a tri-state header cycle.
// Empty values always sort last, in both directions.

use crate::core::model::{Field, FieldValue, Listing};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction for an active column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Current sort column and direction. `None` means unsorted
/// (original working-set order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub active: Option<(Field, SortDirection)>,
}

impl SortState {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(field: Field, direction: SortDirection) -> Self {
        Self {
            active: Some((field, direction)),
        }
    }

    pub fn field(&self) -> Option<Field> {
        self.active.map(|(f, _)| f)
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.active.map(|(_, d)| d)
    }

    /// Header click: unsorted -> asc -> desc -> unsorted on the same column;
    /// a different column always starts at asc.
    pub fn cycle(&mut self, clicked: Field) {
        self.active = match self.active {
            Some((field, SortDirection::Asc)) if field == clicked => {
                Some((clicked, SortDirection::Desc))
            }
            Some((field, SortDirection::Desc)) if field == clicked => None,
            _ => Some((clicked, SortDirection::Asc)),
        };
    }
}

/// Compare two listings on one column.
///
/// Empty values go last regardless of direction; everything else uses
/// native ordering (numeric for PRICE, lexicographic otherwise), reversed
/// for descending.
pub fn compare(a: &Listing, b: &Listing, field: Field, direction: SortDirection) -> Ordering {
    let (va, vb) = (a.value(field), b.value(field));
    match (&va, &vb) {
        (FieldValue::Empty, FieldValue::Empty) => Ordering::Equal,
        (FieldValue::Empty, _) => Ordering::Greater,
        (_, FieldValue::Empty) => Ordering::Less,
        _ => {
            let natural = compare_values(&va, &vb);
            match direction {
                SortDirection::Asc => natural,
                SortDirection::Desc => natural.reverse(),
            }
        }
    }
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        // Mixed kinds never occur within one column; keep them stable.
        _ => Ordering::Equal,
    }
}

/// Sort `indices` (into `listings`) in place.
///
/// Uses the stable `sort_by`, so equal keys keep their relative order in
/// both directions. Unsorted state leaves the order untouched.
pub fn sort_indices(listings: &[Listing], indices: &mut [usize], state: &SortState) {
    let Some((field, direction)) = state.active else {
        return;
    };
    indices.sort_by(|&a, &b| compare(&listings[a], &listings[b], field, direction));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Condition, Shipping};

    fn make_listing(id: u64, title: &str, price: f64, condition: Option<Condition>) -> Listing {
        Listing {
            id,
            title: title.to_string(),
            price,
            condition,
            description: String::new(),
            category: String::new(),
            offer_shipping: Shipping::No,
            auto_filled: Vec::new(),
        }
    }

    fn ids(listings: &[Listing], indices: &[usize]) -> Vec<u64> {
        indices.iter().map(|&i| listings[i].id).collect()
    }

    fn sorted(listings: &[Listing], state: SortState) -> Vec<u64> {
        let mut idx: Vec<usize> = (0..listings.len()).collect();
        sort_indices(listings, &mut idx, &state);
        ids(listings, &idx)
    }

    #[test]
    fn test_cycle_same_column() {
        let mut s = SortState::unsorted();
        s.cycle(Field::Price);
        assert_eq!(s, SortState::by(Field::Price, SortDirection::Asc));
        s.cycle(Field::Price);
        assert_eq!(s, SortState::by(Field::Price, SortDirection::Desc));
        s.cycle(Field::Price);
        assert_eq!(s, SortState::unsorted());
    }

    #[test]
    fn test_cycle_other_column_resets_to_asc() {
        let mut s = SortState::by(Field::Price, SortDirection::Desc);
        s.cycle(Field::Title);
        assert_eq!(s, SortState::by(Field::Title, SortDirection::Asc));
    }

    #[test]
    fn test_price_sorts_numerically() {
        let listings = vec![
            make_listing(1, "a", 100.0, None),
            make_listing(2, "b", 9.0, None),
            make_listing(3, "c", 25.0, None),
        ];
        assert_eq!(sorted(&listings, SortState::by(Field::Price, SortDirection::Asc)), vec![2, 3, 1]);
        assert_eq!(sorted(&listings, SortState::by(Field::Price, SortDirection::Desc)), vec![1, 3, 2]);
    }

    #[test]
    fn test_empty_values_sort_last_in_both_directions() {
        let listings = vec![
            make_listing(1, "a", 1.0, None),
            make_listing(2, "b", 1.0, Some(Condition::UsedFair)),
            make_listing(3, "c", 1.0, Some(Condition::New)),
        ];
        assert_eq!(
            sorted(&listings, SortState::by(Field::Condition, SortDirection::Asc)),
            vec![3, 2, 1]
        );
        assert_eq!(
            sorted(&listings, SortState::by(Field::Condition, SortDirection::Desc)),
            vec![2, 3, 1]
        );
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let listings = vec![
            make_listing(1, "same", 5.0, None),
            make_listing(2, "other", 1.0, None),
            make_listing(3, "same", 5.0, None),
            make_listing(4, "same", 5.0, None),
        ];
        assert_eq!(
            sorted(&listings, SortState::by(Field::Price, SortDirection::Asc)),
            vec![2, 1, 3, 4]
        );
        assert_eq!(
            sorted(&listings, SortState::by(Field::Price, SortDirection::Desc)),
            vec![1, 3, 4, 2]
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let listings = vec![
            make_listing(1, "pear", 3.0, None),
            make_listing(2, "apple", 3.0, None),
            make_listing(3, "fig", 3.0, None),
        ];
        let state = SortState::by(Field::Title, SortDirection::Asc);
        let mut idx: Vec<usize> = (0..listings.len()).collect();
        sort_indices(&listings, &mut idx, &state);
        let once = idx.clone();
        sort_indices(&listings, &mut idx, &state);
        assert_eq!(idx, once);
    }

    #[test]
    fn test_unsorted_keeps_original_order() {
        let listings = vec![make_listing(1, "z", 3.0, None), make_listing(2, "a", 1.0, None)];
        assert_eq!(sorted(&listings, SortState::unsorted()), vec![1, 2]);
    }
}
