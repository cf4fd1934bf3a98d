// ListingDesk - core/bulk.rs
//
// Bulk mutations over a set of target rows.
//
// Every operation is planned before anything is written: values are
// coerced and checked first, then applied to a copy of the working set.
// The caller swaps the copy in as a whole, so a failed operation leaves
// nothing half-applied.

use crate::core::model::{CellInput, Field, Listing, ListingId};
use crate::util::constants::MIN_ADJUSTED_PRICE;
use crate::util::error::BulkError;
use std::collections::BTreeSet;

/// Which rows a bulk operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Selected,
}

/// Percentage of the current price or a fixed currency amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentDirection {
    Increase,
    Decrease,
}

/// Rounding applied after the arithmetic, before the minimum-price clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Round to cents.
    #[default]
    None,
    NearestDollar,
    Ceil,
    Floor,
}

impl Rounding {
    pub fn parse(raw: &str) -> Option<Rounding> {
        match raw.trim().to_lowercase().as_str() {
            "none" => Some(Rounding::None),
            "nearest" | "nearest-dollar" | "nearestdollar" => Some(Rounding::NearestDollar),
            "ceil" => Some(Rounding::Ceil),
            "floor" => Some(Rounding::Floor),
            _ => None,
        }
    }

    fn apply(&self, price: f64) -> f64 {
        match self {
            Rounding::None => (price * 100.0).round() / 100.0,
            Rounding::NearestDollar => price.round(),
            Rounding::Ceil => price.ceil(),
            Rounding::Floor => price.floor(),
        }
    }
}

/// A bulk price change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceAdjustment {
    pub kind: AdjustmentKind,
    pub direction: AdjustmentDirection,
    /// Percent (e.g. 10.0 for 10%) or currency amount. Never negative.
    pub amount: f64,
    pub rounding: Rounding,
}

impl PriceAdjustment {
    /// Compute the new price: arithmetic, then rounding, then clamp to
    /// the minimum price.
    pub fn apply(&self, price: f64) -> f64 {
        let delta = match self.kind {
            AdjustmentKind::Percentage => price * self.amount / 100.0,
            AdjustmentKind::Fixed => self.amount,
        };
        let raw = match self.direction {
            AdjustmentDirection::Increase => price + delta,
            AdjustmentDirection::Decrease => price - delta,
        };
        self.rounding.apply(raw).max(MIN_ADJUSTED_PRICE)
    }

    /// Reject negative or non-finite amounts.
    pub fn check(&self) -> Result<(), BulkError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(BulkError::InvalidAdjustment {
                amount: self.amount,
            });
        }
        Ok(())
    }
}

/// Resolve a scope into row positions within `listings`.
///
/// `Selected` with an empty selection is a no-op reported to the caller.
pub fn resolve_targets(
    listings: &[Listing],
    scope: Scope,
    selected: &BTreeSet<ListingId>,
    operation: &'static str,
) -> Result<Vec<usize>, BulkError> {
    match scope {
        Scope::All => Ok((0..listings.len()).collect()),
        Scope::Selected => {
            let targets: Vec<usize> = listings
                .iter()
                .enumerate()
                .filter(|(_, l)| selected.contains(&l.id))
                .map(|(idx, _)| idx)
                .collect();
            if targets.is_empty() {
                Err(BulkError::NoRowsSelected { operation })
            } else {
                Ok(targets)
            }
        }
    }
}

/// Set `field` to `raw` on every target. Returns the new working set.
pub fn set_field(
    listings: &[Listing],
    targets: &[usize],
    field: Field,
    raw: &str,
) -> Result<Vec<Listing>, BulkError> {
    let input = CellInput::coerce(field, raw).map_err(|reason| BulkError::InvalidValue {
        field: field.label(),
        value: raw.to_string(),
        reason,
    })?;
    Ok(write_all(listings, targets, |l| l.apply(input.clone())))
}

/// Reset `field` to its zero value on every target.
pub fn clear_field(listings: &[Listing], targets: &[usize], field: Field) -> Vec<Listing> {
    write_all(listings, targets, |l| l.clear(field))
}

/// Adjust the price of every target.
pub fn adjust_prices(
    listings: &[Listing],
    targets: &[usize],
    adjustment: &PriceAdjustment,
) -> Result<Vec<Listing>, BulkError> {
    adjustment.check()?;
    Ok(write_all(listings, targets, |l| {
        l.price = adjustment.apply(l.price)
    }))
}

fn write_all<F>(listings: &[Listing], targets: &[usize], mut write: F) -> Vec<Listing>
where
    F: FnMut(&mut Listing),
{
    let mut next = listings.to_vec();
    for &idx in targets {
        write(&mut next[idx]);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Condition, Shipping};

    fn make_listing(id: u64, price: f64) -> Listing {
        Listing {
            id,
            title: format!("Item {id}"),
            price,
            condition: Some(Condition::New),
            description: String::new(),
            category: "Misc".to_string(),
            offer_shipping: Shipping::No,
            auto_filled: Vec::new(),
        }
    }

    fn adjustment(
        kind: AdjustmentKind,
        direction: AdjustmentDirection,
        amount: f64,
        rounding: Rounding,
    ) -> PriceAdjustment {
        PriceAdjustment {
            kind,
            direction,
            amount,
            rounding,
        }
    }

    #[test]
    fn test_ten_percent_increase_without_rounding() {
        let a = adjustment(
            AdjustmentKind::Percentage,
            AdjustmentDirection::Increase,
            10.0,
            Rounding::None,
        );
        assert_eq!(a.apply(10.0), 11.0);
    }

    #[test]
    fn test_fixed_increase_to_nearest_dollar() {
        let a = adjustment(
            AdjustmentKind::Fixed,
            AdjustmentDirection::Increase,
            1.0,
            Rounding::NearestDollar,
        );
        assert_eq!(a.apply(10.49), 11.0);
    }

    #[test]
    fn test_decrease_clamps_to_minimum() {
        let a = adjustment(
            AdjustmentKind::Fixed,
            AdjustmentDirection::Decrease,
            50.0,
            Rounding::None,
        );
        assert_eq!(a.apply(10.0), MIN_ADJUSTED_PRICE);

        // Floor to 0 is still clamped after rounding.
        let a = adjustment(
            AdjustmentKind::Percentage,
            AdjustmentDirection::Decrease,
            90.0,
            Rounding::Floor,
        );
        assert_eq!(a.apply(5.0), MIN_ADJUSTED_PRICE);
    }

    #[test]
    fn test_ceil_and_floor() {
        let up = adjustment(AdjustmentKind::Fixed, AdjustmentDirection::Increase, 0.1, Rounding::Ceil);
        assert_eq!(up.apply(10.0), 11.0);
        let down = adjustment(AdjustmentKind::Fixed, AdjustmentDirection::Increase, 0.9, Rounding::Floor);
        assert_eq!(down.apply(10.0), 10.0);
    }

    #[test]
    fn test_selected_scope_with_nothing_selected_is_rejected() {
        let listings = vec![make_listing(1, 5.0)];
        let result = resolve_targets(&listings, Scope::Selected, &BTreeSet::new(), "Set field");
        assert_eq!(
            result,
            Err(BulkError::NoRowsSelected {
                operation: "Set field"
            })
        );
    }

    #[test]
    fn test_set_field_touches_only_targets() {
        let listings = vec![make_listing(1, 5.0), make_listing(2, 6.0), make_listing(3, 7.0)];
        let selected: BTreeSet<ListingId> = [1, 3].into_iter().collect();
        let targets = resolve_targets(&listings, Scope::Selected, &selected, "Set field").unwrap();
        let next = set_field(&listings, &targets, Field::Category, "Garden").unwrap();
        assert_eq!(next[0].category, "Garden");
        assert_eq!(next[1].category, "Misc");
        assert_eq!(next[2].category, "Garden");
    }

    #[test]
    fn test_invalid_value_changes_nothing() {
        let listings = vec![make_listing(1, 5.0)];
        let result = set_field(&listings, &[0], Field::Condition, "Broken");
        assert!(matches!(result, Err(BulkError::InvalidValue { .. })));
        assert_eq!(listings[0].condition, Some(Condition::New));
    }

    #[test]
    fn test_clear_field_uses_zero_values() {
        let listings = vec![make_listing(1, 5.0)];
        let next = clear_field(&listings, &[0], Field::Price);
        assert_eq!(next[0].price, 0.0);
        let next = clear_field(&next, &[0], Field::Category);
        assert_eq!(next[0].category, "");
    }

    #[test]
    fn test_negative_adjustment_amount_is_rejected() {
        let listings = vec![make_listing(1, 5.0)];
        let a = adjustment(AdjustmentKind::Fixed, AdjustmentDirection::Increase, -1.0, Rounding::None);
        assert!(adjust_prices(&listings, &[0], &a).is_err());
    }
}
