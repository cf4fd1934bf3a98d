// ListingDesk - core/filter.rs
//
// Advanced condition filter.
//
// Conditions are folded strictly left to right:
//   result = c1; result = (ci.logic == And) ? result && ci : result || ci
// The first condition's logic is ignored and there is no precedence or
// grouping, so `A OR B AND C` means `(A OR B) AND C`. Callers rely on this.
//
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{Field, Listing};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison applied by one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl Operator {
    pub fn all() -> &'static [Operator] {
        &[
            Operator::Equals,
            Operator::Contains,
            Operator::StartsWith,
            Operator::EndsWith,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::IsEmpty,
            Operator::IsNotEmpty,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::IsEmpty => "isEmpty",
            Operator::IsNotEmpty => "isNotEmpty",
        }
    }

    /// Case-insensitive parse of the operator label.
    pub fn parse(raw: &str) -> Option<Operator> {
        let lower = raw.trim().to_lowercase();
        Operator::all()
            .iter()
            .copied()
            .find(|op| op.label().to_lowercase() == lower)
    }

    /// Operators that ignore the comparison value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a condition combines with the result accumulated so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn parse(raw: &str) -> Option<Logic> {
        match raw.trim().to_lowercase().as_str() {
            "and" => Some(Logic::And),
            "or" => Some(Logic::Or),
            _ => None,
        }
    }
}

/// One row of the advanced filter builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: Field,
    pub operator: Operator,
    pub value: String,
    /// Ignored on the first active condition.
    #[serde(default)]
    pub logic: Logic,
}

impl FilterCondition {
    pub fn new(field: Field, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
            logic: Logic::And,
        }
    }

    /// Builder-style logic setter.
    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Conditions with a blank value do nothing unless the operator
    /// ignores the value.
    pub fn is_active(&self) -> bool {
        self.operator.is_unary() || !self.value.trim().is_empty()
    }

    /// Evaluate this condition alone against one listing.
    pub fn matches(&self, listing: &Listing) -> bool {
        let cell = listing.field_text(self.field);
        let cell_lower = cell.to_lowercase();
        let value_lower = self.value.to_lowercase();

        match self.operator {
            Operator::Equals => {
                if self.field.is_numeric() {
                    if let (Some(a), Some(b)) = (coerce_number(&cell), coerce_number(&self.value)) {
                        return a == b;
                    }
                }
                cell_lower == value_lower
            }
            Operator::Contains => cell_lower.contains(&value_lower),
            Operator::StartsWith => cell_lower.starts_with(&value_lower),
            Operator::EndsWith => cell_lower.ends_with(&value_lower),
            Operator::GreaterThan => match (coerce_number(&cell), coerce_number(&self.value)) {
                (Some(a), Some(b)) => a > b,
                _ => false,
            },
            Operator::LessThan => match (coerce_number(&cell), coerce_number(&self.value)) {
                (Some(a), Some(b)) => a < b,
                _ => false,
            },
            Operator::IsEmpty => cell.trim().is_empty(),
            Operator::IsNotEmpty => !cell.trim().is_empty(),
        }
    }
}

/// Numeric coercion for the ordering operators. Blank or non-numeric text
/// does not coerce.
fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Drop conditions that have nothing to compare against.
pub fn active_conditions(conditions: &[FilterCondition]) -> Vec<&FilterCondition> {
    conditions.iter().filter(|c| c.is_active()).collect()
}

/// Left-to-right AND/OR fold over the active conditions.
///
/// Returns true when no condition is active.
pub fn evaluate(conditions: &[&FilterCondition], listing: &Listing) -> bool {
    let mut iter = conditions.iter();
    let Some(first) = iter.next() else {
        return true;
    };
    let mut result = first.matches(listing);
    for condition in iter {
        result = match condition.logic {
            Logic::And => result && condition.matches(listing),
            Logic::Or => result || condition.matches(listing),
        };
    }
    result
}

/// Apply the condition list to `candidates` (indices into `listings`),
/// keeping order.
pub fn apply_conditions(
    listings: &[Listing],
    candidates: &[usize],
    conditions: &[FilterCondition],
) -> Vec<usize> {
    let active = active_conditions(conditions);
    if active.is_empty() {
        return candidates.to_vec();
    }
    candidates
        .iter()
        .copied()
        .filter(|&idx| evaluate(&active, &listings[idx]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Condition, Shipping};

    fn make_listing(id: u64, title: &str, price: f64, category: &str) -> Listing {
        Listing {
            id,
            title: title.to_string(),
            price,
            condition: Some(Condition::New),
            description: String::new(),
            category: category.to_string(),
            offer_shipping: Shipping::No,
            auto_filled: Vec::new(),
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            make_listing(1, "Oak Desk", 120.0, "Furniture"),
            make_listing(2, "Desk Lamp", 25.0, "Lighting"),
            make_listing(3, "Floor Lamp", 60.0, "Lighting"),
            make_listing(4, "Bookshelf", 80.0, ""),
        ]
    }

    fn run(listings: &[Listing], conditions: &[FilterCondition]) -> Vec<usize> {
        let all: Vec<usize> = (0..listings.len()).collect();
        apply_conditions(listings, &all, conditions)
    }

    #[test]
    fn test_string_operators_are_case_insensitive() {
        let listings = sample();
        let c = [FilterCondition::new(Field::Title, Operator::StartsWith, "desk")];
        assert_eq!(run(&listings, &c), vec![1]);
        let c = [FilterCondition::new(Field::Title, Operator::EndsWith, "LAMP")];
        assert_eq!(run(&listings, &c), vec![1, 2]);
        let c = [FilterCondition::new(Field::Category, Operator::Equals, "lighting")];
        assert_eq!(run(&listings, &c), vec![1, 2]);
    }

    #[test]
    fn test_numeric_comparison_coerces_both_sides() {
        let listings = sample();
        let c = [FilterCondition::new(Field::Price, Operator::GreaterThan, " 60 ")];
        assert_eq!(run(&listings, &c), vec![0, 3]);
        let c = [FilterCondition::new(Field::Price, Operator::LessThan, "abc")];
        assert!(run(&listings, &c).is_empty());
        let c = [FilterCondition::new(Field::Price, Operator::Equals, "25.00")];
        assert_eq!(run(&listings, &c), vec![1]);
    }

    #[test]
    fn test_empty_operators_ignore_value() {
        let listings = sample();
        let c = [FilterCondition::new(Field::Category, Operator::IsEmpty, "")];
        assert_eq!(run(&listings, &c), vec![3]);
        let c = [FilterCondition::new(Field::Category, Operator::IsNotEmpty, "")];
        assert_eq!(run(&listings, &c), vec![0, 1, 2]);
    }

    #[test]
    fn test_blank_value_conditions_are_dropped() {
        let listings = sample();
        let c = [
            FilterCondition::new(Field::Title, Operator::Contains, "   "),
            FilterCondition::new(Field::Title, Operator::Contains, "lamp"),
        ];
        assert_eq!(run(&listings, &c), vec![1, 2]);
    }

    #[test]
    fn test_first_condition_logic_is_ignored() {
        let listings = sample();
        let c = [FilterCondition::new(Field::Title, Operator::Contains, "desk").with_logic(Logic::Or)];
        assert_eq!(run(&listings, &c), vec![0, 1]);
    }

    #[test]
    fn test_fold_is_strictly_left_to_right() {
        let listings = sample();
        // (title contains "oak" OR category = lighting) AND price < 50
        // Conventional precedence would instead give oak OR (lighting AND < 50).
        let c = [
            FilterCondition::new(Field::Title, Operator::Contains, "oak"),
            FilterCondition::new(Field::Category, Operator::Equals, "lighting").with_logic(Logic::Or),
            FilterCondition::new(Field::Price, Operator::LessThan, "50").with_logic(Logic::And),
        ];
        assert_eq!(run(&listings, &c), vec![1]);
    }

    #[test]
    fn test_no_active_conditions_matches_all() {
        let listings = sample();
        assert_eq!(run(&listings, &[]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse("startswith"), Some(Operator::StartsWith));
        assert_eq!(Operator::parse("isNotEmpty"), Some(Operator::IsNotEmpty));
        assert_eq!(Operator::parse("between"), None);
    }
}
