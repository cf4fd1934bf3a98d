// ListingDesk - core/analytics.rs
//
// Summary statistics and price distribution over a snapshot.
// Listings without a positive price are left out of price statistics
// but still counted in the totals.

use crate::core::model::{Field, Listing};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Headline numbers for the working set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingSummary {
    pub total_listings: usize,
    pub average_price: f64,
    pub total_value: f64,
    pub price_range: PriceRange,
    pub condition_counts: BTreeMap<String, usize>,
    pub category_counts: BTreeMap<String, usize>,
    pub shipping_counts: BTreeMap<String, usize>,
}

pub fn summary(listings: &[Listing]) -> ListingSummary {
    let prices = positive_prices(listings);
    let total_value: f64 = prices.iter().sum();
    let average_price = if prices.is_empty() {
        0.0
    } else {
        total_value / prices.len() as f64
    };

    ListingSummary {
        total_listings: listings.len(),
        average_price: round2(average_price),
        total_value: round2(total_value),
        price_range: PriceRange {
            min: round2(prices.first().copied().unwrap_or(0.0)),
            max: round2(prices.last().copied().unwrap_or(0.0)),
        },
        condition_counts: count_by(listings, Field::Condition),
        category_counts: count_by(listings, Field::Category),
        shipping_counts: count_by(listings, Field::OfferShipping),
    }
}

/// One histogram bin. The last bin includes its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBin {
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceStatistics {
    pub mean: f64,
    /// Upper median (`prices[n / 2]` of the sorted prices).
    pub median: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceDistribution {
    pub bins: Vec<PriceBin>,
    pub statistics: Option<PriceStatistics>,
}

/// Equal-width histogram of positive prices between min and max.
pub fn price_distribution(listings: &[Listing], bins: usize) -> PriceDistribution {
    let prices = positive_prices(listings);
    if prices.is_empty() || bins == 0 {
        return PriceDistribution::default();
    }

    let min = prices[0];
    let max = prices[prices.len() - 1];
    let width = (max - min) / bins as f64;
    let n = prices.len() as f64;

    let out_bins = (0..bins)
        .map(|i| {
            let lo = min + i as f64 * width;
            let hi = min + (i + 1) as f64 * width;
            let last = i == bins - 1;
            let count = prices
                .iter()
                .filter(|&&p| (lo <= p && p < hi) || (last && p == hi))
                .count();
            PriceBin {
                min: round2(lo),
                max: round2(hi),
                count,
                percentage: round2(count as f64 / n * 100.0),
            }
        })
        .collect();

    PriceDistribution {
        bins: out_bins,
        statistics: Some(PriceStatistics {
            mean: round2(prices.iter().sum::<f64>() / n),
            median: round2(prices[prices.len() / 2]),
            count: prices.len(),
            min: round2(min),
            max: round2(max),
        }),
    }
}

/// Sorted ascending.
fn positive_prices(listings: &[Listing]) -> Vec<f64> {
    let mut prices: Vec<f64> = listings
        .iter()
        .map(|l| l.price)
        .filter(|&p| p > 0.0)
        .collect();
    prices.sort_by(f64::total_cmp);
    prices
}

fn count_by(listings: &[Listing], field: Field) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for listing in listings {
        let key = listing.field_text(field);
        if key.is_empty() {
            continue;
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
