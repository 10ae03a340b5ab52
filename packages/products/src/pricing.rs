// ABOUTME: Derived pricing and timeline views over produce records
// ABOUTME: Percent change, trend classification, chart points, pending stages

use serde::{Deserialize, Serialize};

use crate::types::{Product, Stage, StageEntry};

/// Markup above this percentage is flagged in the fair-price summary
const EXCESSIVE_MARKUP_PERCENT: f64 = 100.0;

/// Three-way classification of a price movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Increase,
    Decrease,
    Unchanged,
}

impl PriceTrend {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            PriceTrend::Increase
        } else if delta < 0.0 {
            PriceTrend::Decrease
        } else {
            PriceTrend::Unchanged
        }
    }
}

/// Farm-to-shelf price summary for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSummary {
    #[serde(rename = "farmPrice")]
    pub farm_price: f64,
    #[serde(rename = "finalPrice")]
    pub final_price: f64,
    pub change: f64,
    #[serde(rename = "percentChange")]
    pub percent_change: f64,
    pub trend: PriceTrend,
    #[serde(rename = "excessiveMarkup")]
    pub excessive_markup: bool,
}

/// One point on the price journey chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub stage: Stage,
    pub label: String,
    pub price: f64,
}

/// Percentage change from first to last price, rounded to one decimal
/// place. Zero when the first price is zero, never NaN or infinite.
pub fn percent_change(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        return 0.0;
    }
    let raw = (last - first) / first * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Price summary across the product's timeline, or `None` when the
/// timeline is empty.
pub fn price_summary(product: &Product) -> Option<PriceSummary> {
    let first = product.timeline.first()?.price;
    let last = product.timeline.last()?.price;
    let change = last - first;
    let percent = percent_change(first, last);

    Some(PriceSummary {
        farm_price: first,
        final_price: last,
        change,
        percent_change: percent,
        trend: PriceTrend::from_delta(change),
        excessive_markup: percent > EXCESSIVE_MARKUP_PERCENT,
    })
}

/// (stage, label, price) points in timeline order, for charting
pub fn chart_points(product: &Product) -> Vec<PricePoint> {
    product
        .timeline
        .iter()
        .map(|entry| PricePoint {
            stage: entry.stage,
            label: entry.stage_name.clone(),
            price: entry.price,
        })
        .collect()
}

/// Stages not yet reached by this timeline, ascending by stage number
pub fn pending_stages(timeline: &[StageEntry]) -> Vec<Stage> {
    Stage::ALL
        .into_iter()
        .filter(|stage| !timeline.iter().any(|entry| entry.stage == *stage))
        .collect()
}

/// Display label for a raw stage number. Unknown numbers map to "Unknown";
/// this never fails.
pub fn stage_label(number: i64) -> &'static str {
    Stage::from_number(number)
        .map(Stage::label)
        .unwrap_or("Unknown")
}
