//! # Pricing Module
//!
//! Static per-model pricing and the cost model applied to token usage.
//!
//! ## Pricing Structure
//!
//! Each row carries USD rates per million tokens for:
//! - Input tokens
//! - Output tokens
//! - Cache writes (typically 1.25x input price)
//! - Cache reads (typically 0.1x input price)
//!
//! Lookup is by exact model id. Anything not in the table is priced with the
//! default row, so pricing never fails.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::Usage;

/// Model id written on internally generated messages that are never billed.
pub const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Model whose row is used for ids missing from the table.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const PER_MILLION: f64 = 1_000_000.0;

/// USD per 1M tokens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricingRow {
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

impl PricingRow {
    const fn new(input: f64, output: f64, cache_write: f64, cache_read: f64) -> Self {
        Self {
            input,
            output,
            cache_write,
            cache_read,
        }
    }
}

const OPUS_4_5: PricingRow = PricingRow::new(5.00, 25.00, 6.25, 0.50);
const OPUS_4: PricingRow = PricingRow::new(15.00, 75.00, 18.75, 1.50);
const SONNET: PricingRow = PricingRow::new(3.00, 15.00, 3.75, 0.30);
const HAIKU_4_5: PricingRow = PricingRow::new(1.00, 5.00, 1.25, 0.10);
const HAIKU_3_5: PricingRow = PricingRow::new(0.80, 4.00, 1.00, 0.08);
const HAIKU_3: PricingRow = PricingRow::new(0.25, 1.25, 0.3125, 0.025);

static PRICING: Lazy<HashMap<&'static str, PricingRow>> = Lazy::new(|| {
    HashMap::from([
        ("claude-opus-4-5-20251101", OPUS_4_5),
        ("claude-opus-4-1-20250805", OPUS_4),
        ("claude-opus-4-20250514", OPUS_4),
        ("claude-sonnet-4-5-20250929", SONNET),
        ("claude-sonnet-4-20250514", SONNET),
        ("claude-3-7-sonnet-20250219", SONNET),
        ("claude-3-5-sonnet-20241022", SONNET),
        ("claude-haiku-4-5-20251001", HAIKU_4_5),
        ("claude-3-5-haiku-20241022", HAIKU_3_5),
        ("claude-3-haiku-20240307", HAIKU_3),
    ])
});

/// Exact-id lookup into the static table.
pub fn static_pricing_lookup(model_id: &str) -> Option<PricingRow> {
    PRICING.get(model_id).copied()
}

pub fn default_pricing() -> PricingRow {
    SONNET
}

pub fn pricing_for_model(model_id: &str) -> PricingRow {
    static_pricing_lookup(model_id).unwrap_or_else(default_pricing)
}

/// Every row in the table, sorted by model id.
pub fn known_models() -> Vec<(&'static str, PricingRow)> {
    let mut rows: Vec<_> = PRICING.iter().map(|(k, v)| (*k, *v)).collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CostBreakdown {
    /// What the usage actually cost.
    pub actual: f64,
    /// What cache reads saved compared with paying the input rate for them.
    pub cache_savings: f64,
}

pub fn calculate_cost(usage: &Usage, model_id: &str) -> CostBreakdown {
    cost_with_rates(usage, &pricing_for_model(model_id))
}

pub fn cost_with_rates(usage: &Usage, rate: &PricingRow) -> CostBreakdown {
    let input_cost = usage.input_tokens as f64 * rate.input / PER_MILLION;
    let output_cost = usage.output_tokens as f64 * rate.output / PER_MILLION;
    let cache_write_cost = usage.cache_creation as f64 * rate.cache_write / PER_MILLION;
    let cache_read_cost = usage.cache_read as f64 * rate.cache_read / PER_MILLION;
    CostBreakdown {
        actual: input_cost + output_cost + cache_write_cost + cache_read_cost,
        cache_savings: usage.cache_read as f64 * (rate.input - rate.cache_read) / PER_MILLION,
    }
}
