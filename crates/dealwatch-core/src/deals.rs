use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Platform;

/// A validated deal scraped from a platform listing page.
///
/// Only the validator in `dealwatch-scraper` constructs these, so every
/// record satisfies `original_price > discounted_price > 0` and
/// `0 < discount_percent < 100`. Records carry no timestamps: replaying the
/// same page yields byte-identical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealRecord {
    /// Hex SHA-256 of the product URL, or of title + price when the block
    /// has no product link. Unique within one job's collection.
    pub id: String,
    pub platform: Platform,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Absolute product detail URL, when the listing block links to one.
    pub product_url: Option<String>,
    pub original_price: Decimal,
    pub discounted_price: Decimal,
    /// Percentage off, e.g. `"35.00"` for 35%.
    pub discount_percent: Decimal,
    /// Raw countdown / expiry text shown on the deal, if any.
    pub expiry: Option<String>,
    /// The listing page this record was scraped from.
    pub source_url: String,
}

impl DealRecord {
    /// Absolute amount saved.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.original_price - self.discounted_price
    }
}
