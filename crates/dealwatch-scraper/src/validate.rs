//! The single boundary between scraped candidates and stored deals.

use std::fmt;

use dealwatch_core::DealRecord;
use rust_decimal::{Decimal, RoundingStrategy};
use sha2::{Digest, Sha256};

use crate::extract::CandidateRecord;

/// Scraped and computed percentages may drift apart by rounding on the page;
/// beyond this many points the mismatch is worth a debug line.
const PERCENT_DRIFT_POINTS: Decimal = Decimal::TWO;

/// Why a candidate was not promoted to a [`DealRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingOriginalPrice,
    MissingDiscountedPrice,
    NonPositivePrice,
    NotDiscounted { original: Decimal, discounted: Decimal },
    DiscountOutOfRange(Decimal),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingOriginalPrice => f.write_str("original price missing"),
            Self::MissingDiscountedPrice => f.write_str("discounted price missing"),
            Self::NonPositivePrice => f.write_str("price is not positive"),
            Self::NotDiscounted {
                original,
                discounted,
            } => write!(f, "discounted price {discounted} is not below original {original}"),
            Self::DiscountOutOfRange(d) => write!(f, "discount {d}% is outside (0, 100)"),
        }
    }
}

/// Promotes a candidate to a [`DealRecord`], or says why it cannot.
///
/// Prices and the discount are rounded to two decimal places before the
/// checks run, so a stored record always satisfies
/// `original_price > discounted_price > 0` and `0 < discount_percent < 100`
/// exactly as serialized.
///
/// # Errors
///
/// Returns the first [`RejectReason`] that applies. Rejection is routine
/// input filtering, not a fault.
pub fn validate(candidate: CandidateRecord) -> Result<DealRecord, RejectReason> {
    let original = candidate
        .original_price
        .map(to_cents)
        .ok_or(RejectReason::MissingOriginalPrice)?;
    let discounted = candidate
        .discounted_price
        .map(to_cents)
        .ok_or(RejectReason::MissingDiscountedPrice)?;

    if original <= Decimal::ZERO || discounted <= Decimal::ZERO {
        return Err(RejectReason::NonPositivePrice);
    }
    if discounted >= original {
        return Err(RejectReason::NotDiscounted {
            original,
            discounted,
        });
    }

    let computed = to_cents((original - discounted) / original * Decimal::ONE_HUNDRED);
    let discount = match candidate.discount_percent.map(to_cents) {
        Some(scraped) => {
            if (scraped - computed).abs() > PERCENT_DRIFT_POINTS {
                tracing::debug!(
                    %scraped,
                    %computed,
                    source_url = %candidate.source_url,
                    "scraped discount disagrees with prices; keeping scraped value"
                );
            }
            scraped
        }
        None => computed,
    };
    if discount <= Decimal::ZERO || discount >= Decimal::ONE_HUNDRED {
        return Err(RejectReason::DiscountOutOfRange(discount));
    }

    let title = candidate
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_owned();
    let product_url = non_blank(candidate.product_url);
    let id = deal_id(product_url.as_deref(), &title, discounted);

    Ok(DealRecord {
        id,
        platform: candidate.platform,
        title,
        brand: non_blank(candidate.brand),
        category: non_blank(candidate.category),
        description: non_blank(candidate.description),
        image_url: non_blank(candidate.image_url),
        product_url,
        original_price: original,
        discounted_price: discounted,
        discount_percent: discount,
        expiry: non_blank(candidate.expiry),
        source_url: candidate.source_url,
    })
}

/// Stable identity of a deal: the product URL when known, else title + price.
#[must_use]
pub fn deal_id(product_url: Option<&str>, title: &str, discounted_price: Decimal) -> String {
    let digest = match product_url {
        Some(url) => Sha256::digest(url.as_bytes()),
        None => Sha256::digest(format!("{title}\0{discounted_price}").as_bytes()),
    };
    format!("{digest:x}")
}

fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Lets restored records pass back through [`validate`].
impl From<DealRecord> for CandidateRecord {
    fn from(record: DealRecord) -> Self {
        Self {
            platform: record.platform,
            source_url: record.source_url,
            title: Some(record.title),
            brand: record.brand,
            category: record.category,
            description: record.description,
            image_url: record.image_url,
            product_url: record.product_url,
            original_price: Some(record.original_price),
            discounted_price: Some(record.discounted_price),
            discount_percent: Some(record.discount_percent),
            expiry: record.expiry,
        }
    }
}
