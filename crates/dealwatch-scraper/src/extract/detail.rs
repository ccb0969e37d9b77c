use dealwatch_core::Platform;
use rust_decimal::Decimal;

use super::{amazon, noon, parse_document, CandidateRecord};
use crate::client::PageContent;
use crate::error::ExtractionFault;

/// Fields read from a single product page.
///
/// Product pages carry richer data than listing cards: the full title, the
/// brand byline, the whole breadcrumb trail and feature bullets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDetails {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub original_price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub expiry: Option<String>,
}

impl ProductDetails {
    /// Parses `page` as a product page for `platform`.
    ///
    /// # Errors
    ///
    /// Same faults as [`super::ListingPage::parse`].
    pub fn parse(platform: Platform, page: &PageContent) -> Result<Self, ExtractionFault> {
        let (document, base) = parse_document(page)?;
        let root = document.root_element();
        Ok(match platform {
            Platform::Amazon => amazon::read_detail(root, &base),
            Platform::Noon => noon::read_detail(root, &base),
        })
    }

    fn has_price(&self) -> bool {
        self.original_price.is_some() || self.discounted_price.is_some()
    }
}

impl CandidateRecord {
    /// Overlays product-page fields onto a listing candidate. Fields the
    /// product page did not yield keep their listing value.
    pub fn enrich(&mut self, details: ProductDetails) {
        // A card percent describes the card prices, not the product page's.
        if details.has_price() && details.discount_percent.is_none() {
            self.discount_percent = None;
        }

        overlay(&mut self.title, details.title);
        overlay(&mut self.brand, details.brand);
        overlay(&mut self.category, details.category);
        overlay(&mut self.description, details.description);
        overlay(&mut self.image_url, details.image_url);
        overlay(&mut self.original_price, details.original_price);
        overlay(&mut self.discounted_price, details.discounted_price);
        overlay(&mut self.discount_percent, details.discount_percent);
        overlay(&mut self.expiry, details.expiry);
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
