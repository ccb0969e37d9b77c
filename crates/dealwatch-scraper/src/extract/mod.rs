//! Turns a fetched listing page into a lazy sequence of candidate records.
//!
//! Each platform contributes an ordered list of block (product card)
//! selectors and a reader that pulls fields out of one block. The first block
//! selector with any match on the page wins; field lookups inside a block are
//! tried in order and fall back to the next selector when a lookup finds
//! nothing. A field that no selector finds stays `None` and is left for the
//! validator to judge.

mod amazon;
mod detail;
mod noon;
pub mod text;

pub use detail::ProductDetails;

use dealwatch_core::Platform;
use reqwest::Url;
use rust_decimal::Decimal;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::client::PageContent;
use crate::error::ExtractionFault;

/// Raw, partially populated deal as read from one product block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub platform: Platform,
    pub source_url: String,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub original_price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub expiry: Option<String>,
}

impl CandidateRecord {
    #[must_use]
    pub fn new(platform: Platform, source_url: impl Into<String>) -> Self {
        Self {
            platform,
            source_url: source_url.into(),
            title: None,
            brand: None,
            category: None,
            description: None,
            image_url: None,
            product_url: None,
            original_price: None,
            discounted_price: None,
            discount_percent: None,
            expiry: None,
        }
    }
}

/// Page-wide values a block reader needs alongside the block itself.
pub(crate) struct PageContext<'a> {
    pub platform: Platform,
    pub base: &'a Url,
    pub source_url: &'a str,
    pub category: Option<&'a str>,
}

impl PageContext<'_> {
    pub(crate) fn record(&self) -> CandidateRecord {
        let mut record = CandidateRecord::new(self.platform, self.source_url);
        record.category = self.category.map(ToOwned::to_owned);
        record
    }
}

type BlockReader = fn(ElementRef<'_>, &PageContext<'_>) -> CandidateRecord;

struct PlatformRules {
    blocks: &'static [Selector],
    breadcrumbs: &'static [Selector],
    read: BlockReader,
}

fn rules(platform: Platform) -> PlatformRules {
    match platform {
        Platform::Amazon => PlatformRules {
            blocks: &amazon::BLOCKS,
            breadcrumbs: &amazon::BREADCRUMBS,
            read: amazon::read_block,
        },
        Platform::Noon => PlatformRules {
            blocks: &noon::BLOCKS,
            breadcrumbs: &noon::BREADCRUMBS,
            read: noon::read_block,
        },
    }
}

/// A parsed listing page.
///
/// Holds the DOM, so it is neither `Send` nor `Sync`; parse, iterate and drop
/// it without crossing an `.await`.
pub struct ListingPage {
    platform: Platform,
    document: Html,
    base: Url,
    source_url: String,
    category: Option<String>,
}

impl std::fmt::Debug for ListingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingPage")
            .field("platform", &self.platform)
            .field("source_url", &self.source_url)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl ListingPage {
    /// Parses `page` as a listing page for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionFault::EmptyDocument`] when the page has no usable
    /// body, and [`ExtractionFault::InvalidBaseUrl`] when the page URL cannot
    /// serve as a base for relative links.
    pub fn parse(platform: Platform, page: &PageContent) -> Result<Self, ExtractionFault> {
        let (document, base) = parse_document(page)?;
        let category = breadcrumb_category(document.root_element(), rules(platform).breadcrumbs);

        Ok(Self {
            platform,
            document,
            base,
            source_url: page.url.clone(),
            category,
        })
    }

    /// Yields up to `limit` candidates in document order. `None` reads every
    /// block. Blocks are only read as the iterator is advanced.
    pub fn candidates(&self, limit: Option<usize>) -> impl Iterator<Item = CandidateRecord> + '_ {
        let rules = rules(self.platform);
        let ctx = PageContext {
            platform: self.platform,
            base: &self.base,
            source_url: &self.source_url,
            category: self.category.as_deref(),
        };
        let matched = rules
            .blocks
            .iter()
            .find(|sel| self.document.select(sel).next().is_some());
        if matched.is_none() {
            tracing::debug!(
                platform = %self.platform,
                url = %self.source_url,
                "no product blocks matched on page"
            );
        }
        let read = rules.read;
        matched
            .map(|sel| self.document.select(sel))
            .into_iter()
            .flatten()
            .take(limit.unwrap_or(usize::MAX))
            .map(move |block| read(block, &ctx))
    }
}

/// Parses `page` into a document and the base URL its links resolve against.
fn parse_document(page: &PageContent) -> Result<(Html, Url), ExtractionFault> {
    let empty = || ExtractionFault::EmptyDocument {
        url: page.url.clone(),
    };
    if page.body.trim().is_empty() {
        return Err(empty());
    }

    let document = Html::parse_document(&page.body);
    let body = document.select(&BODY).next().ok_or_else(empty)?;
    if !has_content(body) {
        return Err(empty());
    }

    let base = Url::parse(&page.url).map_err(|_| ExtractionFault::InvalidBaseUrl {
        url: page.url.clone(),
    })?;
    Ok((document, base))
}

static BODY: std::sync::LazyLock<Selector> =
    std::sync::LazyLock::new(|| Selector::parse("body").expect("valid selector"));

fn has_content(body: ElementRef<'_>) -> bool {
    body.children().any(|node| match node.value() {
        Node::Element(_) => true,
        Node::Text(t) => !t.trim().is_empty(),
        _ => false,
    })
}

fn breadcrumb_entries<'a>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
) -> impl Iterator<Item = String> + 'a {
    scope
        .select(selector)
        .map(text::element_text)
        .filter(|t| !t.is_empty() && !matches!(t.as_str(), "›" | ">" | "/"))
        .filter(|t| !t.eq_ignore_ascii_case("home"))
}

/// Last meaningful breadcrumb entry, skipping separators and "Home"-like roots.
fn breadcrumb_category(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|sel| breadcrumb_entries(scope, sel).last())
}

/// Whole breadcrumb path, e.g. `"Electronics > Headphones"`.
pub(crate) fn breadcrumb_trail(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        let entries: Vec<String> = breadcrumb_entries(scope, sel).collect();
        (!entries.is_empty()).then(|| entries.join(" > "))
    })
}

/// Reads a block's link, using the block itself when it is an anchor.
pub(crate) fn block_link(block: ElementRef<'_>, selectors: &[Selector], base: &Url) -> Option<String> {
    let href = if block.value().name() == "a" {
        block.value().attr("href").map(ToOwned::to_owned)
    } else {
        None
    };
    href.or_else(|| text::first_attr(block, selectors, &["href"]))
        .and_then(|href| crate::client::absolutize_product_url(base, &href))
}

/// Joins up to five list items longer than a few characters into one line.
pub(crate) fn bullet_description(block: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        let bullets: Vec<String> = block
            .select(sel)
            .map(text::element_text)
            .filter(|t| t.chars().count() > 5)
            .take(5)
            .collect();
        (!bullets.is_empty()).then(|| bullets.join(" | "))
    })
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
