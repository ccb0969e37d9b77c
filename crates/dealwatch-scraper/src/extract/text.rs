//! Element text lookups and price / percentage parsing shared by the
//! platform block readers.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid price regex"));
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:\.\d+)?)\s*(?:%|percent)").expect("valid percent regex")
});
static DISCOUNT_IN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:-\s?(\d{1,3}(?:\.\d+)?)\s*%|(\d{1,3}(?:\.\d+)?)\s*%\s*off)")
        .expect("valid discount regex")
});

/// Compiles a fixed list of CSS selectors. Only called with literals.
pub(crate) fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .map(|p| Selector::parse(p).expect("valid selector"))
        .collect()
}

/// Text content of `el` with runs of whitespace (NBSP included) collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty text among elements matching `selectors`, tried in order.
pub(crate) fn first_text(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        scope
            .select(sel)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

/// First non-empty value of any of `attrs` on elements matching `selectors`.
pub(crate) fn first_attr(
    scope: ElementRef<'_>,
    selectors: &[Selector],
    attrs: &[&str],
) -> Option<String> {
    selectors.iter().find_map(|sel| {
        scope.select(sel).find_map(|el| {
            attrs.iter().find_map(|attr| {
                el.value()
                    .attr(attr)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(ToOwned::to_owned)
            })
        })
    })
}

/// Parses a formatted price such as `"AED 1,299.00"`, `"₹1,299"` or
/// `"AED\u{a0}49.50"` into a decimal amount.
///
/// Returns `None` when the text contains no number.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let m = PRICE_RE.find(text)?;
    let digits = m.as_str().replace(',', "");
    Decimal::from_str(&digits).ok()
}

/// Parses the first percentage in `text`: `"35%"`, `"-35%"`, `"Save 12.5 %"`,
/// `"with 35 percent savings"`.
#[must_use]
pub fn parse_percent(text: &str) -> Option<Decimal> {
    let caps = PERCENT_RE.captures(text)?;
    Decimal::from_str(caps.get(1)?.as_str()).ok()
}

/// Finds a discount phrased as `"35% off"` or `"-35%"` anywhere in free text.
/// Stricter than [`parse_percent`] so unrelated percentages are ignored.
pub(crate) fn find_discount_in_text(text: &str) -> Option<Decimal> {
    let caps = DISCOUNT_IN_TEXT_RE.captures(text)?;
    let value = caps.get(1).or_else(|| caps.get(2))?;
    Decimal::from_str(value.as_str()).ok()
}
