//! Amazon deal and search-result cards.

use std::sync::LazyLock;

use reqwest::Url;
use rust_decimal::Decimal;
use scraper::{ElementRef, Selector};

use super::text::{
    element_text, find_discount_in_text, first_attr, first_text, parse_percent, parse_price,
    selectors,
};
use super::{
    block_link, breadcrumb_trail, bullet_description, CandidateRecord, PageContext, ProductDetails,
};

pub(super) static BLOCKS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[data-testid="product-card"]"#,
        "div[data-deal-id]",
        r#"div[data-component-type="s-search-result"]"#,
        r#"div[data-asin]:not([data-asin=""])"#,
    ])
});

pub(super) static BREADCRUMBS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "#wayfinding-breadcrumbs_container ul li a",
        "#wayfinding-breadcrumbs_feature_div ul li a",
        r#"nav[aria-label*="readcrumb"] a"#,
        r#"div[id*="breadcrumb"] a"#,
    ])
});

static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[data-testid="product-card-title"]"#,
        "h2",
        ".a-truncate-full",
        ".p13n-sc-truncate",
    ])
});

static STRIKE_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"span.a-price[data-a-strike="true"] .a-offscreen"#,
        ".a-text-price .a-offscreen",
        ".basisPrice .a-offscreen",
    ])
});

static SAVINGS_SUMMARY: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[".aok-offscreen"]));

static CURRENT_PRICE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#".a-price:not([data-a-strike="true"]) .a-offscreen"#]));

static PRICE_WHOLE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[".a-price:not([data-a-strike]) .a-price-whole"]));

static PRICE_FRACTION: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[".a-price:not([data-a-strike]) .a-price-fraction"]));

static DISCOUNT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        ".savingsPercentage",
        r#"[data-testid="badge-discount"]"#,
        ".a-badge-text",
    ])
});

static BRAND: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[data-testid="product-card-brand"]"#,
        ".a-row .a-size-base-plus.a-color-base",
    ])
});

static IMAGE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&["img.s-image", "img[data-a-dynamic-image]", "img"]));

static EXPIRY: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"span[id*="timer"]"#,
        "div[data-dealcountdownstring]",
        "span[data-a-expiration-time]",
    ])
});

const EXPIRY_ATTRS: [&str; 2] = ["data-dealcountdownstring", "data-a-expiration-time"];

static LINK: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"a[data-testid="product-card-link"]"#,
        r#"a[href*="/dp/"]"#,
        r#"a.a-link-normal[href*="/dp/"]"#,
        "a[href]",
    ])
});

// Product detail page.

static DETAIL_TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&["#productTitle"]));

static DETAIL_BRAND: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&["#bylineInfo"]));

static DETAIL_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#".a-price:not([data-a-strike="true"]) .a-offscreen"#,
        "#priceblock_dealprice",
        "#priceblock_ourprice",
    ])
});

static DETAIL_DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "#feature-bullets ul li",
        "div.a-expander-content.a-expander-partial-collapse-content ul li",
        r#"div[class*="a-expander-content"] ul li"#,
    ])
});

static DETAIL_IMAGE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&["#imgTagWrapperId img", "#landingImage"]));

static DETAIL_EXPIRY: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "span#deal-end-time",
        r#"span[id*="timer"]"#,
        "div[data-dealcountdownstring]",
        "span[data-a-expiration-time]",
        "#dealExpiry",
    ])
});

pub(super) fn read_block(block: ElementRef<'_>, ctx: &PageContext<'_>) -> CandidateRecord {
    let mut record = ctx.record();

    record.title = first_text(block, &TITLE);
    record.brand = first_text(block, &BRAND).and_then(|b| clean_brand(&b));
    record.image_url = image_url(block, &IMAGE, ctx.base);
    record.product_url = block_link(block, &LINK, ctx.base);
    record.expiry =
        first_text(block, &EXPIRY).or_else(|| first_attr(block, &EXPIRY, &EXPIRY_ATTRS));

    let prices = read_prices(block, &CURRENT_PRICE);
    record.original_price = prices.original;
    record.discounted_price = prices.discounted;
    record.discount_percent = prices
        .percent
        .or_else(|| find_discount_in_text(&element_text(block)));

    record
}

/// Reads a product page. `root` is the document root; `base` resolves
/// relative image links.
pub(super) fn read_detail(root: ElementRef<'_>, base: &Url) -> ProductDetails {
    let prices = read_prices(root, &DETAIL_PRICE);
    ProductDetails {
        title: first_text(root, &DETAIL_TITLE),
        brand: first_text(root, &DETAIL_BRAND).and_then(|b| clean_brand(&b)),
        category: breadcrumb_trail(root, &BREADCRUMBS),
        description: bullet_description(root, &DETAIL_DESCRIPTION),
        image_url: image_url(root, &DETAIL_IMAGE, base),
        original_price: prices.original,
        discounted_price: prices.discounted,
        discount_percent: prices.percent,
        expiry: first_text(root, &DETAIL_EXPIRY)
            .or_else(|| first_attr(root, &DETAIL_EXPIRY, &EXPIRY_ATTRS)),
    }
}

struct Prices {
    original: Option<Decimal>,
    discounted: Option<Decimal>,
    percent: Option<Decimal>,
}

/// Discounted price: savings summary, then whole + fraction, then `current`.
/// Percentage: discount badge, then the summary.
fn read_prices(scope: ElementRef<'_>, current: &[Selector]) -> Prices {
    // "AED 49.50 with 35 percent savings" carries both the price and percentage.
    let summary = savings_summary(scope);
    let discounted = summary
        .as_deref()
        .and_then(parse_price)
        .or_else(|| whole_and_fraction(scope))
        .or_else(|| first_text(scope, current).and_then(|t| parse_price(&t)));
    let percent = first_text(scope, &DISCOUNT)
        .and_then(|t| parse_percent(&t))
        .or_else(|| {
            summary
                .as_deref()
                .and_then(|t| t.split_once(" with "))
                .and_then(|(_, rest)| parse_percent(rest))
        });

    Prices {
        original: first_text(scope, &STRIKE_PRICE).and_then(|t| parse_price(&t)),
        discounted,
        percent,
    }
}

fn savings_summary(scope: ElementRef<'_>) -> Option<String> {
    SAVINGS_SUMMARY
        .iter()
        .flat_map(|sel| scope.select(sel))
        .map(|el| element_text(el).to_ascii_lowercase())
        .find(|t| t.contains(" with ") && t.contains("savings"))
}

fn whole_and_fraction(block: ElementRef<'_>) -> Option<Decimal> {
    let whole = first_text(block, &PRICE_WHOLE)?;
    let whole: String = whole.chars().filter(char::is_ascii_digit).collect();
    if whole.is_empty() {
        return None;
    }
    let fraction: String = first_text(block, &PRICE_FRACTION)
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if fraction.is_empty() {
        parse_price(&whole)
    } else {
        parse_price(&format!("{whole}.{fraction}"))
    }
}

/// Strips the "Visit the … Store" and "Brand:" decorations from a byline.
fn clean_brand(raw: &str) -> Option<String> {
    let mut brand = raw.trim();
    for prefix in ["Visit the", "Brand:"] {
        if let Some(rest) = brand.strip_prefix(prefix) {
            brand = rest.trim();
        }
    }
    if let Some(rest) = brand.strip_suffix("Store") {
        brand = rest.trim();
    }
    (!brand.is_empty()).then(|| brand.to_owned())
}

/// `src`, then the hi-res attribute, then the first URL in the dynamic-image map.
fn image_url(scope: ElementRef<'_>, selectors: &[Selector], base: &Url) -> Option<String> {
    let img = selectors.iter().find_map(|sel| scope.select(sel).next())?;
    let attrs = img.value();
    attrs
        .attr("src")
        .and_then(|src| crate::client::absolutize_asset_url(base, src))
        .or_else(|| {
            attrs
                .attr("data-old-hires")
                .and_then(|src| crate::client::absolutize_asset_url(base, src))
        })
        .or_else(|| {
            attrs
                .attr("data-a-dynamic-image")
                .and_then(first_dynamic_image)
                .and_then(|src| crate::client::absolutize_asset_url(base, &src))
        })
}

fn first_dynamic_image(raw: &str) -> Option<String> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw).ok()?;
    map.keys().next().cloned()
}
