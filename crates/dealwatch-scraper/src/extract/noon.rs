//! noon product boxes.
//!
//! noon ships CSS-module class names with a build hash in the middle
//! (`Price-module-scss-module__q-4KEG__amount`), so selectors match on the
//! stable module and element parts only.

use std::sync::LazyLock;

use reqwest::Url;
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
        r#"[class*="PBoxLinkHandler"][class*="linkWrapper"]"#,
        r#"[class*="productContainer"]"#,
        r#"div[data-qa="product-block"]"#,
    ])
});

pub(super) static BREADCRUMBS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="Breadcrumb"] a"#,
        r#"nav[aria-label*="readcrumb"] a"#,
    ])
});

static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="ProductDetailsSection"][class*="title"]"#,
        r#"[data-qa="product-name"]"#,
        r#"[class*="productTitle"]"#,
        "h2",
        "h3",
    ])
});

static CURRENT_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="Price-module"][class*="__amount"]"#,
        r#"[class*="priceNow"]"#,
        "strong.amount",
    ])
});

static OLD_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="Price-module"][class*="__oldPrice"]"#,
        r#"[class*="priceWas"]"#,
        "span.oldPrice",
    ])
});

static DISCOUNT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="__discount"]"#,
        r#"[class*="profit"]"#,
        "span.discount",
    ])
});

static BRAND: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="ProductDetailsSection"][class*="brand"]"#,
        r#"[data-qa="product-brand"]"#,
    ])
});

static DESCRIPTION: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[class*="ProductDetailsSection"] ul li"#]));

static IMAGE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"img[class*="ProductImageCarousel"][class*="productImage"]"#,
        r#"[class*="productImage"] img"#,
        "img",
    ])
});

static EXPIRY: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[class*="Timer"]"#, r#"[class*="countdown"]"#]));

static LINK: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"a[class*="PBoxLinkHandler"][class*="productBoxLink"]"#,
        "a[href]",
    ])
});

// Product detail page.

static DETAIL_TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        r#"[class*="ProductTitle-module"][class*="__title"]"#,
        r#"h1[data-qa*="pdp-name"]"#,
        "h1",
    ])
});

static DETAIL_PRICE_NOW: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[class*="PriceOffer"][class*="__priceNowText"]"#]));

static DETAIL_PRICE_WAS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[class*="PriceOffer"][class*="__priceWasText"]"#]));

static DETAIL_PROFIT: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[class*="PriceOffer"][class*="__profit"]"#]));

static DETAIL_DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[r#"[class*="SectionWrapper-module"][class*="__sectionBody"]"#])
});

static DETAIL_IMAGE: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&[r#"[class*="GalleryV2-module"][class*="__magnifyWrapper"] img"#]));

pub(super) fn read_detail(root: ElementRef<'_>, base: &Url) -> ProductDetails {
    ProductDetails {
        title: first_text(root, &DETAIL_TITLE),
        brand: None,
        category: breadcrumb_trail(root, &BREADCRUMBS),
        description: first_text(root, &DETAIL_DESCRIPTION),
        image_url: first_attr(root, &DETAIL_IMAGE, &["src", "data-src"])
            .and_then(|src| crate::client::absolutize_asset_url(base, &src)),
        original_price: first_text(root, &DETAIL_PRICE_WAS).and_then(|t| parse_price(&t)),
        discounted_price: first_text(root, &DETAIL_PRICE_NOW).and_then(|t| parse_price(&t)),
        discount_percent: first_text(root, &DETAIL_PROFIT).and_then(|t| parse_percent(&t)),
        expiry: None,
    }
}

pub(super) fn read_block(block: ElementRef<'_>, ctx: &PageContext<'_>) -> CandidateRecord {
    let mut record = ctx.record();

    record.title = first_text(block, &TITLE);
    record.brand = first_text(block, &BRAND);
    record.description = bullet_description(block, &DESCRIPTION);
    record.image_url = first_attr(block, &IMAGE, &["src", "data-src"])
        .and_then(|src| crate::client::absolutize_asset_url(ctx.base, &src));
    record.product_url = block_link(block, &LINK, ctx.base);
    record.expiry = first_text(block, &EXPIRY);

    record.original_price = first_text(block, &OLD_PRICE).and_then(|t| parse_price(&t));
    record.discounted_price = first_text(block, &CURRENT_PRICE).and_then(|t| parse_price(&t));
    record.discount_percent = first_text(block, &DISCOUNT)
        .and_then(|t| parse_percent(&t))
        .or_else(|| find_discount_in_text(&element_text(block)));

    record
}
