//! URL helpers for listing pages and the product links found on them.

use reqwest::Url;

use crate::error::FetchError;

/// Parses a listing-page URL, accepting only `http` and `https`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] when the URL does not parse, has no
/// host, or uses another scheme.
pub fn parse_target_url(raw: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}

/// Resolves `href` against `base` and drops the query string and fragment,
/// which on storefronts only carry tracking parameters.
///
/// Returns `None` for `javascript:`/`mailto:` links and unparsable values.
#[must_use]
pub fn absolutize_product_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Resolves an image `src` against `base` without touching its query.
#[must_use]
pub fn absolutize_asset_url(base: &Url, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    base.join(src).ok().map(|u| u.to_string())
}
