//! Anchor extraction for the HTTP engine
//!
//! Parses an HTML page and returns every `<a href>` with its `rel` attribute,
//! resolved against the page URL.

use crate::engine::DiscoveredLink;
use scraper::{Html, Selector};
use url::Url;

/// Extracts the anchors of an HTML page
///
/// # Extraction Rules
///
/// **Skipped entirely:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - fragment-only hrefs (same page anchors)
/// - empty hrefs
/// - `<a download>` anchors
///
/// Hrefs that fail to resolve, or resolve to a non-HTTP(S) URL, are still
/// reported with an empty `url` so callers can observe them.
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `base_url` - URL the page was served from
/// * `depth` - Depth assigned to the discovered links
pub fn extract_links(html: &str, base_url: &Url, depth: usize) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if is_skipped_href(href) {
            continue;
        }

        links.push(DiscoveredLink {
            url: resolve_link(href, base_url).unwrap_or_default(),
            href: href.to_string(),
            rel: element.value().attr("rel").map(str::to_string),
            source: base_url.clone(),
            depth,
        });
    }

    links
}

fn is_skipped_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
}

/// Resolves an href to an absolute HTTP(S) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
