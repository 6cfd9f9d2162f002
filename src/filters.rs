//! Ready-made URL predicates for [`CrawlProfile::url_filter`](crate::CrawlProfile::url_filter)

use url::Url;

/// Extensions of binary downloads that are not worth fetching
pub const DEFAULT_BANNED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".flac", ".mp3", ".mp4", ".wav", ".7z", ".p7zip", ".rar", ".zip",
];

/// Returns the default banned extensions as owned strings
pub fn default_banned_extensions() -> Vec<String> {
    DEFAULT_BANNED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// Builds a predicate rejecting URLs whose path ends with one of `extensions`
///
/// Matching ignores case and looks only at the path, so query strings and
/// fragments do not hide an extension. URLs that do not parse are checked
/// as raw strings.
///
/// # Example
///
/// ```
/// use polite_crawler::filters::banned_extensions;
///
/// let filter = banned_extensions(vec![".zip".to_string()]);
/// assert!(!filter("https://example.com/archive.ZIP?download=1"));
/// assert!(filter("https://example.com/page.html"));
/// ```
pub fn banned_extensions(extensions: Vec<String>) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let extensions: Vec<String> = extensions
        .into_iter()
        .map(|ext| ext.to_lowercase())
        .collect();

    move |url: &str| {
        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_lowercase(),
            Err(_) => url.to_lowercase(),
        };
        !extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}
