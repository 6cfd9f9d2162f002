use url::Url;

/// Extracts the lower-cased host of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use polite_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs point at the same host and port
///
/// Hosts compare case-insensitively and a missing port equals the scheme's
/// default, so `https://a.example/` and `https://A.example:443/x` are the
/// same host while `http://a.example:8080/` is not.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(host_a), Some(host_b)) => {
            host_a == host_b && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}
