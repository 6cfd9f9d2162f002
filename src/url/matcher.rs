/// Checks if a host matches a domain glob
///
/// Two forms are supported, compared case-insensitively:
/// 1. Exact: "example.com" matches only "example.com"
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain of it
///
/// # Examples
///
/// ```
/// use polite_crawler::url::matches_domain_glob;
///
/// assert!(matches_domain_glob("example.com", "EXAMPLE.com"));
/// assert!(!matches_domain_glob("example.com", "blog.example.com"));
///
/// assert!(matches_domain_glob("*.example.com", "example.com"));
/// assert!(matches_domain_glob("*.example.com", "api.v2.example.com"));
/// assert!(!matches_domain_glob("*.example.com", "myexample.com"));
/// ```
pub fn matches_domain_glob(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let host = host.to_lowercase();

    if let Some(base) = pattern.strip_prefix("*.") {
        host == base || host.ends_with(&format!(".{}", base))
    } else {
        host == pattern
    }
}

/// Returns true if `host` matches at least one of `patterns`
///
/// An empty pattern list matches every host.
pub fn matches_any_glob(patterns: &[String], host: &str) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| matches_domain_glob(p, host))
}
