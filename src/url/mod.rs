//! URL helpers
//!
//! Host extraction and comparison used by the admission pipeline, and
//! domain-glob matching used to scope the fetch engine.

mod domain;
mod matcher;

pub use domain::{extract_domain, same_host};
pub use matcher::{matches_any_glob, matches_domain_glob};

/// Validates a domain glob such as `example.com` or `*.example.com`
pub fn validate_domain_glob(pattern: &str) -> Result<(), String> {
    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(format!("Domain pattern '{}' is empty", pattern));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(format!("Domain '{}' contains invalid characters", domain));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(format!("Domain '{}' is malformed", domain));
    }

    Ok(())
}
