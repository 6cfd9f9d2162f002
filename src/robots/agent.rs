//! Agent-name variants embedded in a user agent string
//!
//! robots.txt authors write groups for product tokens ("MyBot"), while a
//! crawler usually identifies itself with a compound string such as
//! `MyBot/1.0 (+https://example.com/bot)`. The compound string matches none of
//! the groups literally, so every token embedded in it is checked as well.

/// Derives the agent-name variants of a user agent string
///
/// The string is split on `;` and `(`. Each part is trimmed of whitespace and
/// a trailing `)`, loses a leading `+` and an `http://` or `https://` scheme,
/// and is cut at its first `/` (dropping versions and URL paths). Empty parts
/// and duplicates are skipped; order of first appearance is kept.
///
/// # Examples
///
/// ```
/// use polite_crawler::robots::agent_variants;
///
/// assert_eq!(
///     agent_variants("MyBot/1.0 (+https://example.com/bot)"),
///     vec!["MyBot".to_string(), "example.com".to_string()]
/// );
/// ```
pub fn agent_variants(user_agent: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();

    for part in user_agent.split([';', '(']) {
        let Some(token) = agent_token(part) else {
            continue;
        };
        if !variants.iter().any(|v| v == &token) {
            variants.push(token);
        }
    }

    variants
}

/// Reduces one part of a user agent string to its product token
fn agent_token(part: &str) -> Option<String> {
    let mut token = part.trim();
    token = token.trim_end_matches(')').trim();
    token = token.strip_prefix('+').unwrap_or(token);
    token = token
        .strip_prefix("https://")
        .or_else(|| token.strip_prefix("http://"))
        .unwrap_or(token);

    if let Some((product, _version)) = token.split_once('/') {
        token = product;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
