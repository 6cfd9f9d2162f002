//! Robots.txt parser implementation
//!
//! Path matching (longest match, `Allow` winning ties, `*` and `$` patterns) is
//! delegated to the robotstxt crate. This module adds what the crate does not
//! expose: the list of agent groups, so a compound agent string can be mapped
//! onto the group whose token it contains, and `Crawl-delay` values.

use robotstxt::DefaultMatcher;

/// One `User-agent` group of a robots.txt file
#[derive(Debug, Clone, Default)]
struct AgentGroup {
    /// Lower-cased product tokens, `*` for the wildcard group
    agents: Vec<String>,

    /// Crawl delay in seconds, if the group declares one
    crawl_delay: Option<f64>,
}

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    groups: Vec<AgentGroup>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            groups: parse_groups(content),
        }
    }

    /// Finds the group token a user agent falls under
    ///
    /// The most specific group wins: the longest declared token that the
    /// lower-cased agent contains. Returns `None` when only the wildcard group
    /// (or no group at all) applies.
    pub fn resolve_group(&self, user_agent: &str) -> Option<&str> {
        let normalized_agent = user_agent.to_lowercase();

        self.groups
            .iter()
            .flat_map(|group| group.agents.iter())
            .filter(|token| token.as_str() != "*" && normalized_agent.contains(token.as_str()))
            .max_by_key(|token| token.len())
            .map(String::as_str)
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path to check
    /// * `user_agent` - A single agent token or full user agent string
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let agent = self.resolve_group(user_agent).unwrap_or(user_agent);
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A delay declared by the agent's own group is preferred over the
    /// wildcard group's.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let group_delay = |token: &str| {
            self.groups
                .iter()
                .filter(|group| group.agents.iter().any(|a| a == token))
                .find_map(|group| group.crawl_delay)
        };

        match self.resolve_group(user_agent) {
            Some(token) => group_delay(token).or_else(|| group_delay("*")),
            None => group_delay("*"),
        }
    }
}

/// Splits robots.txt content into agent groups
///
/// Consecutive `User-agent` lines share one group; any other directive closes
/// the agent list so the next `User-agent` line starts a new group.
fn parse_groups(content: &str) -> Vec<AgentGroup> {
    let mut groups: Vec<AgentGroup> = Vec::new();
    let mut collecting_agents = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" | "useragent" | "user agent" => {
                if !collecting_agents {
                    groups.push(AgentGroup::default());
                    collecting_agents = true;
                }
                if let (Some(group), Some(token)) = (groups.last_mut(), group_token(value)) {
                    group.agents.push(token);
                }
            }
            "crawl-delay" | "crawldelay" => {
                collecting_agents = false;
                let delay = value.parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0);
                if let (Some(group), Some(delay)) = (groups.last_mut(), delay) {
                    group.crawl_delay = Some(delay);
                }
            }
            _ => collecting_agents = false,
        }
    }

    groups
}

/// Extracts the matchable token of a `User-agent` value
///
/// Mirrors the robotstxt crate: only the leading run of letters, `-` and `_`
/// counts, so the token can be handed back to the matcher to select the group.
fn group_token(value: &str) -> Option<String> {
    if value.starts_with('*') {
        return Some("*".to_string());
    }

    let token: String = value
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '-' || *c == '_')
        .collect();

    if token.is_empty() {
        None
    } else {
        Some(token.to_lowercase())
    }
}
