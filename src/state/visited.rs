use parking_lot::RwLock;
use std::collections::HashSet;

/// Set of URLs already admitted during a run
///
/// URLs are stored exactly as given: no case folding, trailing-slash or query
/// canonicalization happens here, so two spellings of the same page are two
/// entries. Entries are never removed.
#[derive(Debug, Default)]
pub struct VisitSet {
    visited: RwLock<HashSet<String>>,
}

impl VisitSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited
    pub fn add(&self, url: &str) {
        self.visited.write().insert(url.to_string());
    }

    /// Returns true if `url` has been marked visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.read().contains(url)
    }

    /// Marks `url` as visited, returning false if it already was
    ///
    /// The check and the insert happen under one write lock, so exactly one of
    /// several concurrent callers for the same URL gets `true`.
    pub fn insert_if_absent(&self, url: &str) -> bool {
        let mut visited = self.visited.write();
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    /// Returns the number of visited URLs
    pub fn len(&self) -> usize {
        self.visited.read().len()
    }

    /// Returns true if nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.visited.read().is_empty()
    }
}
