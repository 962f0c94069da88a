//! Browser-style back/forward history over remote paths.

use farfile_core::path::parent_dir;

/// Visited paths plus a cursor into them.
///
/// Invariant: `index < entries.len()`, and `entries` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: Vec<String>,
    index: usize,
}

impl NavigationHistory {
    /// Start a history at `home`.
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            entries: vec![home.into()],
            index: 0,
        }
    }

    /// The currently displayed path.
    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    /// Position of the current path in the history.
    pub fn index(&self) -> usize {
        self.index
    }

    /// All visited paths, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of history entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its starting path.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if there is an entry before the current one.
    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    /// Check if there is an entry after the current one.
    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Visit `path`, discarding any forward entries.
    ///
    /// The path is used as given. Returns `false` if it is already current.
    pub fn navigate_to(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if path == self.current() {
            return false;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(path);
        self.index = self.entries.len() - 1;
        true
    }

    /// Step back one entry. Returns `false` at the start of history.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one entry. Returns `false` at the end of history.
    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Visit the parent of the current path. Root is a no-op.
    pub fn up(&mut self) -> bool {
        match parent_dir(self.current()) {
            Some(parent) => self.navigate_to(parent),
            None => false,
        }
    }
}
