//! Hidden-file and search filtering of the displayed entries.

use globset::{GlobBuilder, GlobMatcher};

use farfile_core::{DirectoryListing, FileEntry, SearchMode};

/// Decides which listing entries are displayed.
///
/// Filtering only affects what is shown; it never changes the selection.
#[derive(Debug, Clone)]
pub struct ViewFilter {
    show_hidden: bool,
    mode: SearchMode,
    query: String,
    /// Lowercased query for substring matching.
    needle: String,
    /// Compiled query in glob mode; `None` falls back to substring.
    glob: Option<GlobMatcher>,
    parent_sentinel: String,
}

impl ViewFilter {
    /// Create a filter with no search text.
    pub fn new(show_hidden: bool, mode: SearchMode, parent_sentinel: impl Into<String>) -> Self {
        Self {
            show_hidden,
            mode,
            query: String::new(),
            needle: String::new(),
            glob: None,
            parent_sentinel: parent_sentinel.into(),
        }
    }

    /// Whether dot-files are shown.
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    /// Show or hide dot-files.
    pub fn set_show_hidden(&mut self, show: bool) {
        self.show_hidden = show;
    }

    /// The active search text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The active search mode.
    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Name of the parent-directory entry, which is never displayed.
    pub fn parent_sentinel(&self) -> &str {
        &self.parent_sentinel
    }

    /// Replace the search text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.recompile();
    }

    /// Switch search mode, keeping the text.
    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
        self.recompile();
    }

    /// Drop the search text.
    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    fn recompile(&mut self) {
        self.needle = self.query.to_lowercase();
        self.glob = match self.mode {
            SearchMode::Glob if !self.query.is_empty() => GlobBuilder::new(&self.query)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .ok()
                .map(|g| g.compile_matcher()),
            _ => None,
        };
    }

    /// Check if the entry is the parent-directory sentinel.
    pub fn is_sentinel(&self, entry: &FileEntry) -> bool {
        entry.name == self.parent_sentinel
    }

    /// Check if an entry is displayed.
    pub fn matches(&self, entry: &FileEntry) -> bool {
        if self.is_sentinel(entry) {
            return false;
        }
        if !self.show_hidden && entry.is_hidden() {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }

        match &self.glob {
            Some(glob) => glob.is_match(entry.name.as_str()),
            None => entry.name.to_lowercase().contains(&self.needle),
        }
    }

    /// Displayed entries, in listing order.
    pub fn visible<'a>(&self, listing: &'a DirectoryListing) -> Vec<&'a FileEntry> {
        listing.iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> DirectoryListing {
        DirectoryListing::new(
            "/sdcard/",
            vec![
                FileEntry::directory("..", "/"),
                FileEntry::directory("DCIM", "/sdcard/DCIM"),
                FileEntry::file(".nomedia", "/sdcard/.nomedia", 0),
                FileEntry::file("Photo.JPG", "/sdcard/Photo.JPG", 10),
                FileEntry::file("notes.txt", "/sdcard/notes.txt", 10),
            ],
        )
    }

    fn names(filter: &ViewFilter, listing: &DirectoryListing) -> Vec<String> {
        filter
            .visible(listing)
            .into_iter()
            .map(|e| e.name.to_string())
            .collect()
    }

    #[test]
    fn test_sentinel_never_visible() {
        let filter = ViewFilter::new(true, SearchMode::Substring, "..");
        assert_eq!(
            names(&filter, &listing()),
            vec!["DCIM", ".nomedia", "Photo.JPG", "notes.txt"]
        );
    }

    #[test]
    fn test_hidden_files() {
        let filter = ViewFilter::new(false, SearchMode::Substring, "..");
        assert_eq!(names(&filter, &listing()), vec!["DCIM", "Photo.JPG", "notes.txt"]);
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let mut filter = ViewFilter::new(true, SearchMode::Substring, "..");
        filter.set_query("PHOTO");
        assert_eq!(names(&filter, &listing()), vec!["Photo.JPG"]);

        filter.clear_query();
        assert_eq!(names(&filter, &listing()).len(), 4);
    }

    #[test]
    fn test_glob_mode() {
        let mut filter = ViewFilter::new(true, SearchMode::Glob, "..");
        filter.set_query("*.jpg");
        assert_eq!(names(&filter, &listing()), vec!["Photo.JPG"]);

        filter.set_mode(SearchMode::Substring);
        assert!(names(&filter, &listing()).is_empty());
    }

    #[test]
    fn test_invalid_glob_falls_back_to_substring() {
        let mut filter = ViewFilter::new(true, SearchMode::Glob, "..");
        filter.set_query("[notes");
        assert!(names(&filter, &listing()).is_empty());

        filter.set_query("{notes");
        assert!(names(&filter, &listing()).is_empty());

        filter.set_query("notes*");
        assert_eq!(names(&filter, &listing()), vec!["notes.txt"]);
    }
}
