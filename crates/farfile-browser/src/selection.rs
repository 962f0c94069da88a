//! Selected entry names for the current listing.

use std::sync::Arc;

use indexmap::IndexSet;

/// Set of selected entry names, in selection order.
///
/// Names are not checked against the listing: a name hidden by a filter stays
/// selected until cleared. Every mutation builds a new set and swaps it in, so
/// a [`snapshot`](Self::snapshot) never changes underneath its holder.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    selected: Arc<IndexSet<String>>,
}

impl SelectionModel {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a name is selected.
    pub fn contains(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Number of selected names.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected names in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Immutable view of the current selection.
    pub fn snapshot(&self) -> Arc<IndexSet<String>> {
        Arc::clone(&self.selected)
    }

    /// Flip membership of a name.
    pub fn toggle(&mut self, name: &str) {
        let mut next = (*self.selected).clone();
        if !next.shift_remove(name) {
            next.insert(name.to_string());
        }
        self.replace(next);
    }

    /// Select exactly the given names.
    pub fn select_all<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.replace(names.into_iter().map(str::to_string).collect());
    }

    /// Empty the selection.
    pub fn clear(&mut self) {
        if !self.selected.is_empty() {
            self.replace(IndexSet::new());
        }
    }

    /// Add the inclusive span between two names in `order` to the selection.
    ///
    /// The endpoints may be given in either direction. Returns `false`, and
    /// leaves the selection untouched, if either name is not in `order`.
    pub fn select_range(&mut self, order: &[&str], from: &str, to: &str) -> bool {
        let (Some(start), Some(end)) = (
            order.iter().position(|n| *n == from),
            order.iter().position(|n| *n == to),
        ) else {
            return false;
        };

        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let mut next = (*self.selected).clone();
        next.extend(order[lo..=hi].iter().map(|n| n.to_string()));
        self.replace(next);
        true
    }

    fn replace(&mut self, next: IndexSet<String>) {
        self.selected = Arc::new(next);
    }
}
