//! Search and filtering over already-built views.
//!
//! Filters never touch a `ParsedProfile`; they return new vectors (or id
//! sets) that reference the same data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::aggregator::{BottomUpNode, FlameNode, HotFunction};
use crate::parser::category::Category;

/// Criteria applied to hot functions and bottom-up entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFilter {
    /// Case-insensitive substring matched against name or url
    pub search: String,

    /// Minimum self percentage to keep an entry
    pub min_percentage: f64,

    /// Hide idle and program time
    pub hide_idle: bool,
    pub hide_gc: bool,
    pub hide_native: bool,

    /// When non-empty, only these categories are kept
    pub categories: Vec<Category>,
}

impl ProfileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_min_percentage(mut self, min_percentage: f64) -> Self {
        self.min_percentage = min_percentage;
        self
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.min_percentage <= 0.0
            && !self.hide_idle
            && !self.hide_gc
            && !self.hide_native
            && self.categories.is_empty()
    }

    fn matches_search(&self, name: &str, url: &str) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        name.to_lowercase().contains(&needle) || url.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, category: Category) -> bool {
        if self.hide_idle && matches!(category, Category::Idle | Category::Program) {
            return false;
        }
        if self.hide_gc && category == Category::Gc {
            return false;
        }
        if self.hide_native && category == Category::Native {
            return false;
        }
        self.categories.is_empty() || self.categories.contains(&category)
    }

    fn matches(&self, name: &str, url: &str, self_percentage: f64, category: Category) -> bool {
        self.matches_search(name, url)
            && (self.min_percentage <= 0.0 || self_percentage >= self.min_percentage)
            && self.matches_category(category)
    }

    /// Hot functions passing every criterion, original order kept
    pub fn hot_functions<'a>(&self, functions: &'a [HotFunction]) -> Vec<&'a HotFunction> {
        functions
            .iter()
            .filter(|f| self.matches(&f.name, &f.url, f.self_percentage, f.category))
            .collect()
    }

    /// Bottom-up entries passing every criterion, original order kept
    pub fn bottom_up<'a>(&self, nodes: &'a [BottomUpNode]) -> Vec<&'a BottomUpNode> {
        nodes
            .iter()
            .filter(|n| self.matches(&n.name, &n.url, n.self_percentage, n.category))
            .collect()
    }

    /// Ids of flame graph frames whose name matches the search text
    ///
    /// Empty when no search is set.
    pub fn matching_flame_ids(&self, root: &FlameNode) -> BTreeSet<u64> {
        if self.search.is_empty() {
            return BTreeSet::new();
        }
        let needle = self.search.to_lowercase();
        root.flatten()
            .into_iter()
            .filter(|node| node.name.to_lowercase().contains(&needle))
            .map(|node| node.id)
            .collect()
    }
}
