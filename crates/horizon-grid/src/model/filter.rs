//! Filter pipeline.
//!
//! A row is visible when every filter accepts it. Filters may widen their
//! scope to the row's whole group, and highlighting filters annotate
//! matches instead of hiding non-matches unless the grid is configured to
//! hide rows no highlighting filter matched.

use std::fmt;
use std::sync::Arc;

use super::hierarchy::{ancestors, is_child_element, is_parent_element, whole_group};
use super::provider::ContentProvider;

/// Identifier of an installed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(u64);

impl FilterId {
    /// The structural filter that hides rows under collapsed parents.
    pub const COLLAPSED: FilterId = FilterId(0);

    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A row predicate.
pub trait Filter<T>: Send + Sync {
    /// Returns `true` if `element` passes the filter.
    fn matches(&self, element: &T, content: &dyn ContentProvider<T>) -> bool;

    /// Evaluate against every member of a grouped row's group and accept the
    /// row if any member matches.
    fn show_whole_group(&self) -> bool {
        false
    }

    /// Returns `true` if `element` must be evaluated against its whole group,
    /// typically so a group parent stays visible while any member matches.
    fn is_mandatory_in_group(&self, element: &T, content: &dyn ContentProvider<T>) -> bool {
        let _ = (element, content);
        false
    }

    /// Highlighting filters annotate matches rather than hide non-matches.
    fn is_highlighting(&self) -> bool {
        false
    }

    /// Name used in logs.
    fn name(&self) -> &str {
        "filter"
    }
}

/// Hides rows whose ancestors are collapsed. Always installed first and
/// cannot be removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollapsedGroupFilter;

impl<T> Filter<T> for CollapsedGroupFilter {
    fn matches(&self, element: &T, content: &dyn ContentProvider<T>) -> bool {
        !ancestors(content, element)
            .iter()
            .any(|ancestor| content.is_collapsed(ancestor))
    }

    fn name(&self) -> &str {
        "collapsed-group"
    }
}

/// Type alias for a filter predicate.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A filter built from a closure.
///
/// ```ignore
/// let smiths = PredicateFilter::new("smith", |p: &Person| p.surname == "Smith")
///     .show_whole_group(true);
/// grid.add_filter(Arc::new(smiths));
/// ```
pub struct PredicateFilter<T> {
    name: String,
    predicate: Predicate<T>,
    whole_group: bool,
    mandatory_parents: bool,
    highlighting: bool,
}

impl<T> PredicateFilter<T> {
    /// Creates a plain filter.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            whole_group: false,
            mandatory_parents: false,
            highlighting: false,
        }
    }

    /// Evaluate grouped rows against their whole group.
    pub fn show_whole_group(mut self, enabled: bool) -> Self {
        self.whole_group = enabled;
        self
    }

    /// Keep group parents visible while any member matches.
    pub fn mandatory_parents(mut self, enabled: bool) -> Self {
        self.mandatory_parents = enabled;
        self
    }

    /// Make this a highlighting filter.
    pub fn highlighting(mut self, enabled: bool) -> Self {
        self.highlighting = enabled;
        self
    }
}

impl<T> fmt::Debug for PredicateFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateFilter")
            .field("name", &self.name)
            .field("whole_group", &self.whole_group)
            .field("mandatory_parents", &self.mandatory_parents)
            .field("highlighting", &self.highlighting)
            .finish_non_exhaustive()
    }
}

impl<T> Filter<T> for PredicateFilter<T> {
    fn matches(&self, element: &T, _content: &dyn ContentProvider<T>) -> bool {
        (self.predicate)(element)
    }

    fn show_whole_group(&self) -> bool {
        self.whole_group
    }

    fn is_mandatory_in_group(&self, element: &T, content: &dyn ContentProvider<T>) -> bool {
        self.mandatory_parents && is_parent_element(content, element)
    }

    fn is_highlighting(&self) -> bool {
        self.highlighting
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Result of evaluating the pipeline for one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOutcome {
    /// The row belongs in the visible sequence.
    pub visible: bool,
    /// Highlighting filters that matched.
    pub highlights: Vec<FilterId>,
}

/// The installed filters.
pub struct FilterModel<T> {
    filters: Vec<(FilterId, Arc<dyn Filter<T>>)>,
    next_id: u64,
    hide_none_highlighted_rows: bool,
}

impl<T: 'static> FilterModel<T> {
    /// Creates a pipeline holding only the structural collapse filter.
    pub fn new(hide_none_highlighted_rows: bool) -> Self {
        Self {
            filters: vec![(FilterId::COLLAPSED, Arc::new(CollapsedGroupFilter))],
            next_id: 1,
            hide_none_highlighted_rows,
        }
    }
}

impl<T> FilterModel<T> {
    /// Number of installed filters, including the structural one.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always `false`: the structural filter cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Ids of the installed filters in evaluation order.
    pub fn ids(&self) -> Vec<FilterId> {
        self.filters.iter().map(|(id, _)| *id).collect()
    }

    /// Looks up a filter.
    pub fn get(&self, id: FilterId) -> Option<&Arc<dyn Filter<T>>> {
        self.filters
            .iter()
            .find(|(fid, _)| *fid == id)
            .map(|(_, filter)| filter)
    }

    /// Whether highlighting filters hide rows they do not match.
    pub fn hide_none_highlighted_rows(&self) -> bool {
        self.hide_none_highlighted_rows
    }

    pub(crate) fn set_hide_none_highlighted_rows(&mut self, hide: bool) {
        self.hide_none_highlighted_rows = hide;
    }

    pub(crate) fn add(&mut self, filter: Arc<dyn Filter<T>>) -> FilterId {
        let id = FilterId(self.next_id);
        self.next_id += 1;
        self.filters.push((id, filter));
        id
    }

    /// Removes a filter. The structural filter is never removed.
    pub(crate) fn remove(&mut self, id: FilterId) -> bool {
        if id == FilterId::COLLAPSED {
            return false;
        }
        let before = self.filters.len();
        self.filters.retain(|(fid, _)| *fid != id);
        self.filters.len() != before
    }

    /// Removes every filter except the structural one. Returns `true` if any
    /// filter was removed.
    pub(crate) fn clear(&mut self) -> bool {
        let before = self.filters.len();
        self.filters.retain(|(fid, _)| *fid == FilterId::COLLAPSED);
        self.filters.len() != before
    }

    /// Evaluates every filter for `element`.
    pub fn evaluate(&self, element: &Arc<T>, content: &dyn ContentProvider<T>) -> FilterOutcome {
        let grouped =
            is_parent_element(content, element) || is_child_element(content, element);
        let mut group: Option<Vec<Arc<T>>> = None;
        let mut outcome = FilterOutcome {
            visible: true,
            highlights: Vec::new(),
        };

        for (id, filter) in &self.filters {
            let widen = (filter.show_whole_group() && grouped)
                || filter.is_mandatory_in_group(element, content);
            let matched = if widen {
                group
                    .get_or_insert_with(|| whole_group(content, element))
                    .iter()
                    .any(|member| filter.matches(member, content))
            } else {
                filter.matches(element, content)
            };

            if filter.is_highlighting() {
                if matched {
                    outcome.highlights.push(*id);
                } else if self.hide_none_highlighted_rows {
                    outcome.visible = false;
                }
            } else if !matched {
                outcome.visible = false;
            }
        }
        outcome
    }
}

impl<T> fmt::Debug for FilterModel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<(u64, &str)> = self
            .filters
            .iter()
            .map(|(id, filter)| (id.0, filter.name()))
            .collect();
        f.debug_struct("FilterModel")
            .field("filters", &names)
            .field("hide_none_highlighted_rows", &self.hide_none_highlighted_rows)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hierarchy::test_support::{Person, Tree};

    fn smiths() -> PredicateFilter<Person> {
        PredicateFilter::new("smith", |p: &Person| p.surname == "Smith")
    }

    #[test]
    fn test_structural_filter_is_permanent() {
        let mut model: FilterModel<Person> = FilterModel::new(false);
        assert_eq!(model.len(), 1);
        assert!(!model.remove(FilterId::COLLAPSED));
        let id = model.add(Arc::new(smiths()));
        assert!(model.clear());
        assert!(model.get(id).is_none());
        assert_eq!(model.ids(), vec![FilterId::COLLAPSED]);
    }

    #[test]
    fn test_and_across_filters() {
        let tree = Tree::default();
        let mut model: FilterModel<Person> = FilterModel::new(false);
        model.add(Arc::new(smiths()));
        model.add(Arc::new(PredicateFilter::new("adult", |p: &Person| p.age >= 18)));

        let adult = Tree::person("A", "Smith", 40, 0);
        let minor = Tree::person("B", "Smith", 5, 1);
        let other = Tree::person("C", "Jones", 40, 2);
        assert!(model.evaluate(&adult, &tree).visible);
        assert!(!model.evaluate(&minor, &tree).visible);
        assert!(!model.evaluate(&other, &tree).visible);
    }

    #[test]
    fn test_highlighting_opts_out_of_hiding() {
        let tree = Tree::default();
        let mut model: FilterModel<Person> = FilterModel::new(false);
        model.add(Arc::new(PredicateFilter::new("adult", |p: &Person| p.age >= 18)));
        let highlight = model.add(Arc::new(smiths().highlighting(true)));

        let jones = Tree::person("C", "Jones", 40, 0);
        let smith = Tree::person("D", "Smith", 40, 1);
        let young_smith = Tree::person("E", "Smith", 3, 2);

        let outcome = model.evaluate(&jones, &tree);
        assert!(outcome.visible);
        assert!(outcome.highlights.is_empty());

        let outcome = model.evaluate(&smith, &tree);
        assert!(outcome.visible);
        assert_eq!(outcome.highlights, vec![highlight]);

        assert!(!model.evaluate(&young_smith, &tree).visible);

        model.set_hide_none_highlighted_rows(true);
        assert!(!model.evaluate(&jones, &tree).visible);
        assert!(model.evaluate(&smith, &tree).visible);
    }

    #[test]
    fn test_whole_group_scope() {
        let tree = Tree::default();
        let parent = Tree::person("P", "Jones", 0, 0);
        let smith_kid = Tree::person("K1", "Smith", 0, 1);
        let jones_kid = Tree::person("K2", "Jones", 0, 2);
        tree.group(&parent, &[smith_kid.clone(), jones_kid.clone()]);

        let mut narrow: FilterModel<Person> = FilterModel::new(false);
        narrow.add(Arc::new(smiths()));
        assert!(!narrow.evaluate(&jones_kid, &tree).visible);
        assert!(!narrow.evaluate(&parent, &tree).visible);

        let mut parents_only: FilterModel<Person> = FilterModel::new(false);
        parents_only.add(Arc::new(smiths().mandatory_parents(true)));
        assert!(parents_only.evaluate(&parent, &tree).visible);
        assert!(!parents_only.evaluate(&jones_kid, &tree).visible);

        let mut wide: FilterModel<Person> = FilterModel::new(false);
        wide.add(Arc::new(smiths().show_whole_group(true)));
        assert!(wide.evaluate(&jones_kid, &tree).visible);
        assert!(wide.evaluate(&parent, &tree).visible);
    }

    #[test]
    fn test_collapsed_parent_hides_descendants() {
        let tree = Tree::default();
        let root = Tree::person("R", "", 0, 0);
        let mid = Tree::person("M", "", 0, 1);
        let leaf = Tree::person("L", "", 0, 2);
        tree.group(&root, std::slice::from_ref(&mid));
        tree.group(&mid, std::slice::from_ref(&leaf));

        let model: FilterModel<Person> = FilterModel::new(false);
        assert!(model.evaluate(&leaf, &tree).visible);

        tree.set_collapsed(&root, true);
        assert!(model.evaluate(&root, &tree).visible);
        assert!(!model.evaluate(&mid, &tree).visible);
        assert!(!model.evaluate(&leaf, &tree).visible);
    }
}
