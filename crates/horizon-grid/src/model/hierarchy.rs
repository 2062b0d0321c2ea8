//! Group relations derived from the content provider.
//!
//! Nothing here is stored: an element is a parent when the provider returns
//! a children list for it and a child when the provider returns a parent.
//! Tree walks use explicit stacks and a visited set, so deep or cyclic
//! provider data cannot overflow the call stack.

use std::collections::HashSet;
use std::sync::Arc;

use super::provider::ContentProvider;
use super::row::{ElementKey, RowId, RowTable};

/// Returns `true` if `element` is group-capable (has a children list).
pub fn is_parent_element<T>(content: &dyn ContentProvider<T>, element: &T) -> bool {
    content.children(element).is_some()
}

/// Returns `true` if `element` has a parent.
pub fn is_child_element<T>(content: &dyn ContentProvider<T>, element: &T) -> bool {
    content.parent(element).is_some()
}

/// Returns the ancestors of `element`, nearest first.
pub fn ancestors<T>(content: &dyn ContentProvider<T>, element: &T) -> Vec<Arc<T>> {
    let mut chain: Vec<Arc<T>> = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(ElementKey::from_ref(element));
    let mut next = content.parent(element);
    while let Some(parent) = next {
        if !seen.insert(ElementKey::of(&parent)) {
            break;
        }
        next = content.parent(&parent);
        chain.push(parent);
    }
    chain
}

/// Returns every descendant of `root` in pre-order, excluding `root`.
pub fn descendants<T>(content: &dyn ContentProvider<T>, root: &T) -> Vec<Arc<T>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(ElementKey::from_ref(root));
    let mut stack: Vec<Arc<T>> = content.children(root).unwrap_or_default();
    stack.reverse();
    while let Some(element) = stack.pop() {
        if !seen.insert(ElementKey::of(&element)) {
            continue;
        }
        if let Some(mut children) = content.children(&element) {
            children.reverse();
            stack.extend(children);
        }
        out.push(element);
    }
    out
}

/// Returns the group containing `element`: the group parent followed by its
/// full descendant closure.
///
/// For a parent, the group parent is the element itself. For a child, it is
/// the immediate parent. An ungrouped element is its own one-member group.
pub fn whole_group<T>(content: &dyn ContentProvider<T>, element: &Arc<T>) -> Vec<Arc<T>> {
    let owner = if is_parent_element(content, element) {
        element.clone()
    } else if let Some(parent) = content.parent(element) {
        parent
    } else {
        return vec![element.clone()];
    };
    let mut group = vec![owner.clone()];
    group.extend(descendants(content, &owner));
    group
}

/// Identity of the group `element` belongs to: itself for a parent, its
/// parent for a child, `None` for an ungrouped element.
pub fn group_owner<T>(content: &dyn ContentProvider<T>, element: &T) -> Option<ElementKey> {
    if is_parent_element(content, element) {
        Some(ElementKey::from_ref(element))
    } else {
        content.parent(element).map(|p| ElementKey::of(&p))
    }
}

/// Row-level view of the group relations.
pub struct Hierarchy<'a, T> {
    table: &'a RowTable<T>,
    content: &'a dyn ContentProvider<T>,
}

impl<'a, T> Hierarchy<'a, T> {
    /// Creates a view over `table`.
    pub fn new(table: &'a RowTable<T>, content: &'a dyn ContentProvider<T>) -> Self {
        Self { table, content }
    }

    /// The underlying row table.
    pub fn table(&self) -> &'a RowTable<T> {
        self.table
    }

    /// The content provider.
    pub fn content(&self) -> &'a dyn ContentProvider<T> {
        self.content
    }

    /// Returns `true` if the row's element is a parent.
    pub fn is_parent_row(&self, id: RowId) -> bool {
        self.table
            .element(id)
            .is_some_and(|e| is_parent_element(self.content, e))
    }

    /// Returns `true` if the row's element is a child.
    pub fn is_child_row(&self, id: RowId) -> bool {
        self.table
            .element(id)
            .is_some_and(|e| is_child_element(self.content, e))
    }

    /// Returns `true` if the row belongs to any group.
    pub fn is_group_row(&self, id: RowId) -> bool {
        self.is_parent_row(id) || self.is_child_row(id)
    }

    /// Returns `true` if both rows share the same parent-or-self element.
    pub fn is_same_group(&self, a: RowId, b: RowId) -> bool {
        let (Some(ea), Some(eb)) = (self.table.element(a), self.table.element(b)) else {
            return false;
        };
        match (group_owner(self.content, ea), group_owner(self.content, eb)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Row of the element's parent, if the parent has a row.
    pub fn parent_row(&self, id: RowId) -> Option<RowId> {
        let element = self.table.element(id)?;
        let parent = self.content.parent(element)?;
        self.table.row_of(&parent)
    }

    /// Row of the group parent: the row itself for a parent row, the parent
    /// row for a child row.
    pub fn group_parent_row(&self, id: RowId) -> Option<RowId> {
        if self.is_parent_row(id) {
            Some(id)
        } else {
            self.parent_row(id)
        }
    }

    /// Rows of the immediate children.
    pub fn children(&self, id: RowId) -> Vec<RowId> {
        self.table
            .element(id)
            .and_then(|e| self.content.children(e))
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.table.row_of(child))
            .collect()
    }

    /// Rows of all descendants, in pre-order.
    pub fn all_children(&self, id: RowId) -> Vec<RowId> {
        match self.table.element(id) {
            Some(element) => descendants(self.content, element)
                .iter()
                .filter_map(|d| self.table.row_of(d))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Rows of the whole group containing `id`, group parent first.
    pub fn whole_group(&self, id: RowId) -> Vec<RowId> {
        match self.table.element(id) {
            Some(element) => whole_group(self.content, element)
                .iter()
                .filter_map(|m| self.table.row_of(m))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of ancestors of the row's element.
    pub fn depth(&self, id: RowId) -> usize {
        self.table
            .element(id)
            .map_or(0, |e| ancestors(self.content, e).len())
    }

    /// Rows of the ancestors that have rows, nearest first.
    pub fn ancestor_rows(&self, id: RowId) -> Vec<RowId> {
        match self.table.element(id) {
            Some(element) => ancestors(self.content, element)
                .iter()
                .filter_map(|a| self.table.row_of(a))
                .collect(),
            None => Vec::new(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{Person, Tree};
    use super::*;
    use crate::model::Row;

    #[test]
    fn test_relations() {
        let tree = Tree::default();
        let parent = Tree::person("P", "Smith", 50, 0);
        let a = Tree::person("A", "Smith", 20, 1);
        let b = Tree::person("B", "Smith", 18, 2);
        let loner = Tree::person("L", "Jones", 30, 3);
        tree.group(&parent, &[a.clone(), b.clone()]);

        assert!(is_parent_element(&tree, &*parent));
        assert!(is_child_element(&tree, &*a));
        assert!(!is_parent_element(&tree, &*loner));
        assert_eq!(group_owner(&tree, &*a), Some(ElementKey::of(&parent)));
        assert_eq!(group_owner(&tree, &*parent), Some(ElementKey::of(&parent)));
        assert_eq!(group_owner(&tree, &*loner), None);

        let group = whole_group(&tree, &b);
        assert_eq!(group.len(), 3);
        assert!(Arc::ptr_eq(&group[0], &parent));
        assert_eq!(whole_group(&tree, &loner).len(), 1);
    }

    #[test]
    fn test_nested_descendants_are_preorder() {
        let tree = Tree::default();
        let root = Tree::person("R", "", 0, 0);
        let mid = Tree::person("M", "", 0, 1);
        let leaf = Tree::person("L", "", 0, 2);
        let other = Tree::person("O", "", 0, 3);
        tree.group(&root, &[mid.clone(), other.clone()]);
        tree.group(&mid, &[leaf.clone()]);

        let names: Vec<String> = descendants(&tree, &*root)
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(names, vec!["M", "L", "O"]);

        let chain = ancestors(&tree, &*leaf);
        assert_eq!(chain.len(), 2);
        assert!(Arc::ptr_eq(&chain[1], &root));
    }

    #[test]
    fn test_row_view() {
        let tree = Tree::default();
        let parent = Tree::person("P", "", 0, 0);
        let child = Tree::person("C", "", 0, 1);
        tree.group(&parent, std::slice::from_ref(&child));

        let mut table: RowTable<Person> = RowTable::new();
        let p = table.insert(Row::new(parent.clone())).unwrap();
        let c = table.insert(Row::new(child.clone())).unwrap();

        let view = Hierarchy::new(&table, &tree);
        assert!(view.is_parent_row(p));
        assert!(view.is_child_row(c));
        assert!(view.is_same_group(p, c));
        assert_eq!(view.parent_row(c), Some(p));
        assert_eq!(view.group_parent_row(c), Some(p));
        assert_eq!(view.children(p), vec![c]);
        assert_eq!(view.whole_group(c), vec![p, c]);
        assert_eq!(view.depth(c), 1);
    }
}
