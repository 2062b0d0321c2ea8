//! Human-readable dumps of the grid rows.

use std::fmt::{self, Write};

use horizon_grid_core::TreeStyle;

use super::grid::GridModel;
use super::row::RowId;

/// Configuration for grid debug output.
#[derive(Debug, Clone)]
pub struct GridDebugOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to list the hidden partition after the visible rows.
    pub show_hidden: bool,
    /// Whether to append row flags (selected, pinned, highlighted).
    pub show_flags: bool,
    /// Maximum group depth to print (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for GridDebugOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_hidden: true,
            show_flags: true,
            max_depth: None,
        }
    }
}

/// Debug utility that prints the visible rows as a group tree.
///
/// ```text
/// Grid (4 visible, 1 hidden, 3 columns):
/// Smith [selected]
/// ├── Ann Smith [selected]
/// └── Bob Smith [selected]
/// Jones
/// hidden:
///   Eve Brown
/// ```
pub struct GridDebug<'a, T> {
    model: &'a GridModel<T>,
    options: GridDebugOptions,
}

impl<'a, T: Send + Sync + 'static> GridDebug<'a, T> {
    /// Creates a dump with default options.
    pub fn new(model: &'a GridModel<T>) -> Self {
        Self {
            model,
            options: GridDebugOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: GridDebugOptions) -> Self {
        self.options = options;
        self
    }

    /// Formats the dump into a string.
    pub fn format(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_into(&mut output);
        output
    }

    fn write_into(&self, output: &mut String) -> fmt::Result {
        let model = self.model;
        let visible = model.visible_rows();
        let hidden = model.hidden_rows();
        writeln!(
            output,
            "Grid ({} visible, {} hidden, {} columns):",
            visible.len(),
            hidden.len(),
            model.columns().all().len()
        )?;
        if visible.is_empty() && hidden.is_empty() {
            writeln!(output, "  (empty)")?;
            return Ok(());
        }

        let view = model.hierarchy();
        let depths: Vec<usize> = visible.iter().map(|&id| view.depth(id)).collect();
        for (index, &id) in visible.iter().enumerate() {
            let depth = depths[index];
            if self.options.max_depth.is_some_and(|max| depth > max) {
                continue;
            }
            let is_last = depths[index + 1..]
                .iter()
                .find(|&&d| d <= depth)
                .is_none_or(|&d| d < depth);
            output.push_str(&self.build_prefix(depth, is_last));
            self.write_row(id, output)?;
        }

        if self.options.show_hidden && !hidden.is_empty() {
            writeln!(output, "hidden:")?;
            for &id in hidden {
                output.push_str("  ");
                self.write_row(id, output)?;
            }
        }
        Ok(())
    }

    fn write_row(&self, id: RowId, output: &mut String) -> fmt::Result {
        let Some(row) = self.model.row(id) else {
            return writeln!(output, "(removed)");
        };
        output.push_str(&self.model.content().element_id(row.element()));
        if self.options.show_flags {
            let flags: Vec<&str> = [
                (row.is_selected(), "selected"),
                (row.is_pinned(), "pinned"),
                (row.is_highlighted(), "highlighted"),
            ]
            .into_iter()
            .filter_map(|(set, name)| set.then_some(name))
            .collect();
            if !flags.is_empty() {
                write!(output, " [{}]", flags.join(", "))?;
            }
        }
        output.push('\n');
        Ok(())
    }

    /// Build the prefix string for a row at `depth`.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }
        let (branch, last, vertical, _) = self.options.style.prefixes();
        if self.options.style == TreeStyle::Compact {
            return "  ".repeat(depth);
        }

        let mut prefix = vertical.repeat(depth - 1);
        prefix.push_str(if is_last { last } else { branch });
        prefix
    }
}

impl<T: Send + Sync + 'static> fmt::Display for GridDebug<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl<T> fmt::Debug for GridDebug<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDebug")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::GridConfig;
    use crate::model::hierarchy::test_support::{Labels, Tree};
    use crate::model::Column;

    #[test]
    fn test_tree_dump() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("Smith", "", 0, 0);
        let kids = vec![Tree::person("Ann", "Smith", 0, 1), Tree::person("Bob", "Smith", 0, 2)];
        tree.group(&parent, &kids);

        let mut grid = GridModel::new(tree.clone(), Arc::new(Labels), GridConfig::default());
        grid.add_columns([Column::new("name", "Name")]).unwrap();
        grid.add_elements([parent.clone()]);
        grid.add_elements(kids.clone());
        grid.add_elements([Tree::person("Jones", "", 0, 3)]);
        let bob = grid.row_of(&kids[1]).unwrap();
        grid.set_selected_rows(&[bob]);

        let dump = grid.debug().to_string();
        let expected = "Grid (4 visible, 0 hidden, 1 columns):\n\
                        Smith \n\
                        ├── Ann Smith\n\
                        └── Bob Smith [selected]\n\
                        Jones \n";
        assert_eq!(dump, expected);

        let ascii = grid
            .debug()
            .with_options(GridDebugOptions {
                style: TreeStyle::Ascii,
                show_flags: false,
                ..Default::default()
            })
            .format();
        assert!(ascii.contains("`-- Bob Smith\n"));
    }
}
