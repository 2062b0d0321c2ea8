//! Configuration for a grid model.

use serde::{Deserialize, Serialize};

use crate::model::{GroupSortPolicy, SelectionStyle};

/// Behavioural and layout options for a [`GridModel`](crate::model::GridModel).
///
/// Serializable so hosts can persist a user's grid preferences alongside
/// their own settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// How rows, columns and cells are selected.
    pub selection_style: SelectionStyle,
    /// Keep a parent row selected exactly when all of its leaf rows are.
    pub group_selection_consistency: bool,
    /// Sort parent rows above their children (`false` puts them below).
    pub parents_above_children: bool,
    /// How group rows are ordered against ungrouped rows.
    pub group_sort_policy: GroupSortPolicy,
    /// Let highlighting filters hide rows they do not match.
    pub hide_none_highlighted_rows: bool,
    /// Row height used when the label provider reports `-1`.
    pub default_row_height: u32,
    /// Height of the column header row.
    pub header_height: u32,
    /// Show the row-number gutter.
    pub show_row_numbers: bool,
    /// Horizontal padding on each side of the row numbers.
    pub row_number_padding: u32,
    /// Show the group-selector gutter.
    pub show_group_selector: bool,
    /// Width of the group-selector gutter.
    pub group_selector_width: u32,
    /// Select the next row when removing rows empties the selection.
    pub select_next_on_remove: bool,
    /// Pixels scrolled per auto-scroll tick while dragging past an edge.
    pub auto_scroll_step: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            selection_style: SelectionStyle::MultiRow,
            group_selection_consistency: true,
            parents_above_children: true,
            group_sort_policy: GroupSortPolicy::Interleaved,
            hide_none_highlighted_rows: false,
            default_row_height: 22,
            header_height: 24,
            show_row_numbers: false,
            row_number_padding: 4,
            show_group_selector: false,
            group_selector_width: 16,
            select_next_on_remove: true,
            auto_scroll_step: 20,
        }
    }
}

impl GridConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection style.
    pub fn selection_style(mut self, style: SelectionStyle) -> Self {
        self.selection_style = style;
        self
    }

    /// Enable or disable group selection consistency.
    pub fn group_selection_consistency(mut self, enabled: bool) -> Self {
        self.group_selection_consistency = enabled;
        self
    }

    /// Choose whether parents sort above their children.
    pub fn parents_above_children(mut self, above: bool) -> Self {
        self.parents_above_children = above;
        self
    }

    /// Set the group/non-group ordering policy.
    pub fn group_sort_policy(mut self, policy: GroupSortPolicy) -> Self {
        self.group_sort_policy = policy;
        self
    }

    /// Let highlighting filters hide non-matching rows.
    pub fn hide_none_highlighted_rows(mut self, hide: bool) -> Self {
        self.hide_none_highlighted_rows = hide;
        self
    }

    /// Set the fallback row height.
    pub fn default_row_height(mut self, height: u32) -> Self {
        self.default_row_height = height;
        self
    }

    /// Set the header row height.
    pub fn header_height(mut self, height: u32) -> Self {
        self.header_height = height;
        self
    }

    /// Show or hide the row-number gutter.
    pub fn show_row_numbers(mut self, show: bool) -> Self {
        self.show_row_numbers = show;
        self
    }

    /// Set the row-number padding.
    pub fn row_number_padding(mut self, padding: u32) -> Self {
        self.row_number_padding = padding;
        self
    }

    /// Show or hide the group-selector gutter.
    pub fn show_group_selector(mut self, show: bool) -> Self {
        self.show_group_selector = show;
        self
    }

    /// Set the group-selector gutter width.
    pub fn group_selector_width(mut self, width: u32) -> Self {
        self.group_selector_width = width;
        self
    }

    /// Enable or disable selecting the next row after a removal.
    pub fn select_next_on_remove(mut self, enabled: bool) -> Self {
        self.select_next_on_remove = enabled;
        self
    }

    /// Set the auto-scroll step.
    pub fn auto_scroll_step(mut self, step: u32) -> Self {
        self.auto_scroll_step = step;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = GridConfig::new()
            .selection_style(SelectionStyle::SingleCell)
            .parents_above_children(false)
            .group_sort_policy(GroupSortPolicy::GroupsBelow)
            .default_row_height(30)
            .show_row_numbers(true);

        assert_eq!(config.selection_style, SelectionStyle::SingleCell);
        assert!(!config.parents_above_children);
        assert_eq!(config.group_sort_policy, GroupSortPolicy::GroupsBelow);
        assert_eq!(config.default_row_height, 30);
        assert!(config.show_row_numbers);
        assert!(config.group_selection_consistency);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = GridConfig::new()
            .selection_style(SelectionStyle::MultiColumn)
            .header_height(40)
            .hide_none_highlighted_rows(true);

        let json = serde_json::to_string(&config).unwrap();
        let back: GridConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let back: GridConfig = serde_json::from_str(r#"{"header_height": 10}"#).unwrap();
        assert_eq!(back.header_height, 10);
        assert_eq!(back.default_row_height, GridConfig::default().default_row_height);
    }
}
