//! End-to-end scenarios for the grid model.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{Employee, Roster, RosterLabels, col, employee, roster_grid, surnames};
use horizon_grid::model::{ElementKey, PredicateFilter, RowId, SelectionStyle, ancestors};
use horizon_grid::prelude::*;

fn count<A: Send + 'static>(signal: &Signal<A>) -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let inner = counter.clone();
    signal.connect(move |_| {
        inner.fetch_add(1, Ordering::SeqCst);
    });
    counter
}

/// 24 employees: a Smith family of four, a Lee family of three and 17
/// ungrouped rows (two of them also named Smith).
struct Company {
    roster: Arc<Roster>,
    smiths: Vec<Arc<Employee>>,
    lees: Vec<Arc<Employee>>,
    everyone: Vec<Arc<Employee>>,
}

fn company() -> Company {
    let roster = Arc::new(Roster::default());
    let smiths = vec![
        employee("Smiths", "Smith", 0, 0),
        employee("Ann", "Smith", 41, 1),
        employee("Bob", "Smith", 38, 2),
        employee("Cid", "Smith", 12, 3),
    ];
    let lees = vec![
        employee("Lees", "Lee", 0, 4),
        employee("Dan", "Lee", 52, 5),
        employee("Eve", "Lee", 49, 6),
    ];
    roster.group(&smiths[0], &smiths[1..]);
    roster.group(&lees[0], &lees[1..]);

    let plain = [
        "Young", "Adams", "Smith", "Brown", "Clark", "Davis", "Evans", "Fox", "Green", "Hill",
        "King", "Moore", "Nash", "Smith", "Owen", "Price", "Reed",
    ];
    let mut everyone: Vec<Arc<Employee>> = plain
        .iter()
        .enumerate()
        .map(|(i, surname)| employee(&format!("E{i}"), surname, 20 + i as i64, 7 + i as i64))
        .collect();
    everyone.extend(smiths.iter().cloned());
    everyone.extend(lees.iter().cloned());

    Company {
        roster,
        smiths,
        lees,
        everyone,
    }
}

fn root_surname(grid: &GridModel<Employee>, id: RowId) -> String {
    let element = grid.element(id).expect("row exists");
    ancestors(grid.content(), &**element)
        .last()
        .map_or_else(|| element.surname.clone(), |root| root.surname.clone())
}

fn positions(grid: &GridModel<Employee>, members: &[Arc<Employee>]) -> Vec<usize> {
    members
        .iter()
        .map(|m| {
            let id = grid.row_of(m).expect("member has a row");
            grid.rows().visible_position(id).expect("member is visible")
        })
        .collect()
}

#[test]
fn groups_stay_contiguous_when_sorted_by_surname() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());

    // Children before parents and families interleaved with everyone else.
    let mut shuffled = company.everyone.clone();
    shuffled.reverse();
    let shown = grid.add_elements(shuffled);
    assert_eq!(shown.len(), 24);

    grid.sort(&col("surname"), true, false, true).unwrap();

    let roots: Vec<String> = grid
        .visible_rows()
        .iter()
        .map(|&id| root_surname(&grid, id))
        .collect();
    let mut sorted = roots.clone();
    sorted.sort();
    assert_eq!(roots, sorted);

    for family in [&company.smiths, &company.lees] {
        let at = positions(&grid, family);
        let first = at[0];
        assert_eq!(at, (first..first + family.len()).collect::<Vec<_>>());
    }
    assert!(!grid.rows().is_stale());
}

#[test]
fn surname_filter_hides_and_restores_rows() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());
    grid.add_elements(company.everyone.clone());
    grid.sort(&col("surname"), true, false, false).unwrap();
    let before = grid.visible_rows().to_vec();

    let smith = grid.add_filter(PredicateFilter::new("smith", |e: &Employee| e.surname == "Smith"));
    assert_eq!(surnames(&grid), vec!["Smith"; 6]);
    assert_eq!(grid.hidden_rows().len(), 18);

    assert!(grid.remove_filter(smith));
    assert_eq!(grid.visible_rows(), before.as_slice());
    assert!(grid.hidden_rows().is_empty());
}

#[test]
fn whole_group_filter_keeps_families_together() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());
    grid.add_elements(company.everyone.clone());

    grid.add_filter(PredicateFilter::new("bob", |e: &Employee| e.name == "Bob").show_whole_group(true));
    let visible: Vec<ElementKey> = grid
        .visible_rows()
        .iter()
        .map(|&id| grid.row(id).unwrap().key())
        .collect();
    let smiths: Vec<ElementKey> = company.smiths.iter().map(ElementKey::of).collect();
    assert_eq!(visible, smiths);
}

#[test]
fn parent_selected_only_with_all_children() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());
    grid.add_elements(company.everyone.clone());

    let parent = grid.row_of(&company.smiths[0]).unwrap();
    let kids: Vec<RowId> = company.smiths[1..]
        .iter()
        .map(|k| grid.row_of(k).unwrap())
        .collect();

    grid.toggle_row_selections(&[kids[0]]);
    assert!(!grid.row(parent).unwrap().is_selected());
    grid.toggle_row_selections(&[kids[1]]);
    assert!(!grid.row(parent).unwrap().is_selected());
    grid.toggle_row_selections(&[kids[2]]);
    assert!(grid.row(parent).unwrap().is_selected());

    grid.toggle_row_selections(&[kids[1]]);
    assert!(!grid.row(parent).unwrap().is_selected());
    assert!(grid.row(kids[0]).unwrap().is_selected());
    assert!(!grid.row(kids[1]).unwrap().is_selected());

    // Toggling the parent takes the rows that shared its state along.
    grid.toggle_row_selections(&[parent]);
    assert_eq!(grid.selected_rows(), [parent, kids[0], kids[1], kids[2]]);
}

#[test]
fn viewport_range_and_reveal() {
    let roster = Arc::new(Roster::default());
    let mut grid = GridModel::new(
        roster.clone(),
        Arc::new(RosterLabels { row_height: 100 }),
        GridConfig::new().header_height(0),
    );
    grid.add_columns([Column::new("name", "Name").with_width(200)]).unwrap();
    grid.add_elements((0..50).map(|i| employee(&format!("R{i}"), "", 0, i)));
    grid.set_client_size(Size::new(300, 1000));
    assert_eq!(grid.visible_height(), 5000);

    assert!(grid.set_scroll(Point::new(0, 200)));
    let range = grid.visible_cell_range().rows.unwrap();
    assert_eq!((range.first, range.last), (2, 11));
    assert_eq!(grid.rows_in_view().len(), 10);
    assert_eq!(grid.page_row_count(), 10);

    let row45 = grid.visible_rows()[45];
    assert!(grid.reveal(row45, None));
    assert_eq!(grid.scroll(), Point::new(0, 3600));
    assert_eq!(grid.row_id_at(999), Some(row45));
    assert_eq!(grid.cell_rect(row45, &col("name")), Some(Rect::new(0, 900, 300, 100)));

    // Already visible: no scrolling.
    let row40 = grid.visible_rows()[40];
    assert!(!grid.reveal(row40, None));
}

#[test]
fn suppressed_batch_emits_once() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());
    let changed = count(&grid.signals().model_changed);
    let counts = count(&grid.signals().row_count_changed);
    let added = count(&grid.signals().elements_added);

    {
        let mut outer = grid.suppress_events();
        outer.add_elements(company.everyone[..10].to_vec());
        {
            let mut inner = outer.suppress_events();
            inner.add_elements(company.everyone[10..].to_vec());
            inner.sort(&col("age"), true, false, true).unwrap();
        }
        assert!(!outer.events_enabled());
        assert_eq!(changed.load(Ordering::SeqCst), 0);
    }

    assert_eq!(added.load(Ordering::SeqCst), 2);
    assert_eq!(changed.load(Ordering::SeqCst), 1);
    assert_eq!(counts.load(Ordering::SeqCst), 1);
    assert_eq!(grid.visible_row_count(), 24);
    for (index, &id) in grid.visible_rows().iter().enumerate() {
        assert_eq!(grid.row(id).unwrap().visible_index(), Some(index));
    }
    assert_eq!(grid.enable_events(true), Err(GridError::UnbalancedEventSuppression));
}

#[test]
fn removing_selection_selects_following_group() {
    let roster = Arc::new(Roster::default());
    let first = employee("A", "Adams", 0, 0);
    let family = vec![
        employee("G", "Green", 0, 1),
        employee("g1", "Green", 0, 2),
        employee("g2", "Green", 0, 3),
    ];
    roster.group(&family[0], &family[1..]);
    let mut grid = roster_grid(&roster, GridConfig::default());
    grid.add_elements([first.clone(), employee("B", "Brown", 0, 4)]);
    grid.add_elements(family.clone());

    let a = grid.row_of(&first).unwrap();
    grid.set_selected_rows(&[a]);
    let selections = count(&grid.signals().selection_changed);

    grid.remove_elements(&[first]);
    let expected: Vec<RowId> = family.iter().map(|m| grid.row_of(m).unwrap()).collect();
    assert_eq!(grid.selected_rows(), expected);
    assert_eq!(grid.selection().anchor_row(), Some(expected[0]));
    assert_eq!(selections.load(Ordering::SeqCst), 1);
}

#[test]
fn highlighting_filter_opts_out_of_hiding() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());
    grid.add_elements(company.everyone.clone());

    let seniors = grid.add_filter(
        PredicateFilter::new("seniors", |e: &Employee| e.age >= 40).highlighting(true),
    );
    assert_eq!(grid.visible_row_count(), 24);
    let dan = grid.row_of(&company.lees[1]).unwrap();
    assert_eq!(grid.row(dan).unwrap().highlights(), [seniors]);

    grid.set_hide_none_highlighted_rows(true);
    assert!(grid.visible_rows().iter().all(|&id| grid.row(id).unwrap().is_highlighted()));
    assert!(grid.visible_row_count() < 24);

    grid.set_hide_none_highlighted_rows(false);
    assert_eq!(grid.visible_row_count(), 24);
}

#[test]
fn collapsing_hides_and_deselects_children() {
    let company = company();
    let mut grid = roster_grid(&company.roster, GridConfig::default());
    grid.add_elements(company.everyone.clone());
    let ann = grid.row_of(&company.smiths[1]).unwrap();
    grid.set_selected_rows(&[ann]);

    company.roster.set_collapsed(&company.smiths[0], true);
    assert!(grid.refresh_collapsed(&company.smiths[0]));
    assert_eq!(grid.visible_row_count(), 21);
    assert!(grid.selected_rows().is_empty());
    assert!(!grid.row(ann).unwrap().is_visible());

    company.roster.set_collapsed(&company.smiths[0], false);
    assert!(grid.refresh_collapsed(&company.smiths[0]));
    assert_eq!(grid.visible_row_count(), 24);
}

#[test]
fn single_row_style_from_persisted_config() {
    let config: GridConfig =
        serde_json::from_str(r#"{"selection_style": "SingleRow", "default_row_height": 30}"#).unwrap();
    let company = company();
    let mut grid = roster_grid(&company.roster, config);
    grid.add_elements(company.everyone.clone());
    assert_eq!(grid.visible_height(), 24 * 30);

    let rows = grid.visible_rows()[..3].to_vec();
    grid.set_selected_rows(&rows);
    assert_eq!(grid.selected_rows(), [rows[0]]);

    grid.set_selection_style(SelectionStyle::MultiColumn);
    assert!(grid.selected_rows().is_empty());
    grid.select_all();
    assert_eq!(grid.selection().selected_columns(), grid.columns().visible());
}
