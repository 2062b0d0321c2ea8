//! Property tests for the structural guarantees of the grid model.

mod common;

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use common::{Employee, Roster, col, employee, roster_grid};
use horizon_grid::model::PredicateFilter;
use horizon_grid::{GridConfig, GridModel};
use proptest::prelude::*;

const FAMILIES: usize = 3;

/// Builds a roster from `(age, family)` pairs. Family 0 means ungrouped;
/// family `n` makes the employee a child of parent `n`.
fn populate(people: &[(i64, usize)]) -> (Arc<Roster>, Vec<Arc<Employee>>) {
    let roster = Arc::new(Roster::default());
    let parents: Vec<Arc<Employee>> = (0..FAMILIES)
        .map(|f| employee(&format!("P{f}"), "Parent", 30 * (f as i64 + 1), f as i64))
        .collect();
    let mut children = vec![Vec::new(); FAMILIES];
    let mut everyone = Vec::new();
    for (i, &(age, family)) in people.iter().enumerate() {
        let person = employee(&format!("E{i}"), "Staff", age, (FAMILIES + i) as i64);
        if family > 0 {
            children[family - 1].push(person.clone());
        }
        everyone.push(person);
    }
    for (parent, kids) in parents.iter().zip(&children) {
        if !kids.is_empty() {
            roster.group(parent, kids);
            everyone.push(parent.clone());
        }
    }
    (roster, everyone)
}

fn check_structure(grid: &GridModel<Employee>, total: usize) -> Result<(), TestCaseError> {
    let visible = grid.visible_rows();
    let hidden = grid.hidden_rows();
    prop_assert_eq!(visible.len() + hidden.len(), total);
    prop_assert_eq!(grid.row_count(), total);
    prop_assert_eq!(grid.rows().identity_len(), total);

    let unique: HashSet<_> = visible.iter().chain(hidden).collect();
    prop_assert_eq!(unique.len(), total);

    for (index, &id) in visible.iter().enumerate() {
        let row = grid.row(id).unwrap();
        prop_assert!(row.is_visible());
        prop_assert_eq!(row.visible_index(), Some(index));
        prop_assert_eq!(row.hidden_index(), None);
    }
    for (index, &id) in hidden.iter().enumerate() {
        let row = grid.row(id).unwrap();
        prop_assert!(!row.is_visible());
        prop_assert_eq!(row.hidden_index(), Some(index));
    }

    let comparator = grid.row_comparator();
    for pair in visible.windows(2) {
        let a = grid.element(pair[0]).unwrap();
        let b = grid.element(pair[1]).unwrap();
        prop_assert_ne!(comparator.compare(a, b), Ordering::Greater);
    }
    Ok(())
}

/// A visible parent is selected exactly when all its visible leaves are, and
/// row flags agree with the selection model.
fn check_group_selection(grid: &GridModel<Employee>) -> Result<(), TestCaseError> {
    let view = grid.hierarchy();
    for &id in grid.visible_rows() {
        if !view.is_parent_row(id) {
            continue;
        }
        let leaves: Vec<_> = view
            .all_children(id)
            .into_iter()
            .filter(|&c| grid.row(c).is_some_and(|r| r.is_visible()) && !view.is_parent_row(c))
            .collect();
        if leaves.is_empty() {
            continue;
        }
        let all = leaves.iter().all(|&c| grid.row(c).unwrap().is_selected());
        prop_assert_eq!(grid.row(id).unwrap().is_selected(), all);
    }
    for &id in grid.visible_rows() {
        prop_assert_eq!(
            grid.row(id).unwrap().is_selected(),
            grid.selection().is_row_selected(id)
        );
    }
    Ok(())
}

fn people() -> impl Strategy<Value = Vec<(i64, usize)>> {
    prop::collection::vec((0i64..100, 0..=FAMILIES), 0..40)
}

#[derive(Debug, Clone)]
enum Step {
    Add,
    SetAge(usize, i64),
    Toggle(Vec<usize>),
}

fn steps() -> impl Strategy<Value = Vec<Step>> {
    let step = prop_oneof![
        Just(Step::Add),
        (0usize..64, 0i64..100).prop_map(|(pick, age)| Step::SetAge(pick, age)),
        prop::collection::vec(0usize..64, 1..3).prop_map(Step::Toggle),
    ];
    prop::collection::vec(step, 1..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn partitions_and_order_hold(
        people in people(),
        column in prop::sample::select(vec!["name", "surname", "age"]),
        clicks in 1usize..3,
        threshold in 0i64..100,
    ) {
        let (roster, everyone) = populate(&people);
        let mut grid = roster_grid(&roster, GridConfig::default());
        let total = everyone.len();

        grid.add_elements(everyone.iter().take(total / 2).cloned());
        for _ in 0..clicks {
            grid.sort(&col(column), true, false, false).unwrap();
        }
        grid.add_elements(everyone.iter().skip(total / 2).cloned());
        check_structure(&grid, total)?;

        grid.add_filter(PredicateFilter::new("threshold", move |e: &Employee| e.age >= threshold));
        check_structure(&grid, total)?;

        // Re-sorting from scratch yields the order kept by incremental inserts.
        let incremental = grid.visible_rows().to_vec();
        grid.sort(&col(column), false, false, false).unwrap();
        prop_assert_eq!(grid.visible_rows(), incremental.as_slice());
    }

    #[test]
    fn insertion_index_matches_linear_scan(
        people in people(),
        threshold in 0i64..100,
    ) {
        let (roster, everyone) = populate(&people);
        let mut grid = roster_grid(&roster, GridConfig::default());
        grid.sort(&col("age"), true, false, false).unwrap();
        grid.add_elements(everyone);
        grid.add_filter(PredicateFilter::new("threshold", move |e: &Employee| e.age >= threshold));

        let comparator = grid.row_comparator();
        for &id in grid.hidden_rows() {
            let element = grid.element(id).unwrap();
            let linear = grid
                .visible_rows()
                .iter()
                .take_while(|&&v| comparator.compare(grid.element(v).unwrap(), element) != Ordering::Greater)
                .count();
            prop_assert_eq!(grid.sorted_row_index(id), Some(linear));
        }
    }

    #[test]
    fn group_selection_stays_consistent(
        people in people(),
        toggles in prop::collection::vec(prop::collection::vec(0usize..64, 1..4), 1..8),
        removals in prop::collection::vec(0usize..64, 0..5),
    ) {
        let (roster, everyone) = populate(&people);
        let mut grid = roster_grid(&roster, GridConfig::default());
        grid.add_elements(everyone.clone());

        for picks in toggles {
            let visible = grid.visible_rows().to_vec();
            if visible.is_empty() {
                break;
            }
            let rows: Vec<_> = picks.iter().map(|&p| visible[p % visible.len()]).collect();
            grid.toggle_row_selections(&rows);
        }
        let doomed: Vec<Arc<Employee>> = removals
            .iter()
            .filter(|_| !everyone.is_empty())
            .map(|&r| everyone[r % everyone.len()].clone())
            .collect();
        grid.remove_elements(&doomed);

        check_group_selection(&grid)?;
    }

    #[test]
    fn updates_and_late_adds_keep_structure(
        people in people(),
        initial in 0usize..8,
        threshold in 0i64..100,
        steps in steps(),
    ) {
        let (roster, everyone) = populate(&people);
        // Parents first, so later children join groups already in the grid.
        let (parents, staff): (Vec<_>, Vec<_>) =
            everyone.into_iter().partition(|e| e.surname == "Parent");
        let mut queue: VecDeque<Arc<Employee>> = parents.into_iter().chain(staff).collect();

        let mut grid = roster_grid(&roster, GridConfig::default());
        grid.sort(&col("age"), true, false, false).unwrap();
        let ages = roster.clone();
        grid.add_filter(PredicateFilter::new("threshold", move |e: &Employee| ages.age(e) >= threshold));

        let mut added: Vec<Arc<Employee>> = queue.drain(..initial.min(queue.len())).collect();
        grid.add_elements(added.iter().cloned());
        check_structure(&grid, added.len())?;

        for step in steps {
            match step {
                Step::Add => {
                    if let Some(next) = queue.pop_front() {
                        grid.add_elements([next.clone()]);
                        added.push(next);
                    }
                }
                Step::SetAge(pick, age) => {
                    if !added.is_empty() {
                        let person = added[pick % added.len()].clone();
                        roster.set_age(&person, age);
                        grid.update_elements(&[person]);
                    }
                }
                Step::Toggle(picks) => {
                    let visible = grid.visible_rows().to_vec();
                    if !visible.is_empty() {
                        let rows: Vec<_> = picks.iter().map(|&p| visible[p % visible.len()]).collect();
                        grid.toggle_row_selections(&rows);
                    }
                }
            }
            check_structure(&grid, added.len())?;
            check_group_selection(&grid)?;
        }

        // Re-sorting from scratch agrees with the incrementally kept order.
        let incremental = grid.visible_rows().to_vec();
        grid.sort(&col("age"), false, false, false).unwrap();
        prop_assert_eq!(grid.visible_rows(), incremental.as_slice());
    }
}
