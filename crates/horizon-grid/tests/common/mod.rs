//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use horizon_grid::model::{CellValue, Column, ColumnId, ContentProvider, ElementKey, LabelProvider};
use horizon_grid::{GridConfig, GridModel};
use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;

/// An employee record.
#[derive(Debug)]
pub struct Employee {
    pub name: String,
    pub surname: String,
    pub age: i64,
    pub index: i64,
}

pub fn employee(name: &str, surname: &str, age: i64, index: i64) -> Arc<Employee> {
    Arc::new(Employee {
        name: name.to_string(),
        surname: surname.to_string(),
        age,
        index,
    })
}

/// In-memory content provider with parent/child links kept by identity.
#[derive(Default)]
pub struct Roster {
    parents: RwLock<HashMap<ElementKey, Arc<Employee>>>,
    children: RwLock<HashMap<ElementKey, Vec<Arc<Employee>>>>,
    collapsed: RwLock<HashMap<ElementKey, bool>>,
    ages: RwLock<HashMap<ElementKey, i64>>,
}

impl Roster {
    pub fn group(&self, parent: &Arc<Employee>, children: &[Arc<Employee>]) {
        self.children
            .write()
            .insert(ElementKey::of(parent), children.to_vec());
        let mut parents = self.parents.write();
        for child in children {
            parents.insert(ElementKey::of(child), parent.clone());
        }
    }

    /// Overrides an employee's age, as a host edit would before calling
    /// `update_elements`.
    pub fn set_age(&self, person: &Arc<Employee>, age: i64) {
        self.ages.write().insert(ElementKey::of(person), age);
    }

    pub fn age(&self, person: &Employee) -> i64 {
        self.ages
            .read()
            .get(&ElementKey::from_ref(person))
            .copied()
            .unwrap_or(person.age)
    }

    pub fn set_collapsed(&self, parent: &Arc<Employee>, collapsed: bool) {
        self.collapsed
            .write()
            .insert(ElementKey::of(parent), collapsed);
    }
}

impl ContentProvider<Employee> for Roster {
    fn parent(&self, element: &Employee) -> Option<Arc<Employee>> {
        self.parents
            .read()
            .get(&ElementKey::from_ref(element))
            .cloned()
    }

    fn children(&self, element: &Employee) -> Option<Vec<Arc<Employee>>> {
        self.children
            .read()
            .get(&ElementKey::from_ref(element))
            .cloned()
    }

    fn is_collapsed(&self, element: &Employee) -> bool {
        self.collapsed
            .read()
            .get(&ElementKey::from_ref(element))
            .copied()
            .unwrap_or(false)
    }

    fn value(&self, column: &Column, element: &Employee) -> CellValue {
        match column.id().as_str() {
            "name" => CellValue::from(element.name.as_str()),
            "surname" => CellValue::from(element.surname.as_str()),
            "age" => CellValue::Int(self.age(element)),
            _ => CellValue::None,
        }
    }

    fn element_id(&self, element: &Employee) -> String {
        format!("{} {}", element.name, element.surname)
    }

    fn natural_index(&self, element: &Employee) -> i64 {
        element.index
    }
}

/// Label provider with uniform row heights.
pub struct RosterLabels {
    pub row_height: i32,
}

impl LabelProvider<Employee> for RosterLabels {
    fn text(&self, column: &Column, element: &Employee) -> String {
        match column.id().as_str() {
            "name" => element.name.clone(),
            "surname" => element.surname.clone(),
            "age" => element.age.to_string(),
            _ => String::new(),
        }
    }

    fn default_row_height(&self, _element: &Employee) -> i32 {
        self.row_height
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A grid with name, surname and age columns.
pub fn roster_grid(roster: &Arc<Roster>, config: GridConfig) -> GridModel<Employee> {
    init_tracing();
    let mut grid = GridModel::new(roster.clone(), Arc::new(RosterLabels { row_height: -1 }), config);
    grid.add_columns([
        Column::new("name", "Name"),
        Column::new("surname", "Surname"),
        Column::new("age", "Age"),
    ])
    .expect("fresh column ids");
    grid
}

pub fn col(id: &str) -> ColumnId {
    ColumnId::from(id)
}

pub fn surnames(grid: &GridModel<Employee>) -> Vec<String> {
    grid.visible_rows()
        .iter()
        .filter_map(|&id| grid.element(id))
        .map(|e| e.surname.clone())
        .collect()
}
