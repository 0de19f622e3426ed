use crate::row;
use stow::{Command, Entity, QueryResult, Value};

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[stow(table = "Person")]
pub struct Person {
    #[stow(column = "Id", primary, identity)]
    pub id: i64,
    #[stow(column = "Name")]
    pub name: String,
    #[stow(column = "Age")]
    pub age: i32,
}

impl Person {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            age,
        }
    }

    pub fn row(&self) -> QueryResult {
        row(
            &["Id", "Name", "Age"],
            [
                self.id.into(),
                self.name.clone().into(),
                self.age.into(),
            ],
        )
    }
}

pub fn people() -> Vec<Person> {
    vec![
        Person {
            id: 1,
            name: "Ada".into(),
            age: 36,
        },
        Person {
            id: 2,
            name: "Grace".into(),
            age: 85,
        },
        Person {
            id: 3,
            name: "Linus".into(),
            age: 21,
        },
    ]
}

/// One `Result`, `OrderColumn` row for every bound `Age`, the key is ten times the age.
///
/// Rows come back in reverse order, the caller must route them by `OrderColumn`.
pub fn keys_from_ages(command: &Command) -> Vec<QueryResult> {
    let mut rows: Vec<QueryResult> = command
        .parameters
        .iter()
        .filter(|p| p.name == "Age" || p.name.starts_with("Age_"))
        .map(|p| {
            let index = p
                .name
                .strip_prefix("Age_")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0);
            let age = match p.value {
                Value::Int32(Some(v)) => v as i64,
                _ => 0,
            };
            row(
                &["Result", "OrderColumn"],
                [Value::Int64(Some(age * 10)), Value::Int64(Some(index))],
            )
        })
        .collect();
    rows.reverse();
    rows
}

/// Number of rows bound into the command.
pub fn bound_rows(command: &Command) -> u64 {
    command
        .parameters
        .iter()
        .filter(|p| p.name == "Name" || p.name.starts_with("Name_"))
        .count() as u64
}
