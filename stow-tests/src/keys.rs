use crate::{MockConnection, is_catalog, row};
use stow::{
    Command, Driver, Entity, GlobalConfigurationOptions, KeyColumnReturnBehavior, QueryResult,
    Stow, Value,
};

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[stow(table = "Item")]
pub struct Item {
    #[stow(column = "Code", primary)]
    pub code: String,
    #[stow(column = "Id", identity)]
    pub id: i64,
    #[stow(column = "Name")]
    pub name: String,
}

impl Item {
    fn new(code: &str) -> Self {
        Self {
            code: code.into(),
            id: 0,
            name: format!("Item {code}"),
        }
    }
}

/// The identity the database generates for `code`, ten times its trailing digit.
fn generated_id(code: &str) -> i64 {
    code.chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map_or(0, |d| d as i64 * 10)
}

/// One `Result`, `OrderColumn` row for every bound `Code`, holding the key selected by the statement.
fn returned_keys(command: &Command, primary_first: bool) -> Vec<QueryResult> {
    command
        .parameters
        .iter()
        .filter(|p| p.name == "Code" || p.name.starts_with("Code_"))
        .map(|p| {
            let index = p
                .name
                .strip_prefix("Code_")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0);
            let code = match &p.value {
                Value::Varchar(Some(v)) => v.clone(),
                _ => String::new(),
            };
            let key = if primary_first {
                Value::Varchar(Some(code))
            } else {
                Value::Int64(Some(generated_id(&code)))
            };
            row(&["Result", "OrderColumn"], [key, Value::Int64(Some(index))])
        })
        .collect()
}

/// Inserts into a table whose primary is not its identity, under every key column return behavior.
pub async fn keys<D: Driver + Default + 'static>() {
    for behavior in [
        KeyColumnReturnBehavior::Primary,
        KeyColumnReturnBehavior::Identity,
        KeyColumnReturnBehavior::PrimaryOrElseIdentity,
        KeyColumnReturnBehavior::IdentityOrElsePrimary,
    ] {
        let primary_first = matches!(
            behavior,
            KeyColumnReturnBehavior::Primary | KeyColumnReturnBehavior::PrimaryOrElseIdentity
        );
        let stow = Stow::new(GlobalConfigurationOptions {
            key_column_return_behavior: behavior,
            ..Default::default()
        });
        let mut connection = MockConnection::<D>::new(move |command| {
            Ok(if is_catalog(command) {
                Vec::new()
            } else {
                returned_keys(command, primary_first)
            })
        });

        let mut item = Item::new("K4");
        let key = stow
            .insert(&mut connection, &mut item)
            .await
            .unwrap_or_else(|e| panic!("Failed to insert an item under {behavior:?}: {e:#}"));
        if primary_first {
            assert_eq!(key, Value::Varchar(Some("K4".into())), "{behavior:?}");
            assert_eq!(item.id, 0, "The primary was written into the identity under {behavior:?}");
        } else {
            assert_eq!(key, Value::Int64(Some(40)), "{behavior:?}");
            assert_eq!(item.id, 40, "The identity was not written back under {behavior:?}");
        }
        assert_eq!(item.code, "K4");

        let mut items = vec![Item::new("K1"), Item::new("K2"), Item::new("K3")];
        let inserted = stow
            .insert_all(&mut connection, &mut items, Some(2))
            .await
            .unwrap_or_else(|e| panic!("Failed to insert the items under {behavior:?}: {e:#}"));
        assert_eq!(inserted, 3);
        assert_eq!(
            items.iter().map(|i| i.code.as_str()).collect::<Vec<_>>(),
            ["K1", "K2", "K3"]
        );
        let expected: [i64; 3] = if primary_first { [0, 0, 0] } else { [10, 20, 30] };
        assert_eq!(
            items.iter().map(|i| i.id).collect::<Vec<_>>(),
            expected,
            "Wrong keys routed back under {behavior:?}"
        );
    }
}
