use crate::{MockConnection, Person, affected, is_catalog, people, scalar, silent_logs};
use stow::{
    Driver, OrderField, QueryField, Stow, StowError, Value, Where, expr,
};

pub async fn crud<D: Driver + Default + 'static>() {
    let stow = Stow::default();
    let mut connection = MockConnection::<D>::new(|command| {
        let text = command.text.trim_start().to_ascii_uppercase();
        Ok(if is_catalog(command) {
            Vec::new()
        } else if text.starts_with("INSERT") {
            vec![scalar(7_i64)]
        } else if text.starts_with("SELECT") {
            people().iter().map(Person::row).collect()
        } else if text.starts_with("UPDATE") || text.starts_with("DELETE") {
            vec![affected(1)]
        } else {
            Vec::new()
        })
    });
    let log = connection.log().clone();

    // Insert
    let mut person = Person::new("Ada", 36);
    let key = stow
        .insert(&mut connection, &mut person)
        .await
        .expect("Failed to insert a person");
    assert_eq!(key, Value::Int64(Some(7)));
    assert_eq!(person.id, 7, "The generated key was not written back");
    let insert = log.last().expect("Nothing was sent");
    assert_eq!(
        insert.parameter("Name"),
        Some(&Value::Varchar(Some("Ada".into())))
    );
    assert_eq!(insert.parameter("Age"), Some(&Value::Int32(Some(36))));
    assert!(
        insert.parameter("Id").is_none(),
        "The identity must not be bound by an insert"
    );

    // Query
    let min = 18;
    let found = stow
        .query::<Person, _>(
            &mut connection,
            expr!(Person::age >= min && Person::name.starts_with("A")),
            &[OrderField::ascending("Name")],
            Some(10),
            None,
        )
        .await
        .expect("Failed to query the people");
    assert_eq!(found, people());
    let query = log.last().expect("Nothing was sent");
    assert_eq!(query.parameter("Age"), Some(&Value::Int32(Some(18))));
    assert_eq!(
        query.parameter("Name"),
        Some(&Value::Varchar(Some("A%".into())))
    );

    let all = stow
        .query_all::<Person, _>(&mut connection, &[], None)
        .await
        .expect("Failed to query all the people");
    assert_eq!(all.len(), 3);

    let page = stow
        .batch_query::<Person, _>(
            &mut connection,
            QueryField::new("Age", 21),
            1,
            2,
            &[OrderField::descending("Age")],
            None,
        )
        .await
        .expect("Failed to query a page of people");
    assert_eq!(page.len(), 3);
    let error = stow
        .batch_query::<Person, _>(&mut connection, Where::None, 0, 2, &[], None)
        .await
        .expect_err("A batch query without order must fail");
    assert!(matches!(
        error.downcast_ref::<StowError>(),
        Some(StowError::InvalidOrderFields(..))
    ));

    // Update
    let updated = stow
        .update(&mut connection, &person)
        .await
        .expect("Failed to update the person");
    assert_eq!(updated, 1);
    let update = log.last().expect("Nothing was sent");
    assert_eq!(update.parameter("Id"), Some(&Value::Int64(Some(7))));
    assert_eq!(
        update.parameter("Name"),
        Some(&Value::Varchar(Some("Ada".into())))
    );

    let updated = stow
        .update_where(&mut connection, &person, QueryField::new("Name", "Grace"))
        .await
        .expect("Failed to update the person by name");
    assert_eq!(updated, 1);
    let update = log.last().expect("Nothing was sent");
    assert_eq!(
        update.parameter("_Name"),
        Some(&Value::Varchar(Some("Grace".into())))
    );
    assert_eq!(
        update.parameter("Name"),
        Some(&Value::Varchar(Some("Ada".into())))
    );

    // Delete
    let deleted = stow
        .delete::<Person, _>(&mut connection, Where::key(7_i64))
        .await
        .expect("Failed to delete by key");
    assert_eq!(deleted, 1);
    assert_eq!(
        log.last().expect("Nothing was sent").parameter("Id"),
        Some(&Value::Int64(Some(7)))
    );
    let deleted = stow
        .delete_entity(&mut connection, &person)
        .await
        .expect("Failed to delete the person");
    assert_eq!(deleted, 1);
    let deleted = stow
        .delete_all::<Person, _>(&mut connection)
        .await
        .expect("Failed to delete all the people");
    assert_eq!(deleted, 1);
    stow.truncate::<Person, _>(&mut connection)
        .await
        .expect("Failed to truncate the people");

    // Raw commands
    let raw = stow
        .execute_query::<Person, _>(&mut connection, "SELECT * FROM Person")
        .await
        .expect("Failed to run a raw query");
    assert_eq!(raw, people());
    let value = stow
        .execute_scalar(&mut connection, "INSERT INTO Person DEFAULT VALUES")
        .await
        .expect("Failed to run a raw scalar");
    assert_eq!(value, Value::Int64(Some(7)));
    let rows = stow
        .execute_non_query(&mut connection, "UPDATE Person SET Age = Age + 1")
        .await
        .expect("Failed to run a raw statement");
    assert_eq!(rows, 1);
    let mut script = MockConnection::<D>::new(|_| Ok(vec![affected(2), affected(3)]));
    let rows = stow
        .execute_non_query(&mut script, "DELETE FROM Person ; DELETE FROM Person ;")
        .await
        .expect("Failed to run a raw script");
    assert_eq!(rows, 5, "The affected rows of every statement add up");

    // Failing driver
    let mut failing = MockConnection::<D>::new(|command| {
        if is_catalog(command) {
            Ok(Vec::new())
        } else {
            Err(stow::Error::msg("connection reset"))
        }
    });
    silent_logs! {
        let error = stow
            .count_all::<Person, _>(&mut failing, None)
            .await
            .expect_err("The driver error must surface");
        assert!(error.downcast_ref::<StowError>().is_none());
        assert_eq!(error.to_string(), "connection reset");
    }
}
