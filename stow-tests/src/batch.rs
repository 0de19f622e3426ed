use crate::{MockConnection, Person, affected, bound_rows, is_catalog, keys_from_ages};
use stow::{Driver, Field, Stow, StowError, Value};

pub async fn batch<D: Driver + Default + 'static>() {
    let stow = Stow::default();
    let multi_statement = D::default().db_setting().is_multi_statement_executable;
    let expected_statements = if multi_statement { 2 } else { 3 };

    // Insert all
    let mut connection = MockConnection::<D>::new(|command| {
        Ok(if is_catalog(command) {
            Vec::new()
        } else {
            keys_from_ages(command)
        })
    });
    let log = connection.log().clone();
    let mut people = vec![
        Person::new("Ada", 30),
        Person::new("Grace", 40),
        Person::new("Linus", 50),
    ];
    let inserted = stow
        .insert_all(&mut connection, &mut people, Some(2))
        .await
        .expect("Failed to insert the people");
    assert_eq!(inserted, 3);
    assert_eq!(
        people.iter().map(|p| p.id).collect::<Vec<_>>(),
        [300, 400, 500],
        "The keys were not routed back to their rows"
    );
    let statements = log.statements();
    assert_eq!(statements.len(), expected_statements);
    if multi_statement {
        let first = &statements[0];
        assert_eq!(
            first.parameter("Name_0"),
            Some(&Value::Varchar(Some("Ada".into())))
        );
        assert_eq!(
            first.parameter("Name_1"),
            Some(&Value::Varchar(Some("Grace".into())))
        );
        assert!(first.parameter("Id_0").is_none());
        assert_eq!(
            statements[1].parameter("Name"),
            Some(&Value::Varchar(Some("Linus".into())))
        );
    }
    let inserted = stow
        .insert_all::<Person, _>(&mut connection, &mut [], None)
        .await
        .expect("Failed to insert nothing");
    assert_eq!(inserted, 0);

    // Update all
    let mut connection = MockConnection::<D>::new(|command| {
        Ok(if is_catalog(command) {
            Vec::new()
        } else {
            vec![affected(bound_rows(command))]
        })
    });
    let log = connection.log().clone();
    let updated = stow
        .update_all(&mut connection, &people, &[], Some(2))
        .await
        .expect("Failed to update the people");
    assert_eq!(updated, 3);
    let statements = log.statements();
    assert_eq!(statements.len(), expected_statements);
    let updated = stow
        .update_all(&mut connection, &people, &[Field::new("Name")], Some(2))
        .await
        .expect("Failed to update the people by name");
    assert_eq!(updated, 3);
    let error = stow
        .update_all(&mut connection, &people, &[Field::new("Missing")], Some(2))
        .await
        .expect_err("An unknown qualifier must be rejected");
    assert!(matches!(
        error.downcast_ref::<StowError>(),
        Some(StowError::InvalidQualifierFields(..))
    ));
}
