use crate::{MockConnection, Person, is_catalog, keys_from_ages};
use stow::{Driver, Field, Stow, StowError, Value};

pub async fn merge<D: Driver + Default + 'static>() {
    let stow = Stow::default();
    let mut connection = MockConnection::<D>::new(|command| {
        Ok(if is_catalog(command) {
            Vec::new()
        } else {
            keys_from_ages(command)
        })
    });
    let log = connection.log().clone();

    // Merge by primary
    let mut person = Person::new("Ada", 36);
    let key = stow
        .merge(&mut connection, &mut person, &[])
        .await
        .expect("Failed to merge a person");
    assert_eq!(key, Value::Int64(Some(360)));
    assert_eq!(person.id, 360);
    let command = log.last().expect("Nothing was sent");
    assert_eq!(command.parameter("Id"), Some(&Value::Int64(Some(0))));
    assert_eq!(
        command.parameter("Name"),
        Some(&Value::Varchar(Some("Ada".into())))
    );

    // Merge by name
    let mut person = Person::new("Grace", 85);
    stow.merge(&mut connection, &mut person, &[Field::new("Name")])
        .await
        .expect("Failed to merge a person by name");
    assert_eq!(person.id, 850);

    let error = stow
        .merge(&mut connection, &mut person, &[Field::new("Missing")])
        .await
        .expect_err("An unknown qualifier must be rejected");
    assert!(matches!(
        error.downcast_ref::<StowError>(),
        Some(StowError::InvalidQualifierFields(..))
    ));

    // Merge all
    let mut people = vec![
        Person::new("Ada", 1),
        Person::new("Grace", 2),
        Person::new("Linus", 3),
    ];
    let merged = stow
        .merge_all(&mut connection, &mut people, &[], Some(3))
        .await
        .expect("Failed to merge the people");
    assert_eq!(merged, 3);
    assert_eq!(
        people.iter().map(|p| p.id).collect::<Vec<_>>(),
        [10, 20, 30],
        "The keys were not routed back to their rows"
    );
}
