use crate::{MockConnection, Person, is_catalog, row};
use stow::{Driver, QueryField, Stow, Value, expr};

pub async fn aggregates<D: Driver + Default + 'static>() {
    let stow = Stow::default();
    let mut connection = MockConnection::<D>::new(|command| {
        let nobody = Value::Varchar(Some("Nobody".into()));
        let text = &command.text;
        Ok(if is_catalog(command) {
            Vec::new()
        } else if text.contains("CountValue") {
            vec![row(&["CountValue"], [Value::Int64(Some(3))])]
        } else if text.contains("ExistsValue") && command.parameter("Name") != Some(&nobody) {
            vec![row(&["ExistsValue"], [Value::Int32(Some(1))])]
        } else if text.contains("AverageValue") {
            vec![row(&["AverageValue"], [Value::Float64(Some(47.5))])]
        } else if text.contains("MinValue") {
            vec![row(&["MinValue"], [Value::Int32(Some(21))])]
        } else if text.contains("MaxValue") {
            vec![row(&["MaxValue"], [Value::Int32(Some(85))])]
        } else if text.contains("SumValue") {
            vec![row(&["SumValue"], [Value::Int64(Some(142))])]
        } else {
            Vec::new()
        })
    });
    let log = connection.log().clone();

    // Count
    let count = stow
        .count::<Person, _>(&mut connection, QueryField::new("Age", 21), None)
        .await
        .expect("Failed to count the people");
    assert_eq!(count, 3);
    let command = log.last().expect("Nothing was sent");
    assert!(command.text.contains("WHERE"));
    assert_eq!(command.parameter("Age"), Some(&Value::Int32(Some(21))));
    let count = stow
        .count::<Person, _>(&mut connection, expr!(Person::age > 30), None)
        .await
        .expect("Failed to count the people by expression");
    assert_eq!(count, 3);
    let count = stow
        .count_all::<Person, _>(&mut connection, None)
        .await
        .expect("Failed to count all the people");
    assert_eq!(count, 3);
    assert!(!log.last().expect("Nothing was sent").text.contains("WHERE"));

    // Exists
    let exists = stow
        .exists::<Person, _>(&mut connection, QueryField::new("Name", "Ada"), None)
        .await
        .expect("Failed to check the existence");
    assert!(exists);
    let exists = stow
        .exists::<Person, _>(&mut connection, QueryField::new("Name", "Nobody"), None)
        .await
        .expect("Failed to check the existence");
    assert!(!exists);

    // Average, min, max, sum
    let average = stow
        .average::<Person, _>(&mut connection, "Age", QueryField::new("Name", "Ada"), None)
        .await
        .expect("Failed to compute the average");
    assert_eq!(average, Value::Float64(Some(47.5)));
    let average = stow
        .average_all::<Person, _>(&mut connection, "Age", None)
        .await
        .expect("Failed to compute the average of all the people");
    assert_eq!(average, Value::Float64(Some(47.5)));
    let command = log.last().expect("Nothing was sent");
    assert!(command.text.contains("AVG("));
    assert!(command.parameters.is_empty());
    let min = stow
        .min::<Person, _>(&mut connection, "Age", QueryField::new("Name", "Ada"), None)
        .await
        .expect("Failed to compute the min");
    assert_eq!(min, Value::Int32(Some(21)));
    let min = stow
        .min_all::<Person, _>(&mut connection, "Age", None)
        .await
        .expect("Failed to compute the min of all the people");
    assert_eq!(min, Value::Int32(Some(21)));
    let max = stow
        .max::<Person, _>(&mut connection, "Age", QueryField::new("Name", "Ada"), None)
        .await
        .expect("Failed to compute the max");
    assert_eq!(max, Value::Int32(Some(85)));
    let max = stow
        .max_all::<Person, _>(&mut connection, "Age", None)
        .await
        .expect("Failed to compute the max of all the people");
    assert_eq!(max, Value::Int32(Some(85)));
    let sum = stow
        .sum::<Person, _>(&mut connection, "Age", QueryField::new("Name", "Ada"), None)
        .await
        .expect("Failed to compute the sum");
    assert_eq!(sum, Value::Int64(Some(142)));
    let sum = stow
        .sum_all::<Person, _>(&mut connection, "Age", None)
        .await
        .expect("Failed to compute the sum of all the people");
    assert_eq!(sum, Value::Int64(Some(142)));
}
