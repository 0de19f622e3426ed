use crate::{MockConnection, Person, affected, is_catalog, register, scalar, silent_logs};
use stow::{
    Command, Connection, ConnectionPersistency, DbRepository, Driver, QueryResult, Result,
    Transaction, Value,
};

fn responder(command: &Command) -> Result<Vec<QueryResult>> {
    let text = command.text.trim_start().to_ascii_uppercase();
    Ok(if is_catalog(command) {
        Vec::new()
    } else if text.starts_with("INSERT") {
        vec![scalar(Value::Int64(Some(11)))]
    } else if text.starts_with("SELECT") {
        vec![scalar(Value::Int64(Some(1)))]
    } else {
        vec![affected(1)]
    })
}

pub async fn repository<D: Driver + Default + 'static>() {
    // Per call
    let url = format!("mock://{}/per-call", D::NAME);
    let endpoint = register(&url, responder);
    let repository = DbRepository::<MockConnection<D>>::new(&url, ConnectionPersistency::PerCall);
    assert_eq!(repository.url(), url);
    repository
        .count_all::<Person>(None)
        .await
        .expect("Failed to count through the repository");
    repository
        .delete_all::<Person>()
        .await
        .expect("Failed to delete through the repository");
    assert_eq!(endpoint.opened(), 2, "Every call must open its own connection");

    // Instance
    let url = format!("mock://{}/instance", D::NAME);
    let endpoint = register(&url, responder);
    let repository = DbRepository::<MockConnection<D>>::new(&url, ConnectionPersistency::Instance);
    for _ in 0..3 {
        repository
            .count_all::<Person>(None)
            .await
            .expect("Failed to count through the repository");
    }
    assert_eq!(endpoint.opened(), 1, "The connection must be reused");
    repository.dispose().await;
    let mut person = Person::new("Ada", 36);
    repository
        .insert(&mut person)
        .await
        .expect("Failed to insert through the repository");
    assert_eq!(person.id, 11);
    assert_eq!(endpoint.opened(), 2, "Dispose must close the connection");

    // Transaction
    endpoint.log.clear();
    {
        let mut connection = repository
            .connection()
            .await
            .expect("Failed to take the connection");
        let mut transaction = connection
            .begin()
            .await
            .expect("Failed to begin a transaction");
        let mut person = Person::new("Grace", 85);
        repository
            .stow()
            .insert(&mut transaction, &mut person)
            .await
            .expect("Failed to insert inside the transaction");
        transaction
            .commit()
            .await
            .expect("Failed to commit the transaction");
    }
    let statements: Vec<String> = endpoint
        .log
        .statements()
        .into_iter()
        .map(|c| c.text.trim_start().split_whitespace().next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(statements, ["BEGIN", "INSERT", "COMMIT"]);

    // Unknown url
    let repository = DbRepository::<MockConnection<D>>::new(
        format!("mock://{}/nowhere", D::NAME),
        ConnectionPersistency::PerCall,
    );
    silent_logs! {
        assert!(repository.count_all::<Person>(None).await.is_err());
    }
}
