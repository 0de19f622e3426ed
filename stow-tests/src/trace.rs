use crate::{MockConnection, Person, is_catalog, scalar, silent_logs};
use std::sync::{Arc, Mutex};
use stow::{
    CancellableTraceLog, CancellationToken, Command, Driver, QueryResult, Result, ResultTraceLog,
    Stow, StowError, Trace, Value,
};

/// Cancels every operation whose key starts with `delete`.
struct Guard;

impl Trace for Guard {
    fn before_execution(&self, log: &CancellableTraceLog<'_>) {
        if log.log.key.starts_with("delete") {
            log.cancel();
        }
    }
}

#[derive(Default, Clone)]
struct Recorder(Arc<Mutex<Vec<(&'static str, Option<Value>)>>>);

impl Trace for Recorder {
    fn after_execution(&self, log: &ResultTraceLog<'_>) {
        self.0
            .lock()
            .expect("Recorder is poisoned")
            .push((log.log.key, log.result.clone()));
    }
}

pub async fn trace<D: Driver + Default + 'static>() {
    let responder = |command: &Command| -> Result<Vec<QueryResult>> {
        Ok(if is_catalog(command) {
            Vec::new()
        } else {
            vec![scalar(Value::Int64(Some(3)))]
        })
    };

    // Cancelled by the trace
    let stow = Stow::default().with_trace(Guard);
    let mut connection = MockConnection::<D>::new(responder);
    let log = connection.log().clone();
    let error = stow
        .delete_all::<Person, _>(&mut connection)
        .await
        .expect_err("The trace must cancel the delete");
    assert!(matches!(
        error.downcast_ref::<StowError>(),
        Some(StowError::CancelledExecution(key)) if key == "delete_all"
    ));
    assert!(log.statements().is_empty(), "Nothing must reach the database");
    let count = stow
        .count_all::<Person, _>(&mut connection, None)
        .await
        .expect("Only the deletes are cancelled");
    assert_eq!(count, 3);

    // Recorded results
    let recorder = Recorder::default();
    let stow = Stow::default().with_trace(recorder.clone());
    stow.count_all::<Person, _>(&mut connection, None)
        .await
        .expect("Failed to count the people");
    {
        let recorded = recorder.0.lock().expect("Recorder is poisoned");
        assert_eq!(
            recorded.last(),
            Some(&("count_all", Some(Value::Int64(Some(3)))))
        );
    }

    // Cancelled by the token
    let token = CancellationToken::new();
    token.cancel();
    let stow = Stow::default().with_cancellation(token);
    silent_logs! {
        let error = stow
            .count_all::<Person, _>(&mut connection, None)
            .await
            .expect_err("A cancelled token must stop the operation");
        assert!(matches!(
            error.downcast_ref::<StowError>(),
            Some(StowError::OperationCancelled)
        ));
    }
}
