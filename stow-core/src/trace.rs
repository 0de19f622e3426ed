use crate::{Command, Value};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

/// What is about to be sent to the database.
#[derive(Debug)]
pub struct TraceLog<'a> {
    /// Name of the operation, `insert`, `query_all`, ...
    pub key: &'static str,
    pub command: &'a Command,
}

/// Passed to [`Trace::before_execution`], the hook can stop the execution.
#[derive(Debug)]
pub struct CancellableTraceLog<'a> {
    pub log: TraceLog<'a>,
    cancelled: AtomicBool,
}

impl<'a> CancellableTraceLog<'a> {
    pub fn new(key: &'static str, command: &'a Command) -> Self {
        Self {
            log: TraceLog { key, command },
            cancelled: AtomicBool::new(false),
        }
    }

    /// Nothing will be sent, the operation fails with `CancelledExecution`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Outcome of an execution, seen by [`Trace::after_execution`].
#[derive(Debug)]
pub struct ResultTraceLog<'a> {
    pub log: TraceLog<'a>,
    pub elapsed: Duration,
    /// Rows affected, scalar or number of rows read, `None` when the execution failed.
    pub result: Option<Value>,
}

/// Hooks around every database round trip.
pub trait Trace: Send + Sync {
    fn before_execution(&self, _log: &CancellableTraceLog<'_>) {}
    fn after_execution(&self, _log: &ResultTraceLog<'_>) {}
}
