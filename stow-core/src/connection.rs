use crate::{Executor, Result};
use std::future::Future;

pub trait Connection: Executor {
    type Transaction<'c>: Transaction<'c, Driver = Self::Driver>
    where
        Self: 'c;

    /// Open a connection to the given URL.
    fn connect(url: &str) -> impl Future<Output = Result<Self>> + Send;

    /// Start a transaction bound to this connection.
    ///
    /// The transaction borrows the connection mutably, so no other executor
    /// can use the connection until the transaction is committed or rolled back.
    fn begin(&mut self) -> impl Future<Output = Result<Self::Transaction<'_>>> + Send;
}

pub trait Transaction<'c>: Executor {
    fn commit(self) -> impl Future<Output = Result<()>> + Send;
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}
