use crate::{
    Command, Connection, ConnectionPersistency, Entity, Error, Field, OrderField, Result, Stow,
    StowError, Value, Where,
};
use std::ops::{Deref, DerefMut};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

/// Connection lent to a single operation.
pub enum ConnectionGuard<'a, C> {
    /// Opened for this call, closed when dropped.
    Owned(C),
    /// The instance connection, locked until dropped.
    Shared(MappedMutexGuard<'a, C>),
}

impl<C> Deref for ConnectionGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        match self {
            ConnectionGuard::Owned(v) => v,
            ConnectionGuard::Shared(v) => v,
        }
    }
}

impl<C> DerefMut for ConnectionGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            ConnectionGuard::Owned(v) => v,
            ConnectionGuard::Shared(v) => v,
        }
    }
}

/// Operations bound to a connection URL.
///
/// With [`ConnectionPersistency::PerCall`] every operation opens its own
/// connection. With [`ConnectionPersistency::Instance`] the first operation
/// opens a connection that is reused, one operation at a time, until
/// [`DbRepository::dispose`].
///
/// Transactions are run through [`Stow`] on a connection taken with
/// [`DbRepository::connection`]:
///
/// ```rust,ignore
/// let mut connection = repository.connection().await?;
/// let mut transaction = connection.begin().await?;
/// repository.stow().insert(&mut transaction, &mut person).await?;
/// transaction.commit().await?;
/// ```
pub struct DbRepository<C: Connection> {
    url: String,
    persistency: ConnectionPersistency,
    stow: Stow,
    connection: Mutex<Option<C>>,
}

impl<C: Connection> DbRepository<C> {
    pub fn new(url: impl Into<String>, persistency: ConnectionPersistency) -> Self {
        Self::with_stow(url, persistency, Stow::global().clone())
    }

    pub fn with_stow(url: impl Into<String>, persistency: ConnectionPersistency, stow: Stow) -> Self {
        Self {
            url: url.into(),
            persistency,
            stow,
            connection: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn persistency(&self) -> ConnectionPersistency {
        self.persistency
    }

    pub fn stow(&self) -> &Stow {
        &self.stow
    }

    pub async fn connection(&self) -> Result<ConnectionGuard<'_, C>> {
        match self.persistency {
            ConnectionPersistency::PerCall => Ok(ConnectionGuard::Owned(C::connect(&self.url).await?)),
            ConnectionPersistency::Instance => {
                let mut guard = self.connection.lock().await;
                if guard.is_none() {
                    log::debug!("Opening the instance connection");
                    *guard = Some(C::connect(&self.url).await?);
                }
                MutexGuard::try_map(guard, Option::as_mut)
                    .map(ConnectionGuard::Shared)
                    .map_err(|_| Error::new(StowError::NullReference("connection".into())))
            }
        }
    }

    /// Closes the instance connection, the next operation opens a new one.
    pub async fn dispose(&self) {
        if self.connection.lock().await.take().is_some() {
            log::debug!("Disposed the instance connection");
        }
    }

    pub async fn query<E: Entity>(
        &self,
        filter: impl Into<Where>,
        order_by: &[OrderField],
        top: Option<u64>,
        hints: Option<&str>,
    ) -> Result<Vec<E>> {
        let mut connection = self.connection().await?;
        self.stow
            .query(&mut *connection, filter, order_by, top, hints)
            .await
    }

    pub async fn query_all<E: Entity>(
        &self,
        order_by: &[OrderField],
        hints: Option<&str>,
    ) -> Result<Vec<E>> {
        let mut connection = self.connection().await?;
        self.stow.query_all(&mut *connection, order_by, hints).await
    }

    pub async fn batch_query<E: Entity>(
        &self,
        filter: impl Into<Where>,
        page: u64,
        rows_per_batch: u64,
        order_by: &[OrderField],
        hints: Option<&str>,
    ) -> Result<Vec<E>> {
        let mut connection = self.connection().await?;
        self.stow
            .batch_query(&mut *connection, filter, page, rows_per_batch, order_by, hints)
            .await
    }

    pub async fn count<E: Entity>(&self, filter: impl Into<Where>, hints: Option<&str>) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow
            .count::<E, _>(&mut *connection, filter, hints)
            .await
    }

    pub async fn count_all<E: Entity>(&self, hints: Option<&str>) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.count_all::<E, _>(&mut *connection, hints).await
    }

    pub async fn exists<E: Entity>(&self, filter: impl Into<Where>, hints: Option<&str>) -> Result<bool> {
        let mut connection = self.connection().await?;
        self.stow
            .exists::<E, _>(&mut *connection, filter, hints)
            .await
    }

    pub async fn average<E: Entity>(
        &self,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .average::<E, _>(&mut *connection, field, filter, hints)
            .await
    }

    pub async fn average_all<E: Entity>(&self, field: impl Into<Field>, hints: Option<&str>) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .average_all::<E, _>(&mut *connection, field, hints)
            .await
    }

    pub async fn min<E: Entity>(
        &self,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .min::<E, _>(&mut *connection, field, filter, hints)
            .await
    }

    pub async fn min_all<E: Entity>(&self, field: impl Into<Field>, hints: Option<&str>) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .min_all::<E, _>(&mut *connection, field, hints)
            .await
    }

    pub async fn max<E: Entity>(
        &self,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .max::<E, _>(&mut *connection, field, filter, hints)
            .await
    }

    pub async fn max_all<E: Entity>(&self, field: impl Into<Field>, hints: Option<&str>) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .max_all::<E, _>(&mut *connection, field, hints)
            .await
    }

    pub async fn sum<E: Entity>(
        &self,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .sum::<E, _>(&mut *connection, field, filter, hints)
            .await
    }

    pub async fn sum_all<E: Entity>(&self, field: impl Into<Field>, hints: Option<&str>) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .sum_all::<E, _>(&mut *connection, field, hints)
            .await
    }

    pub async fn insert<E: Entity>(&self, entity: &mut E) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow.insert(&mut *connection, entity).await
    }

    pub async fn insert_all<E: Entity>(&self, entities: &mut [E], batch_size: Option<usize>) -> Result<usize> {
        let mut connection = self.connection().await?;
        self.stow
            .insert_all(&mut *connection, entities, batch_size)
            .await
    }

    pub async fn update<E: Entity>(&self, entity: &E) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.update(&mut *connection, entity).await
    }

    pub async fn update_where<E: Entity>(&self, entity: &E, filter: impl Into<Where>) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow
            .update_where(&mut *connection, entity, filter)
            .await
    }

    pub async fn update_all<E: Entity>(
        &self,
        entities: &[E],
        qualifiers: &[Field],
        batch_size: Option<usize>,
    ) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow
            .update_all(&mut *connection, entities, qualifiers, batch_size)
            .await
    }

    pub async fn merge<E: Entity>(&self, entity: &mut E, qualifiers: &[Field]) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow
            .merge(&mut *connection, entity, qualifiers)
            .await
    }

    pub async fn merge_all<E: Entity>(
        &self,
        entities: &mut [E],
        qualifiers: &[Field],
        batch_size: Option<usize>,
    ) -> Result<usize> {
        let mut connection = self.connection().await?;
        self.stow
            .merge_all(&mut *connection, entities, qualifiers, batch_size)
            .await
    }

    pub async fn delete<E: Entity>(&self, filter: impl Into<Where>) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.delete::<E, _>(&mut *connection, filter).await
    }

    pub async fn delete_entity<E: Entity>(&self, entity: &E) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.delete_entity(&mut *connection, entity).await
    }

    pub async fn delete_all<E: Entity>(&self) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.delete_all::<E, _>(&mut *connection).await
    }

    pub async fn truncate<E: Entity>(&self) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.truncate::<E, _>(&mut *connection).await
    }

    pub async fn execute_query<E: Entity>(&self, command: impl Into<Command>) -> Result<Vec<E>> {
        let mut connection = self.connection().await?;
        self.stow.execute_query(&mut *connection, command).await
    }

    pub async fn execute_non_query(&self, command: impl Into<Command>) -> Result<u64> {
        let mut connection = self.connection().await?;
        self.stow.execute_non_query(&mut *connection, command).await
    }

    pub async fn execute_scalar(&self, command: impl Into<Command>) -> Result<Value> {
        let mut connection = self.connection().await?;
        self.stow.execute_scalar(&mut *connection, command).await
    }
}
