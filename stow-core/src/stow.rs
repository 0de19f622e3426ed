use crate::{
    Aggregate, CancellableTraceLog, ClassProperty, Command, ConversionType, DbFieldCache,
    DbFieldCollection, DbHelper, DbSetting, DbValidator, DefaultDbValidator, Driver, Entity,
    Error, ExecutionContext, ExecutionContextCache, ExecutionKind, Executor, Expr, Field,
    GlobalConfigurationOptions, OrderField, PropertyCache, QueryField, QueryGroup, Registry,
    Result, ResultTraceLog, RowLabeled, RowReader, StatementArgs, StatementBuilder, StowError,
    Trace, TraceLog, Value, execution_key, stream::TryStreamExt, table_name_of,
};
use std::{
    future::Future,
    sync::{Arc, LazyLock},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

/// Filter argument of the operations.
///
/// ```rust,ignore
/// stow.query::<Person, _>(&mut connection, expr!(Person::age >= 18), &[], None, None).await?;
/// stow.delete::<Person, _>(&mut connection, Where::key(10)).await?;
/// ```
#[derive(Default, Debug, Clone)]
pub enum Where {
    #[default]
    None,
    Group(QueryGroup),
    Expr(Expr),
    /// Value of the primary field.
    Key(Value),
    /// Dynamic object, see [`QueryGroup::parse_json`].
    Json(serde_json::Value),
}

impl Where {
    pub fn key(value: impl Into<Value>) -> Self {
        Where::Key(value.into())
    }

    fn resolve(
        self,
        properties: &[ClassProperty],
        fields: &DbFieldCollection,
        table_name: &str,
    ) -> Result<Option<QueryGroup>> {
        Ok(match self {
            Where::None => None,
            Where::Group(group) => Some(group),
            Where::Expr(expr) => Some(QueryGroup::parse_expression(&expr, properties)?),
            Where::Json(json) => Some(QueryGroup::parse_json(&json)?),
            Where::Key(value) => {
                let Some(primary) = fields.primary() else {
                    return Err(Error::new(StowError::PrimaryFieldNotFound(
                        table_name.to_string(),
                    )));
                };
                Some(QueryGroup::and([QueryField::new(primary.name.clone(), value)]))
            }
        })
    }
}

impl From<QueryGroup> for Where {
    fn from(value: QueryGroup) -> Self {
        Where::Group(value)
    }
}

impl From<QueryField> for Where {
    fn from(value: QueryField) -> Self {
        Where::Group(QueryGroup::and([value]))
    }
}

impl From<Option<QueryGroup>> for Where {
    fn from(value: Option<QueryGroup>) -> Self {
        value.map_or(Where::None, Where::Group)
    }
}

impl From<Expr> for Where {
    fn from(value: Expr) -> Self {
        Where::Expr(value)
    }
}

impl From<serde_json::Value> for Where {
    fn from(value: serde_json::Value) -> Self {
        Where::Json(value)
    }
}

struct Shared {
    registry: Registry,
    options: GlobalConfigurationOptions,
    properties: PropertyCache,
    db_fields: DbFieldCache,
    contexts: ExecutionContextCache,
}

/// Entry point of every operation.
///
/// Holds the options, the registry and the caches. Clones share them, while
/// the trace and the cancellation token belong to each clone.
#[derive(Clone)]
pub struct Stow {
    shared: Arc<Shared>,
    trace: Option<Arc<dyn Trace>>,
    cancellation: Option<CancellationToken>,
}

static GLOBAL: LazyLock<Stow> = LazyLock::new(Stow::default);

impl Default for Stow {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl Stow {
    pub fn new(options: GlobalConfigurationOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Registry::new(),
                properties: PropertyCache::new(),
                db_fields: DbFieldCache::new(options.default_cache_item_expiration_in_minutes),
                contexts: ExecutionContextCache::new(),
                options,
            }),
            trace: None,
            cancellation: None,
        }
    }

    /// Process wide instance with the default options.
    pub fn global() -> &'static Stow {
        &GLOBAL
    }

    pub fn with_trace(mut self, trace: impl Trace + 'static) -> Self {
        self.trace = Some(Arc::new(trace));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn options(&self) -> &GlobalConfigurationOptions {
        &self.shared.options
    }

    pub fn registry(&self) -> &Registry {
        &self.shared.registry
    }

    pub fn property_cache(&self) -> &PropertyCache {
        &self.shared.properties
    }

    pub fn db_field_cache(&self) -> &DbFieldCache {
        &self.shared.db_fields
    }

    pub fn context_cache(&self) -> &ExecutionContextCache {
        &self.shared.contexts
    }

    /// Clears every cache, registry changes are observed from now on.
    pub fn flush(&self) {
        self.shared.properties.flush();
        self.shared.db_fields.flush();
        self.shared.contexts.flush();
    }

    pub fn properties<E: Entity>(&self) -> Arc<[ClassProperty]> {
        self.shared.properties.get::<E>(&self.shared.registry)
    }

    pub fn table_name<E: Entity>(&self) -> String {
        table_name_of::<E>(&self.shared.registry)
    }

    pub fn db_setting<D: Driver>(&self, driver: &D) -> Arc<DbSetting> {
        self.shared
            .registry
            .db_setting
            .get(&D::NAME)
            .unwrap_or_else(|| Arc::new(driver.db_setting().clone()))
    }

    pub fn statement_builder<D: Driver>(&self, driver: &D) -> Arc<dyn StatementBuilder> {
        match self.shared.registry.statement_builder.get(&D::NAME) {
            Some(builder) => builder,
            None => Arc::new(driver.statement_builder(self.db_setting(driver))),
        }
    }

    pub fn db_validator<D: Driver>(&self) -> Arc<dyn DbValidator> {
        self.shared
            .registry
            .db_validator
            .get(&D::NAME)
            .unwrap_or_else(|| Arc::new(DefaultDbValidator))
    }

    /// Catalog columns of `table_name`, cached per dialect.
    pub async fn db_fields<Exec: Executor>(
        &self,
        executor: &mut Exec,
        table_name: &str,
    ) -> Result<Arc<DbFieldCollection>> {
        let name = <Exec::Driver as Driver>::NAME;
        if let Some(found) = self.shared.db_fields.get(name, table_name) {
            return Ok(found);
        }
        let driver = executor.driver().clone();
        let setting = self.db_setting(&driver);
        let fields = self
            .guard(driver.db_helper().get_fields(executor, &setting, table_name))
            .await?;
        log::debug!(
            "Introspected {} columns of `{table_name}` on {name}",
            fields.len()
        );
        Ok(self
            .shared
            .db_fields
            .insert(name, table_name, DbFieldCollection::new(fields)))
    }

    /// The columns shared by the table and the entity, in property order.
    ///
    /// Without a catalog the entity mapping alone describes the table. The
    /// primary and identity declared by the entity apply when the catalog has none.
    async fn shape<Exec: Executor>(
        &self,
        executor: &mut Exec,
        table_name: &str,
        properties: &[ClassProperty],
    ) -> Result<DbFieldCollection> {
        let db_fields = self.db_fields(executor, table_name).await?;
        if db_fields.is_empty() {
            return Ok(properties.iter().map(ClassProperty::as_db_field).collect());
        }
        let has_primary = db_fields.primary().is_some();
        let has_identity = db_fields.identity().is_some();
        let shape: DbFieldCollection = properties
            .iter()
            .filter_map(|p| {
                let mut field = db_fields.get_by_name(&p.column)?.clone();
                field.is_primary |= !has_primary && p.is_primary;
                field.is_identity |= !has_identity && p.is_identity;
                Some(field)
            })
            .collect();
        if shape.is_empty() {
            let entity = properties.first().map_or("", |p| p.entity);
            return Err(Error::new(StowError::MissingMapping(format!(
                "no column of `{table_name}` matches a property of `{entity}`"
            ))));
        }
        Ok(shape)
    }

    async fn context<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        kind: ExecutionKind,
        table_name: &str,
        qualifiers: &[Field],
        batch_size: usize,
    ) -> Result<Arc<ExecutionContext>> {
        let properties = self.properties::<E>();
        let fields: Vec<Field> = properties.iter().map(ClassProperty::as_field).collect();
        let key = execution_key::<E>(table_name, &fields, qualifiers, batch_size);
        let driver = executor.driver().clone();
        self.shared
            .contexts
            .get_or_build(kind, <Exec::Driver as Driver>::NAME, key, || async move {
                let shape = self.shape(executor, table_name, &properties).await?;
                let builder = self.statement_builder(&driver);
                let fields = shape.as_fields();
                let args = StatementArgs::new(table_name, &fields)
                    .with_primary(shape.primary())
                    .with_identity(shape.identity())
                    .with_qualifiers(qualifiers)
                    .with_batch_size(batch_size)
                    .with_key_column_return_behavior(self.options().key_column_return_behavior);
                let text = match kind {
                    ExecutionKind::Insert => builder.create_insert(&args),
                    ExecutionKind::InsertAll => builder.create_insert_all(&args),
                    ExecutionKind::Update => builder.create_update(&args),
                    ExecutionKind::UpdateAll => builder.create_update_all(&args),
                    ExecutionKind::Merge => builder.create_merge(&args),
                    ExecutionKind::MergeAll => builder.create_merge_all(&args),
                }?;
                Ok(ExecutionContext::new(
                    kind,
                    text,
                    shape.items().to_vec(),
                    properties.clone(),
                    builder.db_setting(),
                    batch_size,
                )
                .with_key_column_return_behavior(self.options().key_column_return_behavior))
            })
            .await
    }

    /// Rows per statement of the batch operations.
    fn batch_size<D: Driver>(&self, driver: &D, requested: Option<usize>) -> usize {
        if !self.db_setting(driver).is_multi_statement_executable {
            return 1;
        }
        requested
            .unwrap_or(self.options().default_batch_operation_size)
            .max(1)
    }

    /// Races `future` against the cancellation token.
    async fn guard<T>(&self, future: impl Future<Output = Result<T>>) -> Result<T> {
        let Some(token) = &self.cancellation else {
            return future.await;
        };
        if token.is_cancelled() {
            return Err(Error::new(StowError::OperationCancelled));
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::new(StowError::OperationCancelled)),
            result = future => result,
        }
    }

    fn before_execution(&self, key: &'static str, command: &Command) -> Result<Instant> {
        log::debug!("{key}: {command}");
        if let Some(trace) = &self.trace {
            let log = CancellableTraceLog::new(key, command);
            trace.before_execution(&log);
            if log.is_cancelled() {
                log::debug!("{key} was cancelled by the trace");
                return Err(Error::new(StowError::CancelledExecution(key.into())));
            }
        }
        Ok(Instant::now())
    }

    fn after_execution<T>(
        &self,
        key: &'static str,
        command: &Command,
        started: Instant,
        result: &Result<T>,
        summary: impl FnOnce(&T) -> Value,
    ) {
        if let Err(e) = result {
            log::error!("{key} failed: {e:#}");
        }
        if let Some(trace) = &self.trace {
            trace.after_execution(&ResultTraceLog {
                log: TraceLog { key, command },
                elapsed: started.elapsed(),
                result: result.as_ref().ok().map(summary),
            });
        }
    }

    async fn run_execute<Exec: Executor>(
        &self,
        executor: &mut Exec,
        key: &'static str,
        command: Command,
    ) -> Result<u64> {
        let started = self.before_execution(key, &command)?;
        let result = self
            .guard(executor.execute(command.clone()))
            .await
            .map(|v| v.rows_affected);
        self.after_execution(key, &command, started, &result, |v| Value::UInt64(Some(*v)));
        result
    }

    async fn run_scalar<Exec: Executor>(
        &self,
        executor: &mut Exec,
        key: &'static str,
        command: Command,
    ) -> Result<Value> {
        let started = self.before_execution(key, &command)?;
        let result = self.guard(executor.execute_scalar(command.clone())).await;
        self.after_execution(key, &command, started, &result, Value::clone);
        result
    }

    async fn run_fetch<Exec: Executor>(
        &self,
        executor: &mut Exec,
        key: &'static str,
        command: Command,
    ) -> Result<Vec<RowLabeled>> {
        let started = self.before_execution(key, &command)?;
        let result = self
            .guard(executor.fetch(command.clone()).try_collect::<Vec<_>>())
            .await;
        self.after_execution(key, &command, started, &result, |v| {
            Value::UInt64(Some(v.len() as u64))
        });
        result
    }

    fn materialize<E: Entity>(
        &self,
        rows: &[RowLabeled],
        properties: &[ClassProperty],
    ) -> Result<Vec<E>> {
        rows.iter()
            .map(|row| E::from_row(&RowReader::new(row, properties, self.options())))
            .collect()
    }

    /// Writes a returned key into the entity, always converting it.
    fn write_key<E: Entity>(&self, entity: &mut E, index: usize, value: Value) -> Result<()> {
        let mut options = self.options().clone();
        options.conversion_type = ConversionType::Automatic;
        entity.set_property_value(index, value, &options)
    }

    pub async fn query<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        filter: impl Into<Where>,
        order_by: &[OrderField],
        top: Option<u64>,
        hints: Option<&str>,
    ) -> Result<Vec<E>> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_query(&table_name)?;
        let properties = self.properties::<E>();
        let shape = self.shape(executor, &table_name, &properties).await?;
        let filter = filter.into().resolve(&properties, &shape, &table_name)?;
        let fields = shape.as_fields();
        let builder = self.statement_builder(&driver);
        let args = StatementArgs::new(&table_name, &fields)
            .with_filter(filter.as_ref())
            .with_order_by(order_by)
            .with_top(top)
            .with_hints(hints);
        let command = Command::new(
            builder.create_query(&args)?,
            parameters(filter.as_ref(), builder.db_setting()),
        );
        let rows = self.run_fetch(executor, "query", command).await?;
        self.materialize(&rows, &properties)
    }

    pub async fn query_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        order_by: &[OrderField],
        hints: Option<&str>,
    ) -> Result<Vec<E>> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_query(&table_name)?;
        let properties = self.properties::<E>();
        let shape = self.shape(executor, &table_name, &properties).await?;
        let fields = shape.as_fields();
        let builder = self.statement_builder(&driver);
        let args = StatementArgs::new(&table_name, &fields)
            .with_order_by(order_by)
            .with_hints(hints);
        let command = Command::from(builder.create_query_all(&args)?);
        let rows = self.run_fetch(executor, "query_all", command).await?;
        self.materialize(&rows, &properties)
    }

    /// One page of the ordered result, `page` is zero based.
    #[allow(clippy::too_many_arguments)]
    pub async fn batch_query<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        filter: impl Into<Where>,
        page: u64,
        rows_per_batch: u64,
        order_by: &[OrderField],
        hints: Option<&str>,
    ) -> Result<Vec<E>> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_batch_query(&table_name)?;
        let properties = self.properties::<E>();
        let shape = self.shape(executor, &table_name, &properties).await?;
        let filter = filter.into().resolve(&properties, &shape, &table_name)?;
        let fields = shape.as_fields();
        let builder = self.statement_builder(&driver);
        let args = StatementArgs::new(&table_name, &fields)
            .with_filter(filter.as_ref())
            .with_order_by(order_by)
            .with_page(page, rows_per_batch)
            .with_hints(hints);
        let command = Command::new(
            builder.create_batch_query(&args)?,
            parameters(filter.as_ref(), builder.db_setting()),
        );
        let rows = self.run_fetch(executor, "batch_query", command).await?;
        self.materialize(&rows, &properties)
    }

    async fn aggregate<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        key: &'static str,
        aggregate: Aggregate,
        field: Option<Field>,
        filter: Option<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_count(&table_name)?;
        let filtered = filter.is_some();
        let filter = match filter {
            Some(filter @ (Where::Key(..) | Where::Expr(..))) => {
                let properties = self.properties::<E>();
                let shape = self.shape(executor, &table_name, &properties).await?;
                filter.resolve(&properties, &shape, &table_name)?
            }
            Some(filter) => filter.resolve(&[], &DbFieldCollection::default(), &table_name)?,
            None => None,
        };
        let fields: Vec<Field> = field.into_iter().collect();
        let builder = self.statement_builder(&driver);
        let args = StatementArgs::new(&table_name, &fields)
            .with_filter(filter.as_ref())
            .with_hints(hints);
        let text = match (aggregate, filtered) {
            (Aggregate::Count, true) => builder.create_count(&args),
            (Aggregate::Count, false) => builder.create_count_all(&args),
            (Aggregate::Average, true) => builder.create_average(&args),
            (Aggregate::Average, false) => builder.create_average_all(&args),
            (Aggregate::Min, true) => builder.create_min(&args),
            (Aggregate::Min, false) => builder.create_min_all(&args),
            (Aggregate::Max, true) => builder.create_max(&args),
            (Aggregate::Max, false) => builder.create_max_all(&args),
            (Aggregate::Sum, true) => builder.create_sum(&args),
            (Aggregate::Sum, false) => builder.create_sum_all(&args),
        }?;
        let command = Command::new(text, parameters(filter.as_ref(), builder.db_setting()));
        self.run_scalar(executor, key, command).await
    }

    pub async fn count<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<u64> {
        let value = self
            .aggregate::<E, _>(executor, "count", Aggregate::Count, None, Some(filter.into()), hints)
            .await?;
        to_count(value)
    }

    pub async fn count_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        hints: Option<&str>,
    ) -> Result<u64> {
        let value = self
            .aggregate::<E, _>(executor, "count_all", Aggregate::Count, None, None, hints)
            .await?;
        to_count(value)
    }

    pub async fn exists<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<bool> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_query(&table_name)?;
        let properties = self.properties::<E>();
        let shape = self.shape(executor, &table_name, &properties).await?;
        let filter = filter.into().resolve(&properties, &shape, &table_name)?;
        let builder = self.statement_builder(&driver);
        let args = StatementArgs::new(&table_name, &[])
            .with_filter(filter.as_ref())
            .with_hints(hints);
        let command = Command::new(
            builder.create_exists(&args)?,
            parameters(filter.as_ref(), builder.db_setting()),
        );
        let value = self.run_scalar(executor, "exists", command).await?;
        Ok(!value.is_null())
    }

    pub async fn average<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(
            executor,
            "average",
            Aggregate::Average,
            Some(field.into()),
            Some(filter.into()),
            hints,
        )
        .await
    }

    pub async fn average_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(
            executor,
            "average_all",
            Aggregate::Average,
            Some(field.into()),
            None,
            hints,
        )
        .await
    }

    pub async fn min<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(
            executor,
            "min",
            Aggregate::Min,
            Some(field.into()),
            Some(filter.into()),
            hints,
        )
        .await
    }

    pub async fn min_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, "min_all", Aggregate::Min, Some(field.into()), None, hints)
            .await
    }

    pub async fn max<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(
            executor,
            "max",
            Aggregate::Max,
            Some(field.into()),
            Some(filter.into()),
            hints,
        )
        .await
    }

    pub async fn max_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, "max_all", Aggregate::Max, Some(field.into()), None, hints)
            .await
    }

    pub async fn sum<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        filter: impl Into<Where>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(
            executor,
            "sum",
            Aggregate::Sum,
            Some(field.into()),
            Some(filter.into()),
            hints,
        )
        .await
    }

    pub async fn sum_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        field: impl Into<Field>,
        hints: Option<&str>,
    ) -> Result<Value> {
        self.aggregate::<E, _>(executor, "sum_all", Aggregate::Sum, Some(field.into()), None, hints)
            .await
    }

    /// Inserts the entity and returns the generated key, which is also written
    /// into the property of the key column.
    pub async fn insert<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &mut E,
    ) -> Result<Value> {
        let table_name = self.table_name::<E>();
        self.db_validator::<Exec::Driver>()
            .validate_insert(&table_name)?;
        let context = self
            .context::<E, _>(executor, ExecutionKind::Insert, &table_name, &[], 1)
            .await?;
        let command = Command::new(
            context.command_text.clone(),
            context.bind(std::slice::from_ref(entity))?,
        );
        let result = self.run_scalar(executor, "insert", command).await?;
        if let Some(index) = context.key_property
            && !result.is_null()
        {
            self.write_key(entity, index, result.clone())?;
        }
        Ok(result)
    }

    /// Inserts the entities in batches, returns the number of inserted rows.
    pub async fn insert_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entities: &mut [E],
        batch_size: Option<usize>,
    ) -> Result<usize> {
        self.write_all(executor, ExecutionKind::InsertAll, "insert_all", entities, &[], batch_size)
            .await
    }

    pub async fn merge<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &mut E,
        qualifiers: &[Field],
    ) -> Result<Value> {
        let table_name = self.table_name::<E>();
        self.db_validator::<Exec::Driver>()
            .validate_merge(&table_name)?;
        let context = self
            .context::<E, _>(executor, ExecutionKind::Merge, &table_name, qualifiers, 1)
            .await?;
        let command = Command::new(
            context.command_text.clone(),
            context.bind(std::slice::from_ref(entity))?,
        );
        let result = self.run_scalar(executor, "merge", command).await?;
        if let Some(index) = context.key_property
            && !result.is_null()
        {
            self.write_key(entity, index, result.clone())?;
        }
        Ok(result)
    }

    pub async fn merge_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entities: &mut [E],
        qualifiers: &[Field],
        batch_size: Option<usize>,
    ) -> Result<usize> {
        self.write_all(executor, ExecutionKind::MergeAll, "merge_all", entities, qualifiers, batch_size)
            .await
    }

    /// Runs the batched insert or merge, then routes every returned key to its row.
    async fn write_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        kind: ExecutionKind,
        key: &'static str,
        entities: &mut [E],
        qualifiers: &[Field],
        batch_size: Option<usize>,
    ) -> Result<usize> {
        let table_name = self.table_name::<E>();
        let validator = self.db_validator::<Exec::Driver>();
        match kind {
            ExecutionKind::MergeAll => validator.validate_merge(&table_name)?,
            _ => validator.validate_insert(&table_name)?,
        }
        if entities.is_empty() {
            return Ok(0);
        }
        let driver = executor.driver().clone();
        let batch_size = self.batch_size(&driver, batch_size);
        for chunk in entities.chunks_mut(batch_size) {
            let context = self
                .context::<E, _>(executor, kind, &table_name, qualifiers, chunk.len())
                .await?;
            let command = Command::new(context.command_text.clone(), context.bind(chunk)?);
            let rows = self.run_fetch(executor, key, command).await?;
            let Some(property) = context.key_property else {
                continue;
            };
            for (position, row) in rows.iter().enumerate() {
                let index = row
                    .get_column("OrderColumn")
                    .and_then(|v| v.clone().convert_to(&Value::UInt64(None)).ok())
                    .and_then(|v| match v {
                        Value::UInt64(Some(v)) => Some(v as usize),
                        _ => None,
                    })
                    .unwrap_or(position);
                let value = row
                    .get_column("Result")
                    .or_else(|| row.values.first())
                    .cloned()
                    .unwrap_or_default();
                if let Some(entity) = chunk.get_mut(index)
                    && !value.is_null()
                {
                    self.write_key(entity, property, value)?;
                }
            }
        }
        Ok(entities.len())
    }

    /// Updates the row matching the primary field of the entity.
    pub async fn update<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &E,
    ) -> Result<u64> {
        let table_name = self.table_name::<E>();
        self.db_validator::<Exec::Driver>()
            .validate_update(&table_name)?;
        let context = self
            .context::<E, _>(executor, ExecutionKind::Update, &table_name, &[], 1)
            .await?;
        let command = Command::new(
            context.command_text.clone(),
            context.bind(std::slice::from_ref(entity))?,
        );
        self.run_execute(executor, "update", command).await
    }

    /// Updates the rows matching `filter` with the values of the entity.
    ///
    /// Not cached, the statement depends on the filter.
    pub async fn update_where<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &E,
        filter: impl Into<Where>,
    ) -> Result<u64> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_update(&table_name)?;
        let properties = self.properties::<E>();
        let shape = self.shape(executor, &table_name, &properties).await?;
        let filter = filter.into().resolve(&properties, &shape, &table_name)?;
        let builder = self.statement_builder(&driver);
        let setting = builder.db_setting();
        let fields = shape.as_fields();
        let args = StatementArgs::new(&table_name, &fields)
            .with_filter(filter.as_ref())
            .with_primary(shape.primary())
            .with_identity(shape.identity());
        let text = builder.create_update(&args)?;
        let context = ExecutionContext::new(
            ExecutionKind::Update,
            text,
            shape.items().to_vec(),
            properties.clone(),
            setting,
            1,
        );
        let mut parameters = context.bind(std::slice::from_ref(entity))?;
        if let Some(filter) = filter.as_ref().filter(|f| !f.is_empty()) {
            parameters.extend(filter.parameters(setting, "_", None));
        }
        let command = Command::new(context.command_text.clone(), parameters);
        self.run_execute(executor, "update", command).await
    }

    /// Updates the entities in batches matching them by `qualifiers`, or by the primary field.
    pub async fn update_all<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entities: &[E],
        qualifiers: &[Field],
        batch_size: Option<usize>,
    ) -> Result<u64> {
        let table_name = self.table_name::<E>();
        self.db_validator::<Exec::Driver>()
            .validate_update(&table_name)?;
        let driver = executor.driver().clone();
        let batch_size = self.batch_size(&driver, batch_size);
        let mut result = 0;
        for chunk in entities.chunks(batch_size) {
            let context = self
                .context::<E, _>(executor, ExecutionKind::UpdateAll, &table_name, qualifiers, chunk.len())
                .await?;
            let command = Command::new(context.command_text.clone(), context.bind(chunk)?);
            result += self.run_execute(executor, "update_all", command).await?;
        }
        Ok(result)
    }

    pub async fn delete<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        filter: impl Into<Where>,
    ) -> Result<u64> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_delete(&table_name)?;
        let properties = self.properties::<E>();
        let shape = self.shape(executor, &table_name, &properties).await?;
        let filter = filter.into().resolve(&properties, &shape, &table_name)?;
        let builder = self.statement_builder(&driver);
        let args = StatementArgs::new(&table_name, &[]).with_filter(filter.as_ref());
        let command = Command::new(
            builder.create_delete(&args)?,
            parameters(filter.as_ref(), builder.db_setting()),
        );
        self.run_execute(executor, "delete", command).await
    }

    /// Deletes the row matching the primary field of the entity.
    pub async fn delete_entity<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        entity: &E,
    ) -> Result<u64> {
        let properties = self.properties::<E>();
        let Some(primary) = properties.iter().find(|p| p.is_primary) else {
            return Err(Error::new(StowError::PrimaryFieldNotFound(
                self.table_name::<E>(),
            )));
        };
        let key = entity.property_value(primary.index);
        self.delete::<E, _>(executor, Where::Key(key)).await
    }

    pub async fn delete_all<E: Entity, Exec: Executor>(&self, executor: &mut Exec) -> Result<u64> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_delete(&table_name)?;
        let builder = self.statement_builder(&driver);
        let text = builder.create_delete_all(&StatementArgs::new(&table_name, &[]))?;
        self.run_execute(executor, "delete_all", text.into()).await
    }

    pub async fn truncate<E: Entity, Exec: Executor>(&self, executor: &mut Exec) -> Result<u64> {
        let table_name = self.table_name::<E>();
        let driver = executor.driver().clone();
        self.db_validator::<Exec::Driver>()
            .validate_truncate(&table_name)?;
        let builder = self.statement_builder(&driver);
        let text = builder.create_truncate(&StatementArgs::new(&table_name, &[]))?;
        self.run_execute(executor, "truncate", text.into()).await
    }

    /// Runs a raw command and materializes its rows into entities.
    pub async fn execute_query<E: Entity, Exec: Executor>(
        &self,
        executor: &mut Exec,
        command: impl Into<Command>,
    ) -> Result<Vec<E>> {
        let properties = self.properties::<E>();
        let rows = self
            .run_fetch(executor, "execute_query", command.into())
            .await?;
        self.materialize(&rows, &properties)
    }

    pub async fn execute_non_query<Exec: Executor>(
        &self,
        executor: &mut Exec,
        command: impl Into<Command>,
    ) -> Result<u64> {
        self.run_execute(executor, "execute_non_query", command.into())
            .await
    }

    pub async fn execute_scalar<Exec: Executor>(
        &self,
        executor: &mut Exec,
        command: impl Into<Command>,
    ) -> Result<Value> {
        self.run_scalar(executor, "execute_scalar", command.into())
            .await
    }
}

fn parameters(filter: Option<&QueryGroup>, setting: &DbSetting) -> Vec<crate::Parameter> {
    filter
        .map(|f| f.parameters(setting, "", None))
        .unwrap_or_default()
}

fn to_count(value: Value) -> Result<u64> {
    if value.is_null() {
        return Ok(0);
    }
    match value.convert_to(&Value::UInt64(None))? {
        Value::UInt64(Some(v)) => Ok(v),
        _ => Ok(0),
    }
}
