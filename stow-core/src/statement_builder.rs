use crate::{
    DbField, DbSetting, Error, Field, KeyColumnReturnBehavior, OrderField, QueryBuilder,
    QueryGroup, Result, StowError, qualifiers_predicate,
};

/// Inputs of a statement builder.
///
/// ```rust,ignore
/// let args = StatementArgs::new("Person", &fields)
///     .with_identity(Some(&id))
///     .with_batch_size(3);
/// ```
#[derive(Default, Debug, Clone)]
pub struct StatementArgs<'a> {
    /// Possibly schema qualified, quoted or not.
    pub table_name: &'a str,
    pub fields: &'a [Field],
    pub filter: Option<&'a QueryGroup>,
    pub order_by: &'a [OrderField],
    pub top: Option<u64>,
    /// Zero based page index and rows per page.
    pub page: Option<(u64, u64)>,
    pub qualifiers: &'a [Field],
    pub primary: Option<&'a DbField>,
    pub identity: Option<&'a DbField>,
    /// Rows per statement of the `*_all` variants.
    pub batch_size: usize,
    /// Table hints, only honored by dialects that have them.
    pub hints: Option<&'a str>,
    pub key_column_return_behavior: KeyColumnReturnBehavior,
}

impl<'a> StatementArgs<'a> {
    pub fn new(table_name: &'a str, fields: &'a [Field]) -> Self {
        Self {
            table_name,
            fields,
            batch_size: 1,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Option<&'a QueryGroup>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_order_by(mut self, order_by: &'a [OrderField]) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_top(mut self, top: Option<u64>) -> Self {
        self.top = top;
        self
    }

    pub fn with_page(mut self, page: u64, rows_per_batch: u64) -> Self {
        self.page = Some((page, rows_per_batch));
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: &'a [Field]) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn with_primary(mut self, primary: Option<&'a DbField>) -> Self {
        self.primary = primary;
        self
    }

    pub fn with_identity(mut self, identity: Option<&'a DbField>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_hints(mut self, hints: Option<&'a str>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_key_column_return_behavior(mut self, behavior: KeyColumnReturnBehavior) -> Self {
        self.key_column_return_behavior = behavior;
        self
    }

    fn is_identity(&self, field: &Field) -> bool {
        self.identity.is_some_and(|v| v.is_named(&field.name))
    }

    fn is_primary(&self, field: &Field) -> bool {
        self.primary.is_some_and(|v| v.is_named(&field.name))
    }

    /// Row suffixes: none for a single row, `0..batch_size` otherwise.
    fn rows(&self) -> Vec<Option<usize>> {
        match self.batch_size {
            0 | 1 => vec![None],
            n => (0..n).map(Some).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Count,
    Average,
    Min,
    Max,
    Sum,
}

impl Aggregate {
    /// Column label of the result.
    pub fn alias(&self) -> &'static str {
        match self {
            Aggregate::Count => "CountValue",
            Aggregate::Average => "AverageValue",
            Aggregate::Min => "MinValue",
            Aggregate::Max => "MaxValue",
            Aggregate::Sum => "SumValue",
        }
    }
}

fn validate_table(args: &StatementArgs) -> Result<()> {
    if args.table_name.trim().is_empty() {
        return Err(Error::new(StowError::NullReference("table name".into())));
    }
    Ok(())
}

fn validate_fields(args: &StatementArgs) -> Result<()> {
    validate_table(args)?;
    if args.fields.is_empty() {
        return Err(Error::new(StowError::EmptyArgument("fields".into())));
    }
    Ok(())
}

fn validate_order(args: &StatementArgs) -> Result<()> {
    for order in args.order_by {
        if !args.fields.contains(&order.field) {
            return Err(Error::new(StowError::InvalidOrderFields(format!(
                "`{}` is not one of the selected fields of `{}`",
                order.field, args.table_name
            ))));
        }
    }
    Ok(())
}

/// An identity can only identify a row when it is also the primary.
fn validate_identity(args: &StatementArgs) -> Result<()> {
    if let Some(identity) = args.identity {
        if !args.primary.is_some_and(|p| p.is_named(&identity.name)) {
            return Err(Error::new(StowError::InvalidOperation(format!(
                "The identity `{}` of `{}` is not its primary field",
                identity.name, args.table_name
            ))));
        }
    }
    Ok(())
}

/// The explicit qualifiers, or the primary field.
fn resolve_qualifiers(args: &StatementArgs) -> Result<Vec<Field>> {
    if !args.qualifiers.is_empty() {
        if let Some(q) = args.qualifiers.iter().find(|q| !args.fields.contains(q)) {
            return Err(Error::new(StowError::InvalidQualifierFields(format!(
                "`{}` is not one of the fields of `{}`",
                q, args.table_name
            ))));
        }
        return Ok(args.qualifiers.to_vec());
    }
    match args.primary {
        Some(primary) => Ok(vec![primary.as_field()]),
        None => Err(Error::new(StowError::MissingQualifierFields(
            args.table_name.to_string(),
        ))),
    }
}

fn insertable_fields(args: &StatementArgs) -> Vec<Field> {
    args.fields
        .iter()
        .filter(|f| !args.is_identity(f))
        .cloned()
        .collect()
}

fn updatable_fields(args: &StatementArgs, qualifiers: &[Field]) -> Vec<Field> {
    args.fields
        .iter()
        .filter(|f| !args.is_identity(f) && !args.is_primary(f) && !qualifiers.contains(f))
        .cloned()
        .collect()
}

fn no_updatable_fields(args: &StatementArgs) -> Error {
    Error::new(StowError::InvalidOperation(format!(
        "There are no updatable fields for `{}`",
        args.table_name
    )))
}

/// Renders statements of one dialect.
///
/// The provided methods are the common behavior, dialects override the
/// hooks (`write_*`, `*_expression`) or whole statements where they differ.
/// Every method fails before producing any text when its inputs are invalid.
pub trait StatementBuilder: Send + Sync {
    fn db_setting(&self) -> &DbSetting;

    /// Value of the identity generated by the last insert.
    fn identity_expression(&self, identity: &DbField) -> String;

    /// Value of a primary field that is not an identity.
    fn primary_expression(&self, primary: &DbField, index: Option<usize>) -> String {
        crate::parameter(self.db_setting(), &primary.name, "", index)
    }

    /// Written right after `SELECT`.
    fn write_top(&self, _qb: &mut QueryBuilder, _top: Option<u64>) {}

    /// Written at the end of a query.
    fn write_limit(&self, qb: &mut QueryBuilder, top: Option<u64>) {
        qb.limit(top);
    }

    /// Written right after the table name.
    fn write_hints(&self, _qb: &mut QueryBuilder, _hints: Option<&str>) {}

    fn write_paging(&self, qb: &mut QueryBuilder, page: u64, rows: u64) {
        qb.limit(Some(rows)).offset(page * rows);
    }

    fn aggregate_expression(&self, aggregate: Aggregate, field: Option<&Field>) -> String {
        let setting = self.db_setting();
        let column = field.map(|f| setting.quote(&f.name)).unwrap_or_default();
        match aggregate {
            Aggregate::Count => "COUNT(*)".into(),
            Aggregate::Average => format!("AVG(CAST({column} AS {}))", setting.averageable_type),
            Aggregate::Min => format!("MIN({column})"),
            Aggregate::Max => format!("MAX({column})"),
            Aggregate::Sum => format!("SUM({column})"),
        }
    }

    /// The key returned by an insert, following the key column return behavior.
    fn key_expression(&self, args: &StatementArgs, index: Option<usize>) -> Result<Option<String>> {
        let behavior = args.key_column_return_behavior;
        match behavior {
            KeyColumnReturnBehavior::Primary if args.primary.is_none() => {
                return Err(Error::new(StowError::PrimaryFieldNotFound(
                    args.table_name.to_string(),
                )));
            }
            KeyColumnReturnBehavior::Identity if args.identity.is_none() => {
                return Err(Error::new(StowError::IdentityFieldNotFound(
                    args.table_name.to_string(),
                )));
            }
            _ => {}
        }
        let Some(key) = behavior.key_field(args.primary, args.identity) else {
            return Ok(None);
        };
        let expression = |field: &DbField| {
            if args.identity.is_some_and(|i| i.is_named(&field.name)) {
                self.identity_expression(field)
            } else {
                self.primary_expression(field, index)
            }
        };
        let fallback = match behavior {
            KeyColumnReturnBehavior::PrimaryOrElseIdentity => args.identity,
            KeyColumnReturnBehavior::IdentityOrElsePrimary => args.primary,
            _ => None,
        }
        .filter(|f| !f.is_named(&key.name));
        Ok(Some(match fallback {
            Some(other) => format!("COALESCE({}, {})", expression(key), expression(other)),
            None => expression(key),
        }))
    }

    /// Terminates an insert, then selects the returned key.
    fn write_key_return(&self, qb: &mut QueryBuilder, key: Option<&str>, index: Option<usize>) {
        let setting = self.db_setting();
        qb.end();
        if let Some(key) = key {
            qb.select()
                .write_text(key)
                .as_()
                .write_text(setting.quote("Result"))
                .order_column(index, setting)
                .end();
        }
    }

    fn create_query(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_order(args)?;
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.select();
        self.write_top(&mut qb, args.top);
        qb.fields_from(args.fields, setting)
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.where_(args.filter, setting, "", None)
            .order_by(args.order_by, setting);
        self.write_limit(&mut qb, args.top);
        qb.end();
        Ok(qb.get_string())
    }

    fn create_query_all(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_order(args)?;
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.select()
            .fields_from(args.fields, setting)
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.order_by(args.order_by, setting).end();
        Ok(qb.get_string())
    }

    fn create_batch_query(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_order(args)?;
        if args.order_by.is_empty() {
            return Err(Error::new(StowError::InvalidOrderFields(format!(
                "A batch query on `{}` requires at least one order field",
                args.table_name
            ))));
        }
        let (page, rows) = match args.page {
            Some((page, rows)) if rows > 0 => (page, rows),
            _ => {
                return Err(Error::new(StowError::InvalidOperation(
                    "A batch query requires a positive number of rows per batch".into(),
                )));
            }
        };
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.select()
            .fields_from(args.fields, setting)
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.where_(args.filter, setting, "", None)
            .order_by(args.order_by, setting);
        self.write_paging(&mut qb, page, rows);
        qb.end();
        Ok(qb.get_string())
    }

    fn create_aggregate(
        &self,
        aggregate: Aggregate,
        args: &StatementArgs,
        filtered: bool,
    ) -> Result<String> {
        validate_table(args)?;
        let field = args.fields.first();
        if aggregate != Aggregate::Count && field.is_none() {
            return Err(Error::new(StowError::EmptyArgument("field".into())));
        }
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.select()
            .write_text(self.aggregate_expression(aggregate, field))
            .as_()
            .write_text(setting.quote(aggregate.alias()))
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        if filtered {
            qb.where_(args.filter, setting, "", None);
        }
        qb.end();
        Ok(qb.get_string())
    }

    fn create_count(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Count, args, true)
    }

    fn create_count_all(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Count, args, false)
    }

    fn create_average(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Average, args, true)
    }

    fn create_average_all(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Average, args, false)
    }

    fn create_min(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Min, args, true)
    }

    fn create_min_all(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Min, args, false)
    }

    fn create_max(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Max, args, true)
    }

    fn create_max_all(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Max, args, false)
    }

    fn create_sum(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Sum, args, true)
    }

    fn create_sum_all(&self, args: &StatementArgs) -> Result<String> {
        self.create_aggregate(Aggregate::Sum, args, false)
    }

    fn create_exists(&self, args: &StatementArgs) -> Result<String> {
        validate_table(args)?;
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.select();
        self.write_top(&mut qb, Some(1));
        qb.write_text("1")
            .as_()
            .write_text(setting.quote("ExistsValue"))
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.where_(args.filter, setting, "", None);
        self.write_limit(&mut qb, Some(1));
        qb.end();
        Ok(qb.get_string())
    }

    /// A single row insert, `index` suffixes the parameters of batched rows.
    fn write_insert(
        &self,
        qb: &mut QueryBuilder,
        args: &StatementArgs,
        index: Option<usize>,
    ) -> Result<()> {
        let setting = self.db_setting();
        let fields = insertable_fields(args);
        qb.insert()
            .into()
            .table_name_from(args.table_name, setting);
        if fields.is_empty() {
            qb.write_text("DEFAULT VALUES");
        } else {
            qb.open_paren()
                .fields_from(&fields, setting)
                .close_paren()
                .values()
                .open_paren()
                .parameters_from(&fields, setting, index)
                .close_paren();
        }
        let key = self.key_expression(args, index)?;
        self.write_key_return(qb, key.as_deref(), index);
        Ok(())
    }

    fn create_insert(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        let mut qb = QueryBuilder::new();
        self.write_insert(&mut qb, args, None)?;
        Ok(qb.get_string())
    }

    fn create_insert_all(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        let mut qb = QueryBuilder::new();
        for index in args.rows() {
            self.write_insert(&mut qb, args, index)?;
        }
        Ok(qb.get_string())
    }

    /// Updates the row identified by the filter, or by the primary field when there is no filter.
    ///
    /// The filter parameters are prefixed with `_` so that they never collide
    /// with the ones of the SET clause.
    fn create_update(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_identity(args)?;
        let setting = self.db_setting();
        let predicate = match args.filter.filter(|f| !f.is_empty()) {
            Some(filter) => filter.render(setting, "_", None).0,
            None => match args.primary {
                Some(primary) => qualifiers_predicate(&[primary.as_field()], setting, None),
                None => {
                    return Err(Error::new(StowError::KeyFieldNotFound(
                        args.table_name.to_string(),
                    )));
                }
            },
        };
        let fields = updatable_fields(args, &[]);
        if fields.is_empty() {
            return Err(no_updatable_fields(args));
        }
        let mut qb = QueryBuilder::new();
        qb.update().table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.set()
            .fields_and_parameters_from(&fields, setting, None)
            .write_text("WHERE")
            .write_text(predicate)
            .end();
        Ok(qb.get_string())
    }

    fn create_update_all(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_identity(args)?;
        let qualifiers = resolve_qualifiers(args)?;
        let fields = updatable_fields(args, &qualifiers);
        if fields.is_empty() {
            return Err(no_updatable_fields(args));
        }
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        for index in args.rows() {
            qb.update().table_name_from(args.table_name, setting);
            self.write_hints(&mut qb, args.hints);
            qb.set()
                .fields_and_parameters_from(&fields, setting, index)
                .where_qualifiers(&qualifiers, setting, index)
                .end();
        }
        Ok(qb.get_string())
    }

    /// Upsert of a single row, emulated with an update followed by a conditional insert.
    fn write_merge(
        &self,
        qb: &mut QueryBuilder,
        args: &StatementArgs,
        index: Option<usize>,
    ) -> Result<()> {
        let setting = self.db_setting();
        if !setting.is_use_upsert {
            return Err(Error::new(StowError::InvalidOperation(format!(
                "The dialect `{}` does not support merge",
                setting.name
            ))));
        }
        let qualifiers = resolve_qualifiers(args)?;
        let updatable = updatable_fields(args, &qualifiers);
        let insertable = insertable_fields(args);
        let predicate = qualifiers_predicate(&qualifiers, setting, index);
        let table = setting.quote(args.table_name);
        if !updatable.is_empty() {
            qb.update()
                .write_text(&table)
                .set()
                .fields_and_parameters_from(&updatable, setting, index)
                .write_text("WHERE")
                .write_text(&predicate)
                .end();
        }
        qb.insert()
            .into()
            .write_text(&table)
            .open_paren()
            .fields_from(&insertable, setting)
            .close_paren()
            .select()
            .parameters_from(&insertable, setting, index)
            .write_text("WHERE NOT EXISTS")
            .open_paren()
            .select()
            .write_text("1")
            .from()
            .write_text(&table)
            .write_text("WHERE")
            .write_text(&predicate)
            .close_paren()
            .end();
        let key = args
            .key_column_return_behavior
            .key_field(args.primary, args.identity);
        if let Some(key) = key {
            let lookup = format!(
                "(SELECT {} FROM {} WHERE {})",
                setting.quote(&key.name),
                table,
                predicate
            );
            let result = match args.identity {
                Some(identity) => {
                    format!("COALESCE({lookup}, {})", self.identity_expression(identity))
                }
                None => lookup,
            };
            qb.select()
                .write_text(result)
                .as_()
                .write_text(setting.quote("Result"))
                .order_column(index, setting)
                .end();
        }
        Ok(())
    }

    fn create_merge(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_identity(args)?;
        let mut qb = QueryBuilder::new();
        self.write_merge(&mut qb, args, None)?;
        Ok(qb.get_string())
    }

    fn create_merge_all(&self, args: &StatementArgs) -> Result<String> {
        validate_fields(args)?;
        validate_identity(args)?;
        let mut qb = QueryBuilder::new();
        for index in args.rows() {
            self.write_merge(&mut qb, args, index)?;
        }
        Ok(qb.get_string())
    }

    fn create_delete(&self, args: &StatementArgs) -> Result<String> {
        validate_table(args)?;
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.delete()
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.where_(args.filter, setting, "", None).end();
        Ok(qb.get_string())
    }

    fn create_delete_all(&self, args: &StatementArgs) -> Result<String> {
        validate_table(args)?;
        let setting = self.db_setting();
        let mut qb = QueryBuilder::new();
        qb.delete()
            .from()
            .table_name_from(args.table_name, setting);
        self.write_hints(&mut qb, args.hints);
        qb.end();
        Ok(qb.get_string())
    }

    fn create_truncate(&self, args: &StatementArgs) -> Result<String> {
        validate_table(args)?;
        let mut qb = QueryBuilder::new();
        qb.truncate()
            .table_name_from(args.table_name, self.db_setting())
            .end();
        Ok(qb.get_string())
    }
}

/// Shared checks, exposed for dialects that override whole statements.
pub mod checks {
    use super::*;

    pub fn fields(args: &StatementArgs) -> Result<()> {
        validate_fields(args)
    }

    pub fn identity(args: &StatementArgs) -> Result<()> {
        validate_identity(args)
    }

    pub fn qualifiers(args: &StatementArgs) -> Result<Vec<Field>> {
        resolve_qualifiers(args)
    }

    pub fn insertable(args: &StatementArgs) -> Vec<Field> {
        insertable_fields(args)
    }

    pub fn updatable(args: &StatementArgs, qualifiers: &[Field]) -> Vec<Field> {
        updatable_fields(args, qualifiers)
    }

    pub fn no_updatable(args: &StatementArgs) -> Error {
        no_updatable_fields(args)
    }

    pub fn rows(args: &StatementArgs) -> Vec<Option<usize>> {
        args.rows()
    }
}
