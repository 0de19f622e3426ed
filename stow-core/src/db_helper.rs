use crate::{
    Command, DbField, DbSetting, Error, Executor, Result, RowLabeled, StowError, Value,
    stream::{StreamExt, TryStreamExt},
};
use std::future::Future;

/// Catalog introspection of a dialect.
pub trait DbHelper: Send + Sync {
    /// The catalog query that lists the columns of `table_name`.
    fn fields_command(&self, setting: &DbSetting, table_name: &str) -> Command;

    /// Turns a row of [`DbHelper::fields_command`] into a field.
    fn read_field(&self, row: &RowLabeled) -> Result<DbField>;

    /// Type prototype of a database type name.
    fn resolve_type(&self, database_type: &str) -> Value;

    /// Columns of `table_name` in ordinal order, empty when the table is unknown.
    fn get_fields<Exec: Executor>(
        &self,
        executor: &mut Exec,
        setting: &DbSetting,
        table_name: &str,
    ) -> impl Future<Output = Result<Vec<DbField>>> + Send
    where
        Self: Sized,
    {
        let command = self.fields_command(setting, table_name);
        let provider = setting.name;
        let stream = executor.fetch(command);
        async move {
            stream
                .map(|row| {
                    row.and_then(|row| {
                        let mut field = self.read_field(&row)?;
                        field.provider = provider;
                        Ok(field)
                    })
                })
                .try_collect()
                .await
        }
    }
}

/// Reads a text column of a catalog row.
pub fn catalog_text(row: &RowLabeled, column: &str) -> Option<String> {
    match row.get_column(column)? {
        Value::Varchar(Some(v)) => Some(v.clone()),
        Value::Null => None,
        other if other.is_null() => None,
        other => Some(other.to_string()),
    }
}

/// Reads a numeric column of a catalog row, text and booleans are accepted.
pub fn catalog_number(row: &RowLabeled, column: &str) -> Option<i64> {
    let value = row.get_column(column)?.clone();
    match value.convert_to(&Value::Int64(None)).ok()? {
        Value::Int64(v) => v,
        _ => None,
    }
}

/// Reads a flag column of a catalog row.
pub fn catalog_flag(row: &RowLabeled, column: &str) -> bool {
    match row.get_column(column) {
        Some(Value::Varchar(Some(v))) => matches!(
            v.trim().to_ascii_uppercase().as_str(),
            "YES" | "TRUE" | "1" | "Y"
        ),
        _ => catalog_number(row, column).is_some_and(|v| v != 0),
    }
}

/// Reads a row of a catalog query that uses the conventional labels: `ColumnName`,
/// `IsPrimary`, `IsIdentity`, `IsNullable`, `DataType`, `Size`, `Precision`,
/// `Scale` and `HasDefaultValue`.
pub fn catalog_field(row: &RowLabeled, helper: &impl DbHelper) -> Result<DbField> {
    let Some(name) = catalog_text(row, "ColumnName") else {
        return Err(Error::new(StowError::NullReference("ColumnName".into())));
    };
    let database_type = catalog_text(row, "DataType").unwrap_or_default();
    let mut field = DbField::new(name, helper.resolve_type(&database_type));
    field.is_primary = catalog_flag(row, "IsPrimary");
    field.is_identity = catalog_flag(row, "IsIdentity");
    field.is_nullable = catalog_flag(row, "IsNullable");
    field.size = catalog_number(row, "Size").and_then(|v| u32::try_from(v).ok());
    field.precision = catalog_number(row, "Precision").and_then(|v| u8::try_from(v).ok());
    field.scale = catalog_number(row, "Scale").and_then(|v| u8::try_from(v).ok());
    field.has_default_value = catalog_flag(row, "HasDefaultValue");
    field.database_type = (!database_type.is_empty()).then_some(database_type);
    Ok(field)
}

/// Validates an operation against the capabilities of a dialect, before the statement is built.
///
/// Every method accepts by default, a failing check returns one of the
/// `EntityNot*` errors.
pub trait DbValidator: Send + Sync {
    fn validate_query(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_batch_query(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_count(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_insert(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_update(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_merge(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_delete(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
    fn validate_truncate(&self, _table_name: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct DefaultDbValidator;

impl DbValidator for DefaultDbValidator {}
