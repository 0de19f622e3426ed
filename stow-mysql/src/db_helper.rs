use stow_core::{
    Command, DbField, DbHelper, DbSetting, Parameter, Result, RowLabeled, Value, catalog_field,
};

const FIELDS_QUERY: &str = r#"
SELECT COLUMN_NAME AS `ColumnName`,
    (COLUMN_KEY = 'PRI') AS `IsPrimary`,
    (EXTRA LIKE '%auto_increment%') AS `IsIdentity`,
    (IS_NULLABLE = 'YES') AS `IsNullable`,
    DATA_TYPE AS `DataType`,
    CHARACTER_MAXIMUM_LENGTH AS `Size`,
    NUMERIC_PRECISION AS `Precision`,
    NUMERIC_SCALE AS `Scale`,
    (COLUMN_DEFAULT IS NOT NULL) AS `HasDefaultValue`
FROM INFORMATION_SCHEMA.COLUMNS
WHERE TABLE_SCHEMA = COALESCE(@Schema, DATABASE()) AND TABLE_NAME = @TableName
ORDER BY ORDINAL_POSITION ;
"#;

/// Reads the columns from `INFORMATION_SCHEMA.COLUMNS`, the schema defaults to the current database.
#[derive(Default, Debug, Clone, Copy)]
pub struct MysqlDbHelper;

impl DbHelper for MysqlDbHelper {
    fn fields_command(&self, setting: &DbSetting, table_name: &str) -> Command {
        let (schema, table) = setting.split_table_name(table_name);
        Command::new(
            FIELDS_QUERY.trim(),
            vec![
                Parameter::new("Schema", Value::Varchar(schema)),
                Parameter::new("TableName", Value::Varchar(Some(table))),
            ],
        )
    }

    fn read_field(&self, row: &RowLabeled) -> Result<DbField> {
        catalog_field(row, self)
    }

    fn resolve_type(&self, database_type: &str) -> Value {
        match database_type.trim().to_ascii_lowercase().as_str() {
            "bit" | "bool" | "boolean" => Value::Boolean(None),
            "tinyint" => Value::Int8(None),
            "smallint" | "year" => Value::Int16(None),
            "mediumint" | "int" | "integer" => Value::Int32(None),
            "bigint" => Value::Int64(None),
            "float" => Value::Float32(None),
            "double" | "real" => Value::Float64(None),
            "decimal" | "numeric" => Value::Decimal(None),
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
                Value::Blob(None)
            }
            "date" => Value::Date(None),
            "time" => Value::Time(None),
            "datetime" | "timestamp" => Value::Timestamp(None),
            _ => Value::Varchar(None),
        }
    }
}
