use stow_core::{
    Command, DbField, DbHelper, DbSetting, Parameter, Result, RowLabeled, Value, catalog_field,
};

const FIELDS_QUERY: &str = r#"
SELECT C.COLUMN_NAME AS [ColumnName],
    CONVERT(BIT, COALESCE(P.IsPrimary, 0)) AS [IsPrimary],
    CONVERT(BIT, COALESCE(COLUMNPROPERTY(OBJECT_ID(QUOTENAME(C.TABLE_SCHEMA) + '.' + QUOTENAME(C.TABLE_NAME)), C.COLUMN_NAME, 'IsIdentity'), 0)) AS [IsIdentity],
    CONVERT(BIT, IIF(C.IS_NULLABLE = 'YES', 1, 0)) AS [IsNullable],
    C.DATA_TYPE AS [DataType],
    C.CHARACTER_MAXIMUM_LENGTH AS [Size],
    C.NUMERIC_PRECISION AS [Precision],
    C.NUMERIC_SCALE AS [Scale],
    CONVERT(BIT, IIF(C.COLUMN_DEFAULT IS NULL, 0, 1)) AS [HasDefaultValue]
FROM INFORMATION_SCHEMA.COLUMNS C
OUTER APPLY (
    SELECT TOP (1) 1 AS IsPrimary
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS TC
    INNER JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE K
        ON K.CONSTRAINT_NAME = TC.CONSTRAINT_NAME AND K.TABLE_SCHEMA = TC.TABLE_SCHEMA
    WHERE TC.CONSTRAINT_TYPE = 'PRIMARY KEY'
        AND K.TABLE_SCHEMA = C.TABLE_SCHEMA
        AND K.TABLE_NAME = C.TABLE_NAME
        AND K.COLUMN_NAME = C.COLUMN_NAME
) P
WHERE C.TABLE_SCHEMA = @Schema AND C.TABLE_NAME = @TableName
ORDER BY C.ORDINAL_POSITION ;
"#;

/// Reads the columns from `INFORMATION_SCHEMA`.
#[derive(Default, Debug, Clone, Copy)]
pub struct MssqlDbHelper;

impl DbHelper for MssqlDbHelper {
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
            "bit" => Value::Boolean(None),
            "tinyint" => Value::UInt8(None),
            "smallint" => Value::Int16(None),
            "int" => Value::Int32(None),
            "bigint" => Value::Int64(None),
            "real" => Value::Float32(None),
            "float" => Value::Float64(None),
            "decimal" | "numeric" | "money" | "smallmoney" => Value::Decimal(None),
            "binary" | "varbinary" | "image" | "rowversion" | "timestamp" => Value::Blob(None),
            "date" => Value::Date(None),
            "time" => Value::Time(None),
            "datetime" | "datetime2" | "smalldatetime" => Value::Timestamp(None),
            "datetimeoffset" => Value::TimestampWithTimezone(None),
            "uniqueidentifier" => Value::Uuid(None),
            _ => Value::Varchar(None),
        }
    }
}
