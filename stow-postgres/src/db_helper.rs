use stow_core::{
    Command, DbField, DbHelper, DbSetting, Parameter, Result, RowLabeled, Value, catalog_field,
};

const FIELDS_QUERY: &str = r#"
SELECT C.column_name AS "ColumnName",
    EXISTS (
        SELECT 1
        FROM information_schema.table_constraints TC
        INNER JOIN information_schema.key_column_usage K
            ON K.constraint_name = TC.constraint_name AND K.table_schema = TC.table_schema
        WHERE TC.constraint_type = 'PRIMARY KEY'
            AND K.table_schema = C.table_schema
            AND K.table_name = C.table_name
            AND K.column_name = C.column_name
    ) AS "IsPrimary",
    (C.is_identity = 'YES' OR COALESCE(C.column_default, '') LIKE 'nextval(%') AS "IsIdentity",
    (C.is_nullable = 'YES') AS "IsNullable",
    C.data_type AS "DataType",
    C.character_maximum_length AS "Size",
    C.numeric_precision AS "Precision",
    C.numeric_scale AS "Scale",
    (C.column_default IS NOT NULL) AS "HasDefaultValue"
FROM information_schema.columns C
WHERE C.table_schema = @Schema AND C.table_name = @TableName
ORDER BY C.ordinal_position ;
"#;

/// Reads the columns from `information_schema`.
#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresDbHelper;

impl DbHelper for PostgresDbHelper {
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
            "boolean" | "bool" => Value::Boolean(None),
            "smallint" | "int2" | "smallserial" => Value::Int16(None),
            "integer" | "int" | "int4" | "serial" => Value::Int32(None),
            "bigint" | "int8" | "bigserial" => Value::Int64(None),
            "real" | "float4" => Value::Float32(None),
            "double precision" | "float8" => Value::Float64(None),
            "numeric" | "decimal" | "money" => Value::Decimal(None),
            "bytea" => Value::Blob(None),
            "date" => Value::Date(None),
            "time" | "time without time zone" => Value::Time(None),
            "timestamp" | "timestamp without time zone" => Value::Timestamp(None),
            "timestamptz" | "timestamp with time zone" => Value::TimestampWithTimezone(None),
            "uuid" => Value::Uuid(None),
            _ => Value::Varchar(None),
        }
    }
}
