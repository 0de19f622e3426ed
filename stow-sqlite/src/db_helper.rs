use std::future::Future;
use stow_core::{
    Command, DbField, DbHelper, DbSetting, Error, Executor, Parameter, Result, RowLabeled,
    StowError, Value, catalog_flag, catalog_number, catalog_text,
    stream::TryStreamExt,
};

/// Reads the columns through `PRAGMA table_info`.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDbHelper;

/// `DECIMAL(18, 2)` into `("DECIMAL", [18, 2])`.
fn split_type(database_type: &str) -> (&str, Vec<u32>) {
    match database_type.split_once('(') {
        Some((name, rest)) => (
            name.trim(),
            rest.trim_end_matches(')')
                .split(',')
                .filter_map(|v| v.trim().parse().ok())
                .collect(),
        ),
        None => (database_type.trim(), Vec::new()),
    }
}

/// Column and constraint definitions of a `CREATE TABLE` statement, without comments.
fn column_definitions(sql: &str) -> Vec<String> {
    let Some(start) = sql.find('(') else {
        return Vec::new();
    };
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut chars = sql[start + 1..].chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                current.push(c);
                for q in chars.by_ref() {
                    current.push(q);
                    if q == close {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for q in chars.by_ref() {
                    if q == '\n' {
                        break;
                    }
                }
                current.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = ' ';
                for q in chars.by_ref() {
                    if previous == '*' && q == '/' {
                        break;
                    }
                    previous = q;
                }
                current.push(' ');
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' if depth == 0 => break,
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => result.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    result.push(current);
    result
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

/// The unquoted name of a definition and its uppercase remainder, quoted text dropped.
fn split_definition(definition: &str) -> (String, String) {
    let mut chars = definition.chars();
    let name: String = match definition.chars().next() {
        Some(open @ ('"' | '`' | '[')) => {
            let close = if open == '[' { ']' } else { open };
            chars.next();
            chars.by_ref().take_while(|c| *c != close).collect()
        }
        _ => chars.by_ref().take_while(|c| !c.is_whitespace()).collect(),
    };
    let mut rest = String::new();
    let mut quote = None;
    for c in chars {
        match quote {
            Some(close) if c == close => quote = None,
            Some(..) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '[' => quote = Some(']'),
                _ => rest.push(c.to_ascii_uppercase()),
            },
        }
    }
    (name, rest)
}

/// True when the definition of `column` itself carries `AUTOINCREMENT`.
fn is_autoincrement(sql: &str, column: &str) -> bool {
    column_definitions(sql)
        .iter()
        .map(|d| split_definition(d))
        .any(|(name, rest)| {
            name.eq_ignore_ascii_case(column)
                && rest
                    .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .any(|word| word == "AUTOINCREMENT")
        })
}

impl DbHelper for SqliteDbHelper {
    fn fields_command(&self, setting: &DbSetting, table_name: &str) -> Command {
        let (schema, table) = setting.split_table_name(table_name);
        let pragma = match schema {
            Some(schema) => format!("PRAGMA {}.table_info", setting.quote(&schema)),
            None => "PRAGMA table_info".into(),
        };
        Command::new(format!("{pragma}({}) ;", setting.quote(&table)), Vec::new())
    }

    fn read_field(&self, row: &RowLabeled) -> Result<DbField> {
        let Some(name) = catalog_text(row, "name") else {
            return Err(Error::new(StowError::NullReference("name".into())));
        };
        let database_type = catalog_text(row, "type").unwrap_or_default();
        let mut field = DbField::new(name, self.resolve_type(&database_type));
        field.is_primary = catalog_number(row, "pk").is_some_and(|v| v > 0);
        field.is_nullable = !catalog_flag(row, "notnull") && !field.is_primary;
        field.has_default_value = catalog_text(row, "dflt_value").is_some();
        let (_, sizes) = split_type(&database_type);
        match sizes[..] {
            [size] => field.size = Some(size),
            [precision, scale] => {
                field.precision = u8::try_from(precision).ok();
                field.scale = u8::try_from(scale).ok();
            }
            _ => {}
        }
        field.database_type = (!database_type.is_empty()).then_some(database_type);
        Ok(field)
    }

    /// Follows the affinity rules of SQLite, names it recognizes get a more precise type.
    fn resolve_type(&self, database_type: &str) -> Value {
        let name = split_type(database_type).0.to_ascii_uppercase();
        match name.as_str() {
            "BOOLEAN" | "BOOL" | "BIT" => Value::Boolean(None),
            "TINYINT" => Value::Int8(None),
            "SMALLINT" => Value::Int16(None),
            "INT" | "MEDIUMINT" => Value::Int32(None),
            "DATE" => Value::Date(None),
            "TIME" => Value::Time(None),
            "DATETIME" | "TIMESTAMP" => Value::Timestamp(None),
            "DATETIMEOFFSET" | "TIMESTAMPTZ" => Value::TimestampWithTimezone(None),
            "UUID" | "GUID" | "UNIQUEIDENTIFIER" => Value::Uuid(None),
            "DECIMAL" | "NUMERIC" | "MONEY" => Value::Decimal(None),
            _ if name.contains("INT") => Value::Int64(None),
            _ if name.contains("CHAR") || name.contains("CLOB") || name.contains("TEXT") => {
                Value::Varchar(None)
            }
            _ if name.is_empty() || name.contains("BLOB") => Value::Blob(None),
            _ if name.contains("REAL") || name.contains("FLOA") || name.contains("DOUB") => {
                Value::Float64(None)
            }
            _ => Value::Decimal(None),
        }
    }

    /// The catalog has no identity flag, so identity detection is a heuristic: a lone
    /// `INTEGER` primary key aliases the rowid, so does a lone primary key whose
    /// column definition carries `AUTOINCREMENT`. Composite keys have no identity.
    fn get_fields<Exec: Executor>(
        &self,
        executor: &mut Exec,
        setting: &DbSetting,
        table_name: &str,
    ) -> impl Future<Output = Result<Vec<DbField>>> + Send
    where
        Self: Sized,
    {
        let (_, table) = setting.split_table_name(table_name);
        let pragma = self.fields_command(setting, table_name);
        let master = Command::new(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = @TableName ;",
            vec![Parameter::new("TableName", Value::Varchar(Some(table)))],
        );
        let provider = setting.name;
        async move {
            let rows: Vec<RowLabeled> = executor.fetch(pragma).try_collect().await?;
            let mut fields = rows
                .iter()
                .map(|row| self.read_field(row))
                .collect::<Result<Vec<_>>>()?;
            if fields.is_empty() {
                return Ok(fields);
            }
            let primaries: Vec<usize> = fields
                .iter()
                .enumerate()
                .filter_map(|(i, f)| f.is_primary.then_some(i))
                .collect();
            if let [index] = primaries[..] {
                let definition = match executor.execute_scalar(master).await? {
                    Value::Varchar(Some(sql)) => sql,
                    _ => String::new(),
                };
                let field = &mut fields[index];
                let integer = field
                    .database_type
                    .as_deref()
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("INTEGER"));
                if integer || is_autoincrement(&definition, &field.name) {
                    log::debug!("`{}` of `{}` aliases the rowid", field.name, table_name);
                    field.is_identity = true;
                }
            }
            for field in &mut fields {
                field.provider = provider;
            }
            Ok(fields)
        }
    }
}
