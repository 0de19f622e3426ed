use crate::unquote;

/// Per dialect constants used while rendering statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSetting {
    /// Identifier of the dialect, also the key of the registries.
    pub name: &'static str,
    pub opening_quote: &'static str,
    pub closing_quote: &'static str,
    pub parameter_prefix: &'static str,
    pub schema_separator: &'static str,
    pub default_schema: Option<&'static str>,
    /// Merge is rendered as an update followed by a conditional insert.
    pub is_use_upsert: bool,
    /// Several `;` separated statements can run in one round trip.
    pub is_multi_statement_executable: bool,
    /// Database type the column is cast to before computing an average.
    pub averageable_type: &'static str,
}

impl DbSetting {
    /// Quotes every schema separated part of `name`, parts already quoted are kept.
    pub fn quote(&self, name: &str) -> String {
        let mut result = String::with_capacity(name.len() + 4);
        for (i, part) in name.split(self.schema_separator).enumerate() {
            if i > 0 {
                result.push_str(self.schema_separator);
            }
            let part = part.trim();
            if part.starts_with(self.opening_quote)
                && part.ends_with(self.closing_quote)
                && part.len() > self.opening_quote.len()
            {
                result.push_str(part);
                continue;
            }
            result.push_str(self.opening_quote);
            result.push_str(&part.replace(
                self.closing_quote,
                &format!("{}{}", self.closing_quote, self.closing_quote),
            ));
            result.push_str(self.closing_quote);
        }
        result
    }

    pub fn unquote(&self, name: &str) -> String {
        unquote(name)
    }

    /// Name of the parameter bound to `name`, without the prefix.
    pub fn parameter_name(&self, name: &str) -> String {
        unquote(name)
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }

    /// Parameter reference as it appears in the statement text.
    pub fn parameter(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix, self.parameter_name(name))
    }

    /// Splits a possibly schema qualified table name, the schema defaults to
    /// [`DbSetting::default_schema`].
    pub fn split_table_name(&self, table_name: &str) -> (Option<String>, String) {
        let unquoted = unquote(table_name);
        match unquoted.rsplit_once(self.schema_separator) {
            Some((schema, table)) => (Some(schema.to_string()), table.to_string()),
            None => (self.default_schema.map(ToString::to_string), unquoted),
        }
    }
}
