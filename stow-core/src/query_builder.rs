use crate::{DbSetting, Field, OrderField, QueryGroup, separated_by};

/// Fluent accumulator of statement text.
///
/// Every token is followed by a space, [`QueryBuilder::get_string`] trims
/// the result.
#[derive(Default, Debug, Clone)]
pub struct QueryBuilder {
    buff: String,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            buff: String::with_capacity(256),
        }
    }

    pub fn clear(&mut self) -> &mut Self {
        self.buff.clear();
        self
    }

    pub fn get_string(&self) -> String {
        self.buff.trim().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.buff.trim().is_empty()
    }

    /// Appends raw text as a token.
    pub fn write_text(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            self.buff.push_str(text);
            self.buff.push(' ');
        }
        self
    }

    pub fn select(&mut self) -> &mut Self {
        self.write_text("SELECT")
    }

    pub fn from(&mut self) -> &mut Self {
        self.write_text("FROM")
    }

    pub fn insert(&mut self) -> &mut Self {
        self.write_text("INSERT")
    }

    pub fn into(&mut self) -> &mut Self {
        self.write_text("INTO")
    }

    pub fn values(&mut self) -> &mut Self {
        self.write_text("VALUES")
    }

    pub fn update(&mut self) -> &mut Self {
        self.write_text("UPDATE")
    }

    pub fn set(&mut self) -> &mut Self {
        self.write_text("SET")
    }

    pub fn delete(&mut self) -> &mut Self {
        self.write_text("DELETE")
    }

    pub fn merge(&mut self) -> &mut Self {
        self.write_text("MERGE")
    }

    pub fn truncate(&mut self) -> &mut Self {
        self.write_text("TRUNCATE TABLE")
    }

    pub fn as_(&mut self) -> &mut Self {
        self.write_text("AS")
    }

    pub fn open_paren(&mut self) -> &mut Self {
        self.write_text("(")
    }

    pub fn close_paren(&mut self) -> &mut Self {
        self.write_text(")")
    }

    pub fn comma(&mut self) -> &mut Self {
        if self.buff.ends_with(' ') {
            self.buff.pop();
        }
        self.write_text(",")
    }

    /// Statement terminator.
    pub fn end(&mut self) -> &mut Self {
        self.write_text(";")
    }

    pub fn table_name_from(&mut self, table_name: &str, setting: &DbSetting) -> &mut Self {
        self.write_text(setting.quote(table_name))
    }

    /// `[A], [B], [C]`
    pub fn fields_from(&mut self, fields: &[Field], setting: &DbSetting) -> &mut Self {
        self.fields_with(fields, |out, f| out.push_str(&setting.quote(&f.name)))
    }

    /// `@A, @B, @C`, with the batch row suffix when `index` is given.
    pub fn parameters_from(
        &mut self,
        fields: &[Field],
        setting: &DbSetting,
        index: Option<usize>,
    ) -> &mut Self {
        self.fields_with(fields, |out, f| {
            out.push_str(&parameter(setting, &f.name, "", index))
        })
    }

    /// `@A AS [A], @B AS [B]`
    pub fn parameters_as_fields_from(
        &mut self,
        fields: &[Field],
        setting: &DbSetting,
        index: Option<usize>,
    ) -> &mut Self {
        self.fields_with(fields, |out, f| {
            out.push_str(&format!(
                "{} AS {}",
                parameter(setting, &f.name, "", index),
                setting.quote(&f.name)
            ))
        })
    }

    /// `[A] = @A, [B] = @B`
    pub fn fields_and_parameters_from(
        &mut self,
        fields: &[Field],
        setting: &DbSetting,
        index: Option<usize>,
    ) -> &mut Self {
        self.fields_with(fields, |out, f| {
            out.push_str(&format!(
                "{} = {}",
                setting.quote(&f.name),
                parameter(setting, &f.name, "", index)
            ))
        })
    }

    /// `L.[A] = R.[A], L.[B] = R.[B]`
    pub fn fields_and_aliased_fields_from(
        &mut self,
        fields: &[Field],
        left: &str,
        right: &str,
        setting: &DbSetting,
    ) -> &mut Self {
        self.fields_with(fields, |out, f| {
            let name = setting.quote(&f.name);
            out.push_str(&format!("{left}.{name} = {right}.{name}"))
        })
    }

    /// Writes the fields through `f`, separated by commas.
    pub fn fields_with<F>(&mut self, fields: &[Field], f: F) -> &mut Self
    where
        F: FnMut(&mut String, &Field),
    {
        let mut out = String::new();
        separated_by(&mut out, fields.iter(), f, ", ");
        self.write_text(out)
    }

    /// `WHERE (...)` when the group renders to something.
    pub fn where_(
        &mut self,
        group: Option<&QueryGroup>,
        setting: &DbSetting,
        prefix: &str,
        index: Option<usize>,
    ) -> &mut Self {
        if let Some(group) = group.filter(|g| !g.is_empty()) {
            let (text, _) = group.render(setting, prefix, index);
            self.write_text("WHERE").write_text(text);
        }
        self
    }

    /// `WHERE ([A] = @A AND [B] = @B)`, matching every qualifier with its parameter.
    pub fn where_qualifiers(
        &mut self,
        qualifiers: &[Field],
        setting: &DbSetting,
        index: Option<usize>,
    ) -> &mut Self {
        self.write_text("WHERE");
        self.write_text(qualifiers_predicate(qualifiers, setting, index))
    }

    pub fn order_by(&mut self, order_by: &[OrderField], setting: &DbSetting) -> &mut Self {
        if order_by.is_empty() {
            return self;
        }
        let mut out = String::new();
        separated_by(
            &mut out,
            order_by.iter(),
            |out, o| {
                out.push_str(&setting.quote(&o.field.name));
                out.push(' ');
                out.push_str(o.order.text());
            },
            ", ",
        );
        self.write_text("ORDER BY").write_text(out)
    }

    pub fn top(&mut self, top: Option<u64>) -> &mut Self {
        match top {
            Some(top) if top > 0 => self.write_text(format!("TOP ({top})")),
            _ => self,
        }
    }

    pub fn limit(&mut self, rows: Option<u64>) -> &mut Self {
        match rows {
            Some(rows) if rows > 0 => self.write_text(format!("LIMIT {rows}")),
            _ => self,
        }
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.write_text(format!("OFFSET {offset}"))
    }

    /// `WITH (hints)`
    pub fn hints(&mut self, hints: Option<&str>) -> &mut Self {
        match hints.map(str::trim).filter(|h| !h.is_empty()) {
            Some(hints) if hints.to_ascii_uppercase().starts_with("WITH") => self.write_text(hints),
            Some(hints) => self.write_text(format!("WITH ({hints})")),
            None => self,
        }
    }

    /// `, <i> AS [OrderColumn]` for batched statements.
    pub fn order_column(&mut self, index: Option<usize>, setting: &DbSetting) -> &mut Self {
        if let Some(i) = index {
            self.comma()
                .write_text(format!("{i} AS {}", setting.quote("OrderColumn")));
        }
        self
    }
}

/// Parameter reference: prefix, unquoted name, then the batch row suffix.
pub fn parameter(setting: &DbSetting, name: &str, prefix: &str, index: Option<usize>) -> String {
    let mut result = format!(
        "{}{}{}",
        setting.parameter_prefix,
        prefix,
        setting.parameter_name(name)
    );
    if let Some(i) = index {
        result.push_str(&format!("_{i}"));
    }
    result
}

/// `([A] = @A AND [B] = @B)`
pub fn qualifiers_predicate(qualifiers: &[Field], setting: &DbSetting, index: Option<usize>) -> String {
    let mut out = String::from("(");
    separated_by(
        &mut out,
        qualifiers.iter(),
        |out, q| {
            out.push_str(&format!(
                "{} = {}",
                setting.quote(&q.name),
                parameter(setting, &q.name, "", index)
            ))
        },
        " AND ",
    );
    out.push(')');
    out
}
