use std::sync::Arc;
use stow_core::{
    DbField, DbSetting, Field, QueryBuilder, Result, StatementArgs, StatementBuilder, checks,
};

/// PostgreSQL statements, keys come back through `RETURNING`.
#[derive(Debug, Clone)]
pub struct PostgresStatementBuilder {
    setting: Arc<DbSetting>,
}

impl PostgresStatementBuilder {
    pub fn new(setting: Arc<DbSetting>) -> Self {
        Self { setting }
    }
}

impl StatementBuilder for PostgresStatementBuilder {
    fn db_setting(&self) -> &DbSetting {
        &self.setting
    }

    fn identity_expression(&self, identity: &DbField) -> String {
        self.setting.quote(&identity.name)
    }

    fn primary_expression(&self, primary: &DbField, _index: Option<usize>) -> String {
        self.setting.quote(&primary.name)
    }

    fn write_key_return(&self, qb: &mut QueryBuilder, key: Option<&str>, index: Option<usize>) {
        let setting = self.db_setting();
        if let Some(key) = key {
            qb.write_text("RETURNING")
                .write_text(key)
                .as_()
                .write_text(setting.quote("Result"))
                .order_column(index, setting);
        }
        qb.end();
    }

    /// `INSERT ... ON CONFLICT (qualifiers) DO UPDATE`.
    ///
    /// The identity is only written when it is one of the qualifiers.
    fn write_merge(
        &self,
        qb: &mut QueryBuilder,
        args: &StatementArgs,
        index: Option<usize>,
    ) -> Result<()> {
        let setting = self.db_setting();
        let qualifiers = checks::qualifiers(args)?;
        let fields: Vec<Field> = args
            .fields
            .iter()
            .filter(|f| {
                qualifiers.contains(*f) || !args.identity.is_some_and(|i| i.is_named(&f.name))
            })
            .cloned()
            .collect();
        let mut updatable = checks::updatable(args, &qualifiers);
        if updatable.is_empty() {
            // keeps RETURNING producing a row on conflict
            updatable.extend(qualifiers.first().cloned());
        }
        qb.insert()
            .into()
            .table_name_from(args.table_name, setting)
            .open_paren()
            .fields_from(&fields, setting)
            .close_paren()
            .values()
            .open_paren()
            .parameters_from(&fields, setting, index)
            .close_paren()
            .write_text("ON CONFLICT")
            .open_paren()
            .fields_from(&qualifiers, setting)
            .close_paren()
            .write_text("DO UPDATE")
            .set()
            .fields_with(&updatable, |out, f| {
                let name = setting.quote(&f.name);
                out.push_str(&format!("{name} = EXCLUDED.{name}"));
            });
        let key = self.key_expression(args, index)?;
        self.write_key_return(qb, key.as_deref(), index);
        Ok(())
    }
}
