use std::sync::Arc;
use stow_core::{
    DbField, DbSetting, Field, QueryBuilder, Result, StatementArgs, StatementBuilder, checks,
};

#[derive(Debug, Clone)]
pub struct MysqlStatementBuilder {
    setting: Arc<DbSetting>,
}

impl MysqlStatementBuilder {
    pub fn new(setting: Arc<DbSetting>) -> Self {
        Self { setting }
    }
}

impl StatementBuilder for MysqlStatementBuilder {
    fn db_setting(&self) -> &DbSetting {
        &self.setting
    }

    fn identity_expression(&self, _identity: &DbField) -> String {
        "LAST_INSERT_ID()".into()
    }

    fn write_paging(&self, qb: &mut QueryBuilder, page: u64, rows: u64) {
        qb.write_text(format!("LIMIT {}, {rows}", page * rows));
    }

    /// `INSERT ... ON DUPLICATE KEY UPDATE`.
    ///
    /// Conflicts are detected by the unique keys of the table, qualifiers other
    /// than those keys have no effect. The identity is reassigned through
    /// `LAST_INSERT_ID(expr)` so that an update also reports the existing key.
    fn write_merge(
        &self,
        qb: &mut QueryBuilder,
        args: &StatementArgs,
        index: Option<usize>,
    ) -> Result<()> {
        let setting = self.db_setting();
        let qualifiers = checks::qualifiers(args)?;
        if !args.qualifiers.is_empty() {
            log::debug!(
                "Conflicts on `{}` are detected by its unique keys, not by the qualifiers",
                args.table_name
            );
        }
        let is_identity = |f: &Field| args.identity.is_some_and(|i| i.is_named(&f.name));
        let fields: Vec<Field> = args
            .fields
            .iter()
            .filter(|f| qualifiers.contains(*f) || !is_identity(*f))
            .cloned()
            .collect();
        let mut updatable = checks::updatable(args, &qualifiers);
        if updatable.is_empty() && args.identity.is_none() {
            updatable.extend(qualifiers.first().cloned());
        }
        let mut assignments = Vec::with_capacity(updatable.len() + 1);
        if let Some(identity) = args.identity {
            let name = setting.quote(&identity.name);
            assignments.push(format!("{name} = LAST_INSERT_ID({name})"));
        }
        assignments.extend(updatable.iter().map(|f| {
            let name = setting.quote(&f.name);
            format!("{name} = VALUES({name})")
        }));
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
            .write_text("ON DUPLICATE KEY UPDATE")
            .write_text(assignments.join(", "));
        let key = self.key_expression(args, index)?;
        self.write_key_return(qb, key.as_deref(), index);
        Ok(())
    }
}
