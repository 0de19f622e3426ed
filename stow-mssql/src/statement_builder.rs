use std::sync::Arc;
use stow_core::{
    Aggregate, DbField, DbSetting, Field, QueryBuilder, Result, StatementArgs, StatementBuilder,
    checks, separated_by,
};

/// SQL Server statements: `TOP`, `OFFSET ... FETCH`, table hints and a native `MERGE`.
#[derive(Debug, Clone)]
pub struct MssqlStatementBuilder {
    setting: Arc<DbSetting>,
}

impl MssqlStatementBuilder {
    pub fn new(setting: Arc<DbSetting>) -> Self {
        Self { setting }
    }
}

impl StatementBuilder for MssqlStatementBuilder {
    fn db_setting(&self) -> &DbSetting {
        &self.setting
    }

    fn identity_expression(&self, identity: &DbField) -> String {
        let ty = identity
            .database_type
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| "BIGINT".into());
        format!("CONVERT({ty}, SCOPE_IDENTITY())")
    }

    fn write_top(&self, qb: &mut QueryBuilder, top: Option<u64>) {
        qb.top(top);
    }

    fn write_limit(&self, _qb: &mut QueryBuilder, _top: Option<u64>) {}

    fn write_hints(&self, qb: &mut QueryBuilder, hints: Option<&str>) {
        qb.hints(hints);
    }

    fn write_paging(&self, qb: &mut QueryBuilder, page: u64, rows: u64) {
        qb.write_text(format!(
            "OFFSET {} ROWS FETCH NEXT {rows} ROWS ONLY",
            page * rows
        ));
    }

    fn aggregate_expression(&self, aggregate: Aggregate, field: Option<&Field>) -> String {
        match aggregate {
            Aggregate::Count => "COUNT_BIG(1)".into(),
            _ => {
                let setting = self.db_setting();
                let column = field.map(|f| setting.quote(&f.name)).unwrap_or_default();
                match aggregate {
                    Aggregate::Average => {
                        format!("AVG(CONVERT({}, {column}))", setting.averageable_type)
                    }
                    Aggregate::Min => format!("MIN({column})"),
                    Aggregate::Max => format!("MAX({column})"),
                    _ => format!("SUM({column})"),
                }
            }
        }
    }

    fn write_merge(
        &self,
        qb: &mut QueryBuilder,
        args: &StatementArgs,
        index: Option<usize>,
    ) -> Result<()> {
        let setting = self.db_setting();
        let qualifiers = checks::qualifiers(args)?;
        let updatable = checks::updatable(args, &qualifiers);
        let insertable = checks::insertable(args);
        let source = |out: &mut String, f: &Field| {
            out.push_str("S.");
            out.push_str(&setting.quote(&f.name));
        };
        let mut on = String::from("(");
        separated_by(
            &mut on,
            qualifiers.iter(),
            |out, q| {
                let name = setting.quote(&q.name);
                out.push_str(&format!("S.{name} = T.{name}"));
            },
            " AND ",
        );
        on.push(')');
        qb.merge().table_name_from(args.table_name, setting);
        self.write_hints(qb, args.hints);
        qb.as_()
            .write_text("T")
            .write_text("USING")
            .open_paren()
            .select()
            .parameters_as_fields_from(args.fields, setting, index)
            .close_paren()
            .as_()
            .write_text("S")
            .write_text("ON")
            .write_text(on)
            .write_text("WHEN NOT MATCHED THEN")
            .insert();
        if insertable.is_empty() {
            qb.write_text("DEFAULT VALUES");
        } else {
            qb.open_paren()
                .fields_from(&insertable, setting)
                .close_paren()
                .values()
                .open_paren()
                .fields_with(&insertable, source)
                .close_paren();
        }
        if !updatable.is_empty() {
            qb.write_text("WHEN MATCHED THEN")
                .update()
                .set()
                .fields_and_aliased_fields_from(&updatable, "T", "S", setting);
        }
        let key = args
            .key_column_return_behavior
            .key_field(args.primary, args.identity);
        if let Some(key) = key {
            qb.write_text("OUTPUT")
                .write_text(format!("INSERTED.{}", setting.quote(&key.name)))
                .as_()
                .write_text(setting.quote("Result"))
                .order_column(index, setting);
        }
        qb.end();
        Ok(())
    }
}
