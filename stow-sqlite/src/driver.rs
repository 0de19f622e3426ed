use crate::{SqliteDbHelper, SqliteStatementBuilder};
use std::sync::Arc;
use stow_core::{DbSetting, Driver};

pub static SQLITE_SETTING: DbSetting = DbSetting {
    name: SqliteDriver::NAME,
    opening_quote: "[",
    closing_quote: "]",
    parameter_prefix: "@",
    schema_separator: ".",
    default_schema: None,
    is_use_upsert: true,
    is_multi_statement_executable: false,
    averageable_type: "REAL",
};

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    type StatementBuilder = SqliteStatementBuilder;
    type DbHelper = SqliteDbHelper;

    const NAME: &'static str = "sqlite";

    fn db_setting(&self) -> &DbSetting {
        &SQLITE_SETTING
    }

    fn statement_builder(&self, setting: Arc<DbSetting>) -> SqliteStatementBuilder {
        SqliteStatementBuilder::new(setting)
    }

    fn db_helper(&self) -> &SqliteDbHelper {
        &SqliteDbHelper
    }
}
