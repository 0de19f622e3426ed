use crate::{MysqlDbHelper, MysqlStatementBuilder};
use std::sync::Arc;
use stow_core::{DbSetting, Driver};

pub static MYSQL_SETTING: DbSetting = DbSetting {
    name: MysqlDriver::NAME,
    opening_quote: "`",
    closing_quote: "`",
    parameter_prefix: "@",
    schema_separator: ".",
    default_schema: None,
    is_use_upsert: false,
    is_multi_statement_executable: true,
    averageable_type: "DOUBLE",
};

#[derive(Default, Debug, Clone, Copy)]
pub struct MysqlDriver;

impl MysqlDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for MysqlDriver {
    type StatementBuilder = MysqlStatementBuilder;
    type DbHelper = MysqlDbHelper;

    const NAME: &'static str = "mysql";

    fn db_setting(&self) -> &DbSetting {
        &MYSQL_SETTING
    }

    fn statement_builder(&self, setting: Arc<DbSetting>) -> MysqlStatementBuilder {
        MysqlStatementBuilder::new(setting)
    }

    fn db_helper(&self) -> &MysqlDbHelper {
        &MysqlDbHelper
    }
}
