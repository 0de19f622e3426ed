use crate::{MssqlDbHelper, MssqlStatementBuilder};
use std::sync::Arc;
use stow_core::{DbSetting, Driver};

pub static MSSQL_SETTING: DbSetting = DbSetting {
    name: MssqlDriver::NAME,
    opening_quote: "[",
    closing_quote: "]",
    parameter_prefix: "@",
    schema_separator: ".",
    default_schema: Some("dbo"),
    is_use_upsert: false,
    is_multi_statement_executable: true,
    averageable_type: "FLOAT",
};

#[derive(Default, Debug, Clone, Copy)]
pub struct MssqlDriver;

impl MssqlDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for MssqlDriver {
    type StatementBuilder = MssqlStatementBuilder;
    type DbHelper = MssqlDbHelper;

    const NAME: &'static str = "mssql";

    fn db_setting(&self) -> &DbSetting {
        &MSSQL_SETTING
    }

    fn statement_builder(&self, setting: Arc<DbSetting>) -> MssqlStatementBuilder {
        MssqlStatementBuilder::new(setting)
    }

    fn db_helper(&self) -> &MssqlDbHelper {
        &MssqlDbHelper
    }
}
