use crate::{PostgresDbHelper, PostgresStatementBuilder};
use std::sync::Arc;
use stow_core::{DbSetting, Driver};

pub static POSTGRES_SETTING: DbSetting = DbSetting {
    name: PostgresDriver::NAME,
    opening_quote: "\"",
    closing_quote: "\"",
    parameter_prefix: "@",
    schema_separator: ".",
    default_schema: Some("public"),
    is_use_upsert: false,
    is_multi_statement_executable: true,
    averageable_type: "DOUBLE PRECISION",
};

#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresDriver;

impl PostgresDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for PostgresDriver {
    type StatementBuilder = PostgresStatementBuilder;
    type DbHelper = PostgresDbHelper;

    const NAME: &'static str = "postgresql";

    fn db_setting(&self) -> &DbSetting {
        &POSTGRES_SETTING
    }

    fn statement_builder(&self, setting: Arc<DbSetting>) -> PostgresStatementBuilder {
        PostgresStatementBuilder::new(setting)
    }

    fn db_helper(&self) -> &PostgresDbHelper {
        &PostgresDbHelper
    }
}
