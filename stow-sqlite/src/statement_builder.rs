use std::sync::Arc;
use stow_core::{DbField, DbSetting, Result, StatementArgs, StatementBuilder};

/// SQLite statements.
///
/// Merge uses the emulated upsert of [`StatementBuilder::write_merge`], the
/// identity of a new row is read back with `last_insert_rowid()`.
#[derive(Debug, Clone)]
pub struct SqliteStatementBuilder {
    setting: Arc<DbSetting>,
}

impl SqliteStatementBuilder {
    pub fn new(setting: Arc<DbSetting>) -> Self {
        Self { setting }
    }
}

impl StatementBuilder for SqliteStatementBuilder {
    fn db_setting(&self) -> &DbSetting {
        &self.setting
    }

    fn identity_expression(&self, _identity: &DbField) -> String {
        "CAST(last_insert_rowid() AS INT)".into()
    }

    /// SQLite has no `TRUNCATE`, an unfiltered delete takes the truncate optimization.
    fn create_truncate(&self, args: &StatementArgs) -> Result<String> {
        self.create_delete_all(args)
    }
}

