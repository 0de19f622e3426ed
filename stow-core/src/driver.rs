use crate::{DbHelper, DbSetting, StatementBuilder};
use std::sync::Arc;

/// A database dialect: its constants, statement builder and catalog helper.
pub trait Driver: Clone + Send + Sync {
    type StatementBuilder: StatementBuilder + 'static;
    type DbHelper: DbHelper;

    /// Key of the dialect in the registries, equal to [`DbSetting::name`].
    const NAME: &'static str;

    fn db_setting(&self) -> &DbSetting;
    fn statement_builder(&self, setting: Arc<DbSetting>) -> Self::StatementBuilder;
    fn db_helper(&self) -> &Self::DbHelper;
}
