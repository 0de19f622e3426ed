use crate::DbFieldCollection;
use moka::sync::Cache;
use std::{sync::Arc, time::Duration};

/// Introspected columns per (dialect, table), expiring after a fixed time.
///
/// Empty results are never stored, an unknown table is looked up again next time.
#[derive(Clone)]
pub struct DbFieldCache {
    items: Cache<(&'static str, String), Arc<DbFieldCollection>>,
}

impl DbFieldCache {
    pub fn new(expiration_in_minutes: u64) -> Self {
        Self {
            items: Cache::builder()
                .time_to_live(Duration::from_secs(expiration_in_minutes.max(1) * 60))
                .build(),
        }
    }

    pub fn get(&self, driver: &'static str, table_name: &str) -> Option<Arc<DbFieldCollection>> {
        self.items
            .get(&(driver, table_name.to_ascii_lowercase()))
    }

    pub fn insert(
        &self,
        driver: &'static str,
        table_name: &str,
        fields: DbFieldCollection,
    ) -> Arc<DbFieldCollection> {
        let fields = Arc::new(fields);
        if !fields.is_empty() {
            self.items
                .insert((driver, table_name.to_ascii_lowercase()), fields.clone());
        }
        fields
    }

    pub fn remove(&self, driver: &'static str, table_name: &str) {
        self.items
            .invalidate(&(driver, table_name.to_ascii_lowercase()));
    }

    pub fn flush(&self) {
        self.items.invalidate_all();
        self.items.run_pending_tasks();
    }

    pub fn len(&self) -> u64 {
        self.items.run_pending_tasks();
        self.items.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DbFieldCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbFieldCache").finish_non_exhaustive()
    }
}
