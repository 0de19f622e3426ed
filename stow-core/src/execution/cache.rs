use crate::{ExecutionContext, ExecutionKind, Result};
use dashmap::DashMap;
use std::{future::Future, sync::Arc};

type Key = (ExecutionKind, &'static str, u64);

/// Execution contexts per (kind, dialect, shape key).
///
/// Additive only: a built context is never replaced. When two callers build
/// the same context concurrently the first one stored wins and both use it.
#[derive(Default, Debug)]
pub struct ExecutionContextCache {
    items: DashMap<Key, Arc<ExecutionContext>>,
}

impl ExecutionContextCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, kind: ExecutionKind, driver: &'static str, key: u64) -> Option<Arc<ExecutionContext>> {
        self.items
            .get(&(kind, driver, key))
            .map(|v| v.value().clone())
    }

    /// Returns the cached context or builds it, no lock is held while `build` runs.
    pub async fn get_or_build<F, Fut>(
        &self,
        kind: ExecutionKind,
        driver: &'static str,
        key: u64,
        build: F,
    ) -> Result<Arc<ExecutionContext>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ExecutionContext>>,
    {
        if let Some(found) = self.get(kind, driver, key) {
            return Ok(found);
        }
        log::debug!("Building the {kind:?} execution context {key:x} for {driver}");
        let built = Arc::new(build().await?);
        Ok(self
            .items
            .entry((kind, driver, key))
            .or_insert(built)
            .value()
            .clone())
    }

    pub fn flush(&self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
