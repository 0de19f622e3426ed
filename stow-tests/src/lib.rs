mod aggregates;
mod batch;
mod crud;
mod keys;
mod merge;
mod mock;
mod person;
mod repository;
mod trace;

pub use mock::*;
pub use person::*;

use crate::{
    aggregates::aggregates, batch::batch, crud::crud, keys::keys, merge::merge, repository::repository,
    trace::trace,
};
use log::LevelFilter;
use std::env;
use stow::Driver;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every behavioral scenario against the statements of `D`, answered by [`MockConnection`].
pub async fn execute_tests<D: Driver + Default + 'static>() {
    crud::<D>().await;
    keys::<D>().await;
    aggregates::<D>().await;
    batch::<D>().await;
    merge::<D>().await;
    trace::<D>().await;
    repository::<D>().await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
