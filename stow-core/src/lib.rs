mod as_value;
mod cache;
mod class_property;
mod config;
mod connection;
mod db_enum;
mod db_field;
mod db_helper;
mod db_setting;
mod driver;
mod entity;
mod error;
mod execution;
mod executor;
mod expression;
mod field;
mod filter;
mod mapper;
mod query;
mod query_builder;
mod query_field;
mod query_group;
mod repository;
mod statement_builder;
mod stow;
mod trace;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use cache::*;
pub use class_property::*;
pub use config::*;
pub use connection::*;
pub use db_enum::*;
pub use db_field::*;
pub use db_helper::*;
pub use db_setting::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use execution::*;
pub use executor::*;
pub use expression::*;
pub use field::*;
pub use filter::*;
pub use mapper::*;
pub use query::*;
pub use query_builder::*;
pub use query_field::*;
pub use query_group::*;
pub use repository::*;
pub use statement_builder::*;
pub use stow::*;
pub use trace::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;
pub use ::serde_json;
pub use ::tokio_util::sync::CancellationToken;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
