mod db_helper;
mod driver;
mod statement_builder;

pub use db_helper::*;
pub use driver::*;
pub use statement_builder::*;
