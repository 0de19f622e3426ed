//! Typed entity operations rendered into dialect specific SQL.
//!
//! ```rust,ignore
//! use stow::{ConnectionPersistency, DbRepository, Entity, expr};
//!
//! #[derive(Entity, Default)]
//! #[stow(table = "Person")]
//! struct Person {
//!     #[stow(column = "Id", primary, identity)]
//!     id: i64,
//!     #[stow(column = "Name")]
//!     name: String,
//! }
//!
//! let repository = DbRepository::<MyConnection>::new(url, ConnectionPersistency::Instance);
//! let people = repository
//!     .query::<Person>(expr!(Person::name.starts_with("A")), &[], None, None)
//!     .await?;
//! ```
pub use stow_core::*;
pub use stow_macros::*;
