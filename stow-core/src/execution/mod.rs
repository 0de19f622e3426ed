mod cache;
mod context;

pub use cache::*;
pub use context::*;
