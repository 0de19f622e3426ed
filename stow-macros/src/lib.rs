mod decode_column;
mod decode_expression;
mod decode_table;
mod entity_trait;

use decode_expression::decode_expression;
use decode_table::decode_table;
use entity_trait::entity_trait;
use proc_macro::TokenStream;
use syn::{Expr, ItemStruct, parse_macro_input};

/// Implements `stow::Entity`.
///
/// ```rust,ignore
/// #[derive(Entity, Default)]
/// #[stow(table = "[dbo].[People]")]
/// struct Person {
///     #[stow(primary, identity)]
///     id: i64,
///     #[stow(column = "FullName")]
///     name: String,
///     #[stow(enumeration)]
///     gender: Gender,
///     #[stow(ignore)]
///     cached: Option<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(stow))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let table = decode_table(item);
    entity_trait(&table).into()
}

/// Typed predicate over the properties of an entity, it evaluates to a `stow::Expr`.
///
/// Properties are written as `Entity::field`, everything else is evaluated
/// in place and captured as a value.
///
/// ```rust,ignore
/// let min = 18;
/// let filter = expr!(Person::age >= min && Person::name.starts_with("A"));
/// ```
#[proc_macro]
pub fn expr(input: TokenStream) -> TokenStream {
    let expr = parse_macro_input!(input as Expr);
    decode_expression(&expr).into()
}
