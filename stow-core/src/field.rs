use crate::Value;
use std::{
    borrow::Cow,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

/// Removes the quote characters of every dialect around `name` and around
/// each of its schema separated parts.
pub fn unquote(name: &str) -> String {
    name.split('.')
        .map(|part| {
            part.trim()
                .trim_start_matches(['[', '"', '`'])
                .trim_end_matches([']', '"', '`'])
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// A column or property reference, optionally carrying its type prototype.
///
/// Two fields are equal when their unquoted names match ignoring the case.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Cow<'static, str>,
    pub value: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_type(name: impl Into<Cow<'static, str>>, value: Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    pub fn from_names<S: Into<Cow<'static, str>>>(names: impl IntoIterator<Item = S>) -> Vec<Field> {
        names.into_iter().map(Field::new).collect()
    }

    pub fn unquoted_name(&self) -> String {
        unquote(&self.name)
    }

    /// Lowercase unquoted name, the identity of a field.
    pub fn normalized_name(&self) -> String {
        self.unquoted_name().to_ascii_lowercase()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.unquoted_name().eq_ignore_ascii_case(&unquote(name))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.is_named(&other.name)
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized_name().hash(state);
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&'static str> for Field {
    fn from(value: &'static str) -> Self {
        Field::new(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::new(value)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
}

impl Order {
    pub fn text(&self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }
}

/// A field used in ORDER BY and paging clauses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderField {
    pub field: Field,
    pub order: Order,
}

impl OrderField {
    pub fn new(name: impl Into<Cow<'static, str>>, order: Order) -> Self {
        Self {
            field: Field::new(name),
            order,
        }
    }

    pub fn ascending(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, Order::Ascending)
    }

    pub fn descending(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(name, Order::Descending)
    }
}
