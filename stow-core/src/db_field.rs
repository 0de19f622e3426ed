use crate::{Field, KeyColumnReturnBehavior, Value, unquote};
use std::{borrow::Cow, collections::HashMap, sync::OnceLock};

/// Live column metadata, as reported by the database catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct DbField {
    pub name: Cow<'static, str>,
    pub is_primary: bool,
    pub is_identity: bool,
    pub is_nullable: bool,
    /// Type prototype resolved from `database_type`.
    pub value: Value,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub database_type: Option<String>,
    pub has_default_value: bool,
    /// Name of the dialect that produced this field.
    pub provider: &'static str,
}

impl DbField {
    pub fn new(name: impl Into<Cow<'static, str>>, value: Value) -> Self {
        Self {
            name: name.into(),
            is_primary: false,
            is_identity: false,
            is_nullable: true,
            value,
            size: None,
            precision: None,
            scale: None,
            database_type: None,
            has_default_value: false,
            provider: "",
        }
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self.is_nullable = false;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    pub fn unquoted_name(&self) -> String {
        unquote(&self.name)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.unquoted_name().eq_ignore_ascii_case(&unquote(name))
    }

    pub fn as_field(&self) -> Field {
        Field::with_type(self.name.clone(), self.value.clone())
    }
}

impl KeyColumnReturnBehavior {
    /// The field whose value an insert or merge returns.
    pub fn key_field<'a>(
        &self,
        primary: Option<&'a DbField>,
        identity: Option<&'a DbField>,
    ) -> Option<&'a DbField> {
        match self {
            KeyColumnReturnBehavior::Primary => primary,
            KeyColumnReturnBehavior::Identity => identity,
            KeyColumnReturnBehavior::PrimaryOrElseIdentity => primary.or(identity),
            KeyColumnReturnBehavior::IdentityOrElsePrimary => identity.or(primary),
        }
    }
}

/// Ordered, immutable list of [`DbField`] with lazily built lookups.
///
/// At most one field is primary and at most one is identity, later
/// duplicates are demoted when the collection is created.
#[derive(Debug, Default)]
pub struct DbFieldCollection {
    fields: Box<[DbField]>,
    by_name: OnceLock<HashMap<String, usize>>,
    primary: OnceLock<Option<usize>>,
    identity: OnceLock<Option<usize>>,
}

impl DbFieldCollection {
    pub fn new(fields: impl IntoIterator<Item = DbField>) -> Self {
        let mut has_primary = false;
        let mut has_identity = false;
        let fields = fields
            .into_iter()
            .map(|mut field| {
                if field.is_primary {
                    if has_primary {
                        log::warn!(
                            "Column `{}` is marked primary but the table already has one, it will be treated as a regular column",
                            field.name
                        );
                        field.is_primary = false;
                    }
                    has_primary = true;
                }
                if field.is_identity {
                    if has_identity {
                        log::warn!(
                            "Column `{}` is marked identity but the table already has one, it will be treated as a regular column",
                            field.name
                        );
                        field.is_identity = false;
                    }
                    has_identity = true;
                }
                field
            })
            .collect();
        Self {
            fields,
            by_name: Default::default(),
            primary: Default::default(),
            identity: Default::default(),
        }
    }

    pub fn items(&self) -> &[DbField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Case insensitive lookup by quoted or unquoted name.
    pub fn get_by_name(&self, name: &str) -> Option<&DbField> {
        let by_name = self.by_name.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.unquoted_name().to_ascii_lowercase(), i))
                .collect()
        });
        by_name
            .get(&unquote(name).to_ascii_lowercase())
            .map(|i| &self.fields[*i])
    }

    pub fn primary(&self) -> Option<&DbField> {
        self.primary
            .get_or_init(|| self.fields.iter().position(|f| f.is_primary))
            .map(|i| &self.fields[i])
    }

    pub fn identity(&self) -> Option<&DbField> {
        self.identity
            .get_or_init(|| self.fields.iter().position(|f| f.is_identity))
            .map(|i| &self.fields[i])
    }

    pub fn as_fields(&self) -> Vec<Field> {
        self.fields.iter().map(DbField::as_field).collect()
    }
}

impl FromIterator<DbField> for DbFieldCollection {
    fn from_iter<T: IntoIterator<Item = DbField>>(iter: T) -> Self {
        Self::new(iter)
    }
}
