use crate::{
    ClassProperty, DbField, DbSetting, Entity, Field, KeyColumnReturnBehavior, Parameter,
    Result, hash_of,
};
use std::{any::TypeId, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionKind {
    Insert,
    InsertAll,
    Update,
    UpdateAll,
    Merge,
    MergeAll,
}

impl ExecutionKind {
    fn is_insert(&self) -> bool {
        matches!(self, ExecutionKind::Insert | ExecutionKind::InsertAll)
    }
}

/// Property read into a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Index in the entity properties.
    pub property: usize,
    /// Parameter name before the batch row suffix.
    pub name: String,
    pub db_type: Option<String>,
}

/// Everything needed to run a write operation for one entity shape, built once and reused.
#[derive(Debug)]
pub struct ExecutionContext {
    pub kind: ExecutionKind,
    pub command_text: String,
    /// Columns written by the statement, in statement order.
    pub input_fields: Vec<DbField>,
    /// Property that receives the returned key, the one of the column picked
    /// by the key column return behavior.
    pub key_property: Option<usize>,
    pub batch_size: usize,
    pub bindings: Vec<Binding>,
    pub properties: Arc<[ClassProperty]>,
}

impl ExecutionContext {
    /// Matches every input field to its property.
    ///
    /// Inserts never bind the identity column, the database generates it.
    pub fn new(
        kind: ExecutionKind,
        command_text: String,
        input_fields: Vec<DbField>,
        properties: Arc<[ClassProperty]>,
        setting: &DbSetting,
        batch_size: usize,
    ) -> Self {
        let bindings = input_fields
            .iter()
            .filter(|f| !(kind.is_insert() && f.is_identity))
            .filter_map(|field| {
                let property = properties
                    .iter()
                    .find(|p| field.is_named(&p.column))?;
                Some(Binding {
                    property: property.index,
                    name: setting.parameter_name(&field.name),
                    db_type: property
                        .db_type
                        .clone()
                        .or_else(|| field.database_type.clone()),
                })
            })
            .collect();
        let mut result = Self {
            kind,
            command_text,
            input_fields,
            key_property: None,
            batch_size: batch_size.max(1),
            bindings,
            properties,
        };
        result.key_property = result.key_property_for(KeyColumnReturnBehavior::default());
        result
    }

    /// Routes the returned key to the property of the column selected by `behavior`.
    pub fn with_key_column_return_behavior(mut self, behavior: KeyColumnReturnBehavior) -> Self {
        self.key_property = self.key_property_for(behavior);
        self
    }

    fn key_property_for(&self, behavior: KeyColumnReturnBehavior) -> Option<usize> {
        let primary = self.input_fields.iter().find(|f| f.is_primary);
        let identity = self.input_fields.iter().find(|f| f.is_identity);
        let key = behavior.key_field(primary, identity)?;
        self.properties
            .iter()
            .find(|p| key.is_named(&p.column))
            .map(|p| p.index)
    }

    pub fn fields(&self) -> Vec<Field> {
        self.input_fields.iter().map(DbField::as_field).collect()
    }

    /// Parameters of `rows`, suffixed with the row position when the context is batched.
    pub fn bind<E: Entity>(&self, rows: &[E]) -> Result<Vec<Parameter>> {
        let mut result = Vec::with_capacity(rows.len() * self.bindings.len());
        for (i, row) in rows.iter().enumerate() {
            for binding in &self.bindings {
                let property = &self.properties[binding.property];
                let mut value = row.property_value(binding.property);
                if let Some(handler) = &property.handler {
                    value = handler.set(value, property)?;
                }
                let name = if self.batch_size > 1 {
                    format!("{}_{i}", binding.name)
                } else {
                    binding.name.clone()
                };
                result.push(Parameter {
                    name,
                    value,
                    db_type: binding.db_type.clone(),
                });
            }
        }
        Ok(result)
    }
}

/// Cache key of an execution context.
///
/// The components are combined with XOR, so the order of the fields does
/// not matter. A field that is also a qualifier cancels itself out.
pub fn execution_key<E: 'static>(
    table_name: &str,
    fields: &[Field],
    qualifiers: &[Field],
    batch_size: usize,
) -> u64 {
    let mut key = hash_of(&TypeId::of::<E>()) ^ hash_of(table_name);
    for field in fields {
        key ^= hash_of(field);
    }
    for qualifier in qualifiers {
        key ^= hash_of(qualifier);
    }
    key ^ batch_size as u64
}
