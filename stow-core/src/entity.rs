use crate::{
    AsValue, ClassProperty, DbEnum, Error, GlobalConfigurationOptions, Result, RowLabeled,
    StowError, Value, convert_value, decode_enum,
};
use std::any::TypeId;

/// Static description of a property, generated by `#[derive(Entity)]`.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Rust name of the field.
    pub name: &'static str,
    /// Column name by convention or by `#[stow(column = "...")]`.
    pub column: &'static str,
    pub primary: bool,
    pub identity: bool,
    pub nullable: bool,
    /// Type prototype.
    pub value: Value,
    /// The field is a [`DbEnum`] persisted by name.
    pub enumeration: bool,
    pub type_id: TypeId,
}

/// A type mapped to a table.
///
/// Implemented by `#[derive(Entity)]`: the accessors are generated per type,
/// so binding and materialization never go through runtime reflection.
pub trait Entity: Send + Sync + Sized + 'static {
    /// Table name by convention, the registry can override it.
    fn table_name() -> &'static str;

    fn properties() -> &'static [PropertyDef];

    /// Value of the property at `index` in [`Entity::properties`].
    fn property_value(&self, index: usize) -> Value;

    /// Assigns the property at `index`, used to write generated keys back.
    fn set_property_value(
        &mut self,
        index: usize,
        value: Value,
        options: &GlobalConfigurationOptions,
    ) -> Result<()>;

    fn from_row(row: &RowReader<'_>) -> Result<Self>;
}

/// Reads the properties of an entity out of a result row.
///
/// Columns are matched ignoring the case, a missing column reads as NULL.
/// The property handler, if any, sees the raw value before conversion.
pub struct RowReader<'a> {
    row: &'a RowLabeled,
    properties: &'a [ClassProperty],
    options: &'a GlobalConfigurationOptions,
}

impl<'a> RowReader<'a> {
    pub fn new(
        row: &'a RowLabeled,
        properties: &'a [ClassProperty],
        options: &'a GlobalConfigurationOptions,
    ) -> Self {
        Self {
            row,
            properties,
            options,
        }
    }

    pub fn row(&self) -> &RowLabeled {
        self.row
    }

    fn value(&self, index: usize) -> Result<Value> {
        let Some(property) = self.properties.get(index) else {
            return Err(Error::new(StowError::PropertyNotFound {
                entity: self
                    .properties
                    .first()
                    .map(|v| v.entity.to_string())
                    .unwrap_or_default(),
                property: format!("#{index}"),
            }));
        };
        let value = self
            .row
            .get_column(&property.column)
            .cloned()
            .unwrap_or_default();
        match &property.handler {
            Some(handler) => handler.get(value, property),
            None => Ok(value),
        }
    }

    pub fn read<T: AsValue>(&self, index: usize) -> Result<T> {
        let value = self.value(index)?;
        convert_value(value, self.options.conversion_type).map_err(|e| {
            let property = &self.properties[index];
            e.context(format!(
                "While reading the column `{}` into `{}::{}`",
                property.column, property.entity, property.name
            ))
        })
    }

    pub fn read_enum<T: DbEnum>(&self, index: usize) -> Result<T> {
        let value = self.value(index)?;
        decode_enum(&value, self.options.enum_handling)
    }
}
