use crate::{
    ClassProperty, DbSetting, DbValidator, Entity, Error, Result, StatementBuilder, StowError,
    Value,
};
use dashmap::{DashMap, mapref::entry::Entry};
use std::{any::TypeId, fmt::Debug, hash::Hash, marker::PhantomData, sync::Arc};

/// Custom conversion of a property value.
pub trait PropertyHandler: Send + Sync {
    /// Database value into property value, applied when reading rows.
    fn get(&self, value: Value, _property: &ClassProperty) -> Result<Value> {
        Ok(value)
    }
    /// Property value into parameter value, applied when binding.
    fn set(&self, value: Value, _property: &ClassProperty) -> Result<Value> {
        Ok(value)
    }
}

/// Concurrent add-once lookup table.
///
/// A second `add` for the same key fails unless `force` is passed.
pub struct Mapper<K, V> {
    items: DashMap<K, V>,
    conflict: fn(String) -> StowError,
}

impl<K: Eq + Hash + Debug, V: Clone> Mapper<K, V> {
    pub fn new(conflict: fn(String) -> StowError) -> Self {
        Self {
            items: DashMap::new(),
            conflict,
        }
    }

    pub fn add(&self, key: K, value: V, force: bool) -> Result<()> {
        match self.items.entry(key) {
            Entry::Occupied(mut entry) => {
                if !force {
                    let error = (self.conflict)(format!("{:?}", entry.key()));
                    log::error!("{error}");
                    return Err(Error::new(error));
                }
                entry.insert(value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.items.get(key).map(|v| v.value().clone())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.items.remove(key).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Every mapping table, passed around explicitly instead of living in statics.
///
/// Dialect keyed tables use [`DbSetting::name`] as key.
pub struct Registry {
    /// Entity type to table name.
    pub class: Mapper<TypeId, String>,
    /// (entity type, property name) to column name.
    pub property: Mapper<(TypeId, &'static str), String>,
    pub primary: Mapper<TypeId, &'static str>,
    pub identity: Mapper<TypeId, &'static str>,
    pub property_handler: Mapper<(TypeId, &'static str), Arc<dyn PropertyHandler>>,
    /// Property type to handler, used when no property handler is registered.
    pub type_handler: Mapper<TypeId, Arc<dyn PropertyHandler>>,
    /// Property type to database type name.
    pub type_map: Mapper<TypeId, String>,
    pub db_setting: Mapper<&'static str, Arc<DbSetting>>,
    pub statement_builder: Mapper<&'static str, Arc<dyn StatementBuilder>>,
    pub db_validator: Mapper<&'static str, Arc<dyn DbValidator>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            class: Mapper::new(StowError::MappingExists),
            property: Mapper::new(StowError::MappingExists),
            primary: Mapper::new(StowError::MappingExists),
            identity: Mapper::new(StowError::MappingExists),
            property_handler: Mapper::new(StowError::MappingExists),
            type_handler: Mapper::new(StowError::MappingExists),
            type_map: Mapper::new(StowError::DuplicateTypeMap),
            db_setting: Mapper::new(StowError::MappingExists),
            statement_builder: Mapper::new(StowError::MappingExists),
            db_validator: Mapper::new(StowError::MappingExists),
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Maps the Rust type `T` to a database type name.
    pub fn map_type<T: 'static>(&self, database_type: impl Into<String>, force: bool) -> Result<()> {
        self.type_map
            .add(TypeId::of::<T>(), database_type.into(), force)
    }

    pub fn clear(&self) {
        self.class.clear();
        self.property.clear();
        self.primary.clear();
        self.identity.clear();
        self.property_handler.clear();
        self.type_handler.clear();
        self.type_map.clear();
        self.db_setting.clear();
        self.statement_builder.clear();
        self.db_validator.clear();
    }
}

/// Declarative mapping of an entity, registered at startup.
///
/// ```rust,ignore
/// EntityMap::<Person>::new()
///     .table("[dbo].[People]")
///     .column("name", "FullName")
///     .primary("id")
///     .apply(stow.registry(), false)?;
/// ```
pub struct EntityMap<E: Entity> {
    table: Option<String>,
    columns: Vec<(&'static str, String)>,
    primary: Option<&'static str>,
    identity: Option<&'static str>,
    handlers: Vec<(&'static str, Arc<dyn PropertyHandler>)>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for EntityMap<E> {
    fn default() -> Self {
        Self {
            table: None,
            columns: Vec::new(),
            primary: None,
            identity: None,
            handlers: Vec::new(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityMap<E> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(name.into());
        self
    }

    pub fn column(mut self, property: &'static str, column: impl Into<String>) -> Self {
        self.columns.push((property, column.into()));
        self
    }

    pub fn primary(mut self, property: &'static str) -> Self {
        self.primary = Some(property);
        self
    }

    pub fn identity(mut self, property: &'static str) -> Self {
        self.identity = Some(property);
        self
    }

    pub fn handler(mut self, property: &'static str, handler: impl PropertyHandler + 'static) -> Self {
        self.handlers.push((property, Arc::new(handler)));
        self
    }

    /// Writes the mapping into `registry`, every property name is checked first.
    pub fn apply(self, registry: &Registry, force: bool) -> Result<()> {
        let entity = TypeId::of::<E>();
        let names = self
            .columns
            .iter()
            .map(|(p, _)| *p)
            .chain(self.primary)
            .chain(self.identity)
            .chain(self.handlers.iter().map(|(p, _)| *p));
        for name in names {
            if !E::properties().iter().any(|p| p.name == name) {
                return Err(Error::new(StowError::PropertyNotFound {
                    entity: std::any::type_name::<E>().into(),
                    property: name.into(),
                }));
            }
        }
        if let Some(table) = self.table {
            registry.class.add(entity, table, force)?;
        }
        for (property, column) in self.columns {
            registry.property.add((entity, property), column, force)?;
        }
        if let Some(primary) = self.primary {
            registry.primary.add(entity, primary, force)?;
        }
        if let Some(identity) = self.identity {
            registry.identity.add(entity, identity, force)?;
        }
        for (property, handler) in self.handlers {
            registry.property_handler.add((entity, property), handler, force)?;
        }
        Ok(())
    }
}
