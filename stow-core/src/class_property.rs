use crate::{DbField, Entity, Field, PropertyHandler, Registry, Value};
use dashmap::DashMap;
use std::{
    any::{self, TypeId},
    fmt::{self, Debug},
    sync::Arc,
};

/// A property of an entity with its mapping resolved against the [`Registry`].
#[derive(Clone)]
pub struct ClassProperty {
    /// Rust type name of the entity.
    pub entity: &'static str,
    /// Position in [`Entity::properties`].
    pub index: usize,
    pub name: &'static str,
    pub column: String,
    pub is_primary: bool,
    pub is_identity: bool,
    pub is_nullable: bool,
    pub value: Value,
    pub type_id: TypeId,
    /// Database type from the type map, if the property type is mapped.
    pub db_type: Option<String>,
    pub handler: Option<Arc<dyn PropertyHandler>>,
}

impl ClassProperty {
    pub fn as_field(&self) -> Field {
        Field::with_type(self.column.clone(), self.value.clone())
    }

    /// The column as seen when the catalog does not know the table.
    pub fn as_db_field(&self) -> DbField {
        let mut field = DbField::new(self.column.clone(), self.value.clone());
        field.is_primary = self.is_primary;
        field.is_identity = self.is_identity;
        field.is_nullable = self.is_nullable;
        field.database_type = self.db_type.clone();
        field
    }
}

impl Debug for ClassProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassProperty")
            .field("entity", &self.entity)
            .field("index", &self.index)
            .field("name", &self.name)
            .field("column", &self.column)
            .field("is_primary", &self.is_primary)
            .field("is_identity", &self.is_identity)
            .field("is_nullable", &self.is_nullable)
            .field("value", &self.value)
            .field("db_type", &self.db_type)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Table name of `E`, the registry mapping wins over the declared one.
pub fn table_name_of<E: Entity>(registry: &Registry) -> String {
    registry
        .class
        .get(&TypeId::of::<E>())
        .unwrap_or_else(|| E::table_name().to_string())
}

/// Resolved properties per entity type.
///
/// Entries are built once and never modified. Changes to the registry are
/// not observed until [`PropertyCache::flush`] is called.
#[derive(Default)]
pub struct PropertyCache {
    items: DashMap<TypeId, Arc<[ClassProperty]>>,
}

impl PropertyCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get<E: Entity>(&self, registry: &Registry) -> Arc<[ClassProperty]> {
        let key = TypeId::of::<E>();
        if let Some(found) = self.items.get(&key) {
            return found.value().clone();
        }
        let built: Arc<[ClassProperty]> = resolve::<E>(registry).into();
        self.items.entry(key).or_insert(built).value().clone()
    }

    pub fn flush(&self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn resolve<E: Entity>(registry: &Registry) -> Vec<ClassProperty> {
    let entity = TypeId::of::<E>();
    let primary = registry.primary.get(&entity);
    let identity = registry.identity.get(&entity);
    E::properties()
        .iter()
        .enumerate()
        .map(|(index, def)| ClassProperty {
            entity: any::type_name::<E>(),
            index,
            name: def.name,
            column: registry
                .property
                .get(&(entity, def.name))
                .unwrap_or_else(|| def.column.to_string()),
            is_primary: primary.map_or(def.primary, |v| v == def.name),
            is_identity: identity.map_or(def.identity, |v| v == def.name),
            is_nullable: def.nullable,
            value: def.value.clone(),
            type_id: def.type_id,
            db_type: registry.type_map.get(&def.type_id),
            handler: registry
                .property_handler
                .get(&(entity, def.name))
                .or_else(|| registry.type_handler.get(&def.type_id)),
        })
        .collect()
}
