use std::{collections::BTreeMap, sync::Arc};

use super::{
    compose_base, define_entity, from_row, resolve_fields, to_row, Entity, EntitySchema, FieldDef,
    FieldSpec, MappingError, Row,
};

/// Immutable, process-wide schema table keyed by entity name. Built once at
/// startup and shared read-only.
#[derive(Debug)]
pub struct SchemaRegistry {
    base: Vec<FieldDef>,
    schemas: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    pub fn builder(base: &[FieldSpec]) -> Result<SchemaRegistryBuilder, MappingError> {
        Ok(SchemaRegistryBuilder {
            base: resolve_fields("base", base)?,
            schemas: BTreeMap::new(),
        })
    }

    pub fn base_fields(&self) -> &[FieldDef] {
        &self.base
    }

    pub fn schema(&self, table: &str) -> Result<&Arc<EntitySchema>, MappingError> {
        self.schemas
            .get(table)
            .ok_or_else(|| MappingError::UnknownEntity {
                table: table.to_string(),
            })
    }

    pub fn schema_of<E: Entity>(&self) -> Result<&Arc<EntitySchema>, MappingError> {
        self.schema(E::TABLE)
    }

    /// Registered schemas, ordered by table name.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.schemas.values()
    }

    pub fn to_row<E: Entity>(&self, entity: &E) -> Result<Row, MappingError> {
        to_row(self.schema_of::<E>()?, entity)
    }

    pub fn from_row<E: Entity>(&self, row: &Row) -> Result<E, MappingError> {
        from_row(self.schema_of::<E>()?, row)
    }
}

pub struct SchemaRegistryBuilder {
    base: Vec<FieldDef>,
    schemas: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistryBuilder {
    pub fn register<E: Entity>(self) -> Result<Self, MappingError> {
        self.define(E::TABLE, &E::fields())
    }

    pub fn define(mut self, table: &str, fields: &[FieldSpec]) -> Result<Self, MappingError> {
        if self.schemas.contains_key(table) {
            return Err(MappingError::DuplicateMapping {
                table: table.to_string(),
                name: table.to_string(),
            });
        }
        let schema = compose_base(define_entity(table, fields)?, &self.base)?;
        self.schemas.insert(table.to_string(), Arc::new(schema));
        Ok(self)
    }

    pub fn build(self) -> Arc<SchemaRegistry> {
        tracing::info!(
            entities = self.schemas.len(),
            base_fields = self.base.len(),
            "schema registry built"
        );
        Arc::new(SchemaRegistry {
            base: self.base,
            schemas: self.schemas,
        })
    }
}
