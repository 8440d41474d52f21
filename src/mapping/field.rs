use std::{collections::HashSet, fmt, str::FromStr};

use super::MappingError;

/// Storage encoding of a mapped column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Integer,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical type names without an encoding come back as `Err(())`;
/// [`define_entity`] turns that into [`MappingError::UnknownType`].
impl FromStr for ColumnType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "char" | "varchar" | "varchar2" | "text" | "longtext" => Ok(ColumnType::String),
            "int" | "integer" | "bigint" => Ok(ColumnType::Integer),
            "boolean" | "bool" | "tinyint" => Ok(ColumnType::Boolean),
            "datetime" | "timestamp" => Ok(ColumnType::Timestamp),
            _ => Err(()),
        }
    }
}

/// One unresolved field declaration, as written by an entity.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub attribute: String,
    pub column: String,
    pub type_name: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl FieldSpec {
    /// A non-nullable field whose column is named after the attribute.
    pub fn new(attribute: impl Into<String>, type_name: impl Into<String>) -> Self {
        let attribute = attribute.into();
        Self {
            column: attribute.clone(),
            attribute,
            type_name: type_name.into(),
            nullable: false,
            primary_key: false,
        }
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// A resolved field binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub attribute: String,
    pub column: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitySchema {
    table: String,
    fields: Vec<FieldDef>,
}

impl EntitySchema {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fields in mapping order: base fields first once composed.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, attribute: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.attribute == attribute)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.column == column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.column.as_str())
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.primary_key)
    }
}

/// Resolves declared types and rejects attributes or columns bound twice.
pub fn resolve_fields(table: &str, fields: &[FieldSpec]) -> Result<Vec<FieldDef>, MappingError> {
    let mut attributes = HashSet::new();
    let mut columns = HashSet::new();
    let mut resolved = Vec::with_capacity(fields.len());

    for spec in fields {
        if !attributes.insert(spec.attribute.as_str()) {
            return Err(MappingError::DuplicateMapping {
                table: table.to_string(),
                name: spec.attribute.clone(),
            });
        }
        if !columns.insert(spec.column.as_str()) {
            return Err(MappingError::DuplicateMapping {
                table: table.to_string(),
                name: spec.column.clone(),
            });
        }
        let column_type =
            spec.type_name
                .parse::<ColumnType>()
                .map_err(|_| MappingError::UnknownType {
                    table: table.to_string(),
                    attribute: spec.attribute.clone(),
                    type_name: spec.type_name.clone(),
                })?;

        resolved.push(FieldDef {
            attribute: spec.attribute.clone(),
            column: spec.column.clone(),
            column_type,
            nullable: spec.nullable,
            primary_key: spec.primary_key,
        });
    }

    Ok(resolved)
}

pub fn define_entity(table: &str, fields: &[FieldSpec]) -> Result<EntitySchema, MappingError> {
    let fields = resolve_fields(table, fields)?;
    tracing::debug!(table, fields = fields.len(), "entity defined");
    Ok(EntitySchema {
        table: table.to_string(),
        fields,
    })
}

/// Prepends `base` to the entity's own fields. A concrete field that reuses a
/// base attribute or column name is rejected rather than silently shadowing
/// the base binding.
pub fn compose_base(entity: EntitySchema, base: &[FieldDef]) -> Result<EntitySchema, MappingError> {
    let EntitySchema { table, fields } = entity;

    for own in &fields {
        if let Some(base_field) = base
            .iter()
            .find(|b| b.attribute == own.attribute || b.column == own.column)
        {
            let name = if base_field.attribute == own.attribute {
                own.attribute.clone()
            } else {
                own.column.clone()
            };
            return Err(MappingError::DuplicateMapping { table, name });
        }
    }

    let mut composed = Vec::with_capacity(base.len() + fields.len());
    composed.extend(base.iter().cloned());
    composed.extend(fields);

    Ok(EntitySchema {
        table,
        fields: composed,
    })
}
