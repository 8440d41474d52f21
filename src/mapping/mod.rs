//! Entity-to-row mapping.
//!
//! Entities declare their fields once; [`define_entity`] and [`compose_base`]
//! turn the declarations into an immutable [`EntitySchema`], and [`to_row`] /
//! [`from_row`] are pure functions of a schema and an instance or row.

mod error;
mod field;
mod registry;
mod value;

pub use error::MappingError;
pub use field::{compose_base, define_entity, resolve_fields, ColumnType, EntitySchema, FieldDef, FieldSpec};
pub use registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use value::{Attributes, FromValue, Row, Value};

/// A record type bound to one table.
pub trait Entity: Sized {
    const TABLE: &'static str;

    /// The entity's own fields, without the base fields.
    fn fields() -> Vec<FieldSpec>;

    /// Current value of a mapped attribute, base attributes included.
    /// `None` means the entity has no such attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    fn from_attributes(attributes: &Attributes) -> Result<Self, MappingError>;
}

fn check(schema: &EntitySchema, field: &FieldDef, value: &Value) -> Result<(), MappingError> {
    let accepted = if value.is_null() {
        field.nullable
    } else {
        value.matches(field.column_type)
    };
    if accepted {
        Ok(())
    } else {
        Err(MappingError::TypeMismatch {
            table: schema.table().to_string(),
            column: field.column.clone(),
            expected: field.column_type,
            found: value.kind(),
        })
    }
}

/// Every mapped column is present in the result; unset optionals map to
/// [`Value::Null`].
pub fn to_row<E: Entity>(schema: &EntitySchema, entity: &E) -> Result<Row, MappingError> {
    let mut row = Row::new();
    for field in schema.fields() {
        let value = entity
            .attribute(&field.attribute)
            .ok_or_else(|| MappingError::UnknownAttribute {
                table: schema.table().to_string(),
                attribute: field.attribute.clone(),
            })?;
        check(schema, field, &value)?;
        row.insert(field.column.as_str(), value);
    }
    Ok(row)
}

/// Columns in `row` that the schema does not map are ignored.
pub fn from_row<E: Entity>(schema: &EntitySchema, row: &Row) -> Result<E, MappingError> {
    let mut attributes = Attributes::new(schema.table());
    for field in schema.fields() {
        let value = match row.get(&field.column) {
            Some(value) => value.clone(),
            None if field.nullable => Value::Null,
            None => {
                return Err(MappingError::MissingColumn {
                    table: schema.table().to_string(),
                    column: field.column.clone(),
                })
            }
        };
        check(schema, field, &value)?;
        attributes.set(&field.attribute, value);
    }
    E::from_attributes(&attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag {
        id: i64,
        label: String,
        color: Option<String>,
    }

    impl Entity for Tag {
        const TABLE: &'static str = "tag";

        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("label", "varchar").column("tag_label"),
                FieldSpec::new("color", "char").nullable(),
            ]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(self.id.into()),
                "label" => Some(self.label.clone().into()),
                "color" => Some(self.color.clone().into()),
                _ => None,
            }
        }

        fn from_attributes(attributes: &Attributes) -> Result<Self, MappingError> {
            Ok(Self {
                id: attributes.required("id")?,
                label: attributes.required("label")?,
                color: attributes.optional("color")?,
            })
        }
    }

    fn schema() -> EntitySchema {
        let base = resolve_fields("base", &[FieldSpec::new("id", "bigint").primary_key()])
            .expect("base");
        compose_base(define_entity(Tag::TABLE, &Tag::fields()).expect("tag"), &base)
            .expect("composed")
    }

    #[test]
    fn to_row_writes_null_sentinel_for_unset_optionals() {
        let tag = Tag {
            id: 7,
            label: "urgent".to_string(),
            color: None,
        };
        let row = to_row(&schema(), &tag).expect("row");

        assert_eq!(row.len(), 3);
        assert_eq!(row.get("id"), Some(&Value::Integer(7)));
        assert_eq!(row.get("tag_label"), Some(&Value::String("urgent".to_string())));
        assert_eq!(row.get("color"), Some(&Value::Null));
    }

    #[test]
    fn from_row_reverses_to_row() {
        let tag = Tag {
            id: 1,
            label: "home".to_string(),
            color: Some("blue".to_string()),
        };
        let schema = schema();
        let row = to_row(&schema, &tag).expect("row");

        assert_eq!(from_row::<Tag>(&schema, &row).expect("tag"), tag);
    }

    #[test]
    fn from_row_requires_non_nullable_columns() {
        let row: Row = [("id", Value::Integer(1))].into_iter().collect();
        let err = from_row::<Tag>(&schema(), &row).unwrap_err();

        assert_eq!(
            err,
            MappingError::MissingColumn {
                table: "tag".to_string(),
                column: "tag_label".to_string(),
            }
        );
    }

    #[test]
    fn from_row_treats_absent_nullable_column_as_null() {
        let row: Row = [("id", Value::Integer(2)), ("tag_label", Value::from("work"))]
            .into_iter()
            .collect();
        let tag = from_row::<Tag>(&schema(), &row).expect("tag");

        assert_eq!(tag.color, None);
    }

    #[test]
    fn from_row_ignores_unmapped_columns() {
        let row: Row = [
            ("id", Value::Integer(3)),
            ("tag_label", Value::from("misc")),
            ("color", Value::Null),
            ("legacy_flag", Value::Boolean(true)),
        ]
        .into_iter()
        .collect();

        assert!(from_row::<Tag>(&schema(), &row).is_ok());
    }

    #[test]
    fn from_row_rejects_wrong_kind() {
        let row: Row = [("id", Value::from("3")), ("tag_label", Value::from("misc"))]
            .into_iter()
            .collect();
        let err = from_row::<Tag>(&schema(), &row).unwrap_err();

        assert!(matches!(
            err,
            MappingError::TypeMismatch { column, expected: ColumnType::Integer, found: "string", .. }
                if column == "id"
        ));
    }

    #[test]
    fn from_row_rejects_null_in_non_nullable_column() {
        let row: Row = [("id", Value::Integer(3)), ("tag_label", Value::Null)]
            .into_iter()
            .collect();

        assert!(matches!(
            from_row::<Tag>(&schema(), &row),
            Err(MappingError::TypeMismatch { found: "null", .. })
        ));
    }
}
