use super::ColumnType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// An attribute or column appears twice in one entity, or a table is
    /// registered twice.
    #[error("duplicate mapping for `{name}` in entity `{table}`")]
    DuplicateMapping { table: String, name: String },

    #[error("type `{type_name}` of `{table}.{attribute}` has no supported column encoding")]
    UnknownType {
        table: String,
        attribute: String,
        type_name: String,
    },

    #[error("row for `{table}` is missing non-nullable column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error("column `{table}.{column}` expects {expected}, got {found}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: ColumnType,
        found: &'static str,
    },

    #[error("entity `{table}` has no attribute `{attribute}`")]
    UnknownAttribute { table: String, attribute: String },

    #[error("entity `{table}` is not registered")]
    UnknownEntity { table: String },

    #[error("invalid `{table}` record: {reason}")]
    InvalidRecord { table: String, reason: String },
}
