pub mod base;
pub mod user;

use std::sync::Arc;

use crate::mapping::{MappingError, SchemaRegistry};

pub use base::BaseEntity;
pub use user::UserEntity;

/// Builds the schema table for every persisted entity. Called once at startup;
/// an error here means the declarations are inconsistent.
pub fn init_registry() -> Result<Arc<SchemaRegistry>, MappingError> {
    Ok(SchemaRegistry::builder(&base::base_fields())?
        .register::<UserEntity>()?
        .build())
}
