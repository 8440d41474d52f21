pub mod rows;
pub mod users;

use crate::mapping::MappingError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),
}
