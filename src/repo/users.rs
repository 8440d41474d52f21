use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    entities::UserEntity,
    mapping::{Row, SchemaRegistry},
    repo::{rows, StoreError},
    state::DatabaseClient,
};

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn insert(&self, user: &UserEntity) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<UserEntity>, StoreError>;
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<UserEntity>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    /// Returns false when no live row carries the user's id.
    async fn update(&self, user: &UserEntity) -> Result<bool, StoreError>;
}

pub struct SeaOrmUsersRepo {
    db: Arc<dyn DatabaseClient>,
    registry: Arc<SchemaRegistry>,
}

impl SeaOrmUsersRepo {
    pub fn new(db: Arc<dyn DatabaseClient>, registry: Arc<SchemaRegistry>) -> Self {
        Self { db, registry }
    }
}

#[async_trait]
impl UsersRepo for SeaOrmUsersRepo {
    async fn insert(&self, user: &UserEntity) -> Result<(), StoreError> {
        let schema = self.registry.schema_of::<UserEntity>()?;
        let row = self.registry.to_row(user)?;
        rows::insert(self.db.conn(), schema, &row).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserEntity>, StoreError> {
        let schema = self.registry.schema_of::<UserEntity>()?;
        let key: Row = [("id", id)].into_iter().collect();
        let Some(row) = rows::select_by_key(self.db.conn(), schema, &key).await? else {
            return Ok(None);
        };
        Ok(Some(self.registry.from_row(&row)?))
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<UserEntity>, StoreError> {
        let schema = self.registry.schema_of::<UserEntity>()?;
        let rows = rows::select_page(self.db.conn(), schema, limit, offset).await?;
        rows.iter()
            .map(|row| self.registry.from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let schema = self.registry.schema_of::<UserEntity>()?;
        Ok(rows::count(self.db.conn(), schema).await?)
    }

    async fn update(&self, user: &UserEntity) -> Result<bool, StoreError> {
        let schema = self.registry.schema_of::<UserEntity>()?;
        let row = self.registry.to_row(user)?;
        let affected = rows::update(self.db.conn(), schema, &row).await?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::{base::now, init_registry, BaseEntity},
        schema,
    };
    use sea_orm::Database;

    struct TestDatabaseClient {
        conn: sea_orm::DatabaseConnection,
    }

    impl DatabaseClient for TestDatabaseClient {
        fn conn(&self) -> &sea_orm::DatabaseConnection {
            &self.conn
        }
    }

    #[tokio::test]
    #[ignore]
    async fn users_persist_through_row_mapping() -> Result<(), Box<dyn std::error::Error>> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => return Ok(()),
        };

        let registry = init_registry()?;
        let conn = Database::connect(&database_url).await?;
        schema::apply(&conn, &registry).await?;

        let repo = SeaOrmUsersRepo::new(Arc::new(TestDatabaseClient { conn }), registry);
        let mut user = UserEntity::new(BaseEntity::new(now()));
        user.mobile_phone_number = Some("5551234".to_string());
        repo.insert(&user).await?;

        let found = repo.find_by_id(user.id()).await?;
        assert_eq!(found.as_ref(), Some(&user));
        let stale = user.clone();

        user.nickname = Some("renamed".to_string());
        user.base_mut().mark_deleted(now());
        assert!(repo.update(&user).await?);
        assert!(repo.find_by_id(user.id()).await?.is_none());

        // A write based on a read from before the delete must not revive it.
        assert!(!repo.update(&stale).await?);
        assert!(repo.find_by_id(user.id()).await?.is_none());
        Ok(())
    }
}
