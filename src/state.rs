use anyhow::Context;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::{
    mapping::SchemaRegistry,
    repo::users::SeaOrmUsersRepo,
    service::{
        config::ConfigService,
        users::{UsersService, UsersServiceImpl},
    },
};

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    pub async fn new(config: &dyn ConfigService, registry: &SchemaRegistry) -> anyhow::Result<Self> {
        let values = config.values();
        let conn = crate::db::connect(values.database_url.as_deref())
            .await
            .context("database connection failed")?;
        if values.apply_schema {
            crate::schema::apply(&conn, registry)
                .await
                .context("schema apply failed")?;
        }
        Ok(Self { conn })
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

pub struct AppState {
    registry: Arc<SchemaRegistry>,
    users: Arc<dyn UsersService>,
    config: Arc<dyn ConfigService>,
}

impl AppState {
    pub async fn new(
        config: Arc<dyn ConfigService>,
        registry: Arc<SchemaRegistry>,
    ) -> anyhow::Result<Arc<Self>> {
        let db = Arc::new(SeaOrmDatabaseClient::new(config.as_ref(), &registry).await?);
        let users_repo = Arc::new(SeaOrmUsersRepo::new(db, registry.clone()));
        let users = Arc::new(UsersServiceImpl::new(users_repo));

        Ok(Arc::new(Self {
            registry,
            users,
            config,
        }))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn users(&self) -> &dyn UsersService {
        self.users.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }
}
