use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    entities::{base::now, BaseEntity, UserEntity},
    repo::{users::UsersRepo, StoreError},
};

#[derive(Default)]
pub struct CreateUserInput {
    pub mobile_phone_number: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub head_img_url: Option<String>,
}

/// Only the fields that are `Some` are written.
#[derive(Default)]
pub struct UpdateUserInput {
    pub mobile_phone_number: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub head_img_url: Option<String>,
}

#[async_trait]
pub trait UsersService: Send + Sync {
    async fn create(&self, input: CreateUserInput) -> Result<UserEntity, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<UserEntity>, StoreError>;
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<UserEntity>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
    async fn update(
        &self,
        id: &str,
        input: UpdateUserInput,
    ) -> Result<Option<UserEntity>, StoreError>;
    async fn delete(&self, id: &str) -> Result<Option<UserEntity>, StoreError>;
}

pub struct UsersServiceImpl {
    users_repo: Arc<dyn UsersRepo>,
}

impl UsersServiceImpl {
    pub fn new(users_repo: Arc<dyn UsersRepo>) -> Self {
        Self { users_repo }
    }
}

#[async_trait]
impl UsersService for UsersServiceImpl {
    async fn create(&self, input: CreateUserInput) -> Result<UserEntity, StoreError> {
        let mut user = UserEntity::new(BaseEntity::new(now()));
        user.mobile_phone_number = input.mobile_phone_number;
        user.email = input.email;
        user.nickname = input.nickname;
        user.head_img_url = input.head_img_url;

        self.users_repo.insert(&user).await?;
        tracing::info!(user_id = user.id(), "user created");
        Ok(user)
    }

    async fn get(&self, id: &str) -> Result<Option<UserEntity>, StoreError> {
        self.users_repo.find_by_id(id).await
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<UserEntity>, StoreError> {
        self.users_repo.list(limit, offset).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.users_repo.count().await
    }

    async fn update(
        &self,
        id: &str,
        input: UpdateUserInput,
    ) -> Result<Option<UserEntity>, StoreError> {
        let Some(mut user) = self.users_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        if let Some(mobile_phone_number) = input.mobile_phone_number {
            user.mobile_phone_number = Some(mobile_phone_number);
        }
        if let Some(email) = input.email {
            user.email = Some(email);
        }
        if let Some(nickname) = input.nickname {
            user.nickname = Some(nickname);
        }
        if let Some(head_img_url) = input.head_img_url {
            user.head_img_url = Some(head_img_url);
        }
        user.base_mut().touch(now());

        if !self.users_repo.update(&user).await? {
            return Ok(None);
        }
        Ok(Some(user))
    }

    async fn delete(&self, id: &str) -> Result<Option<UserEntity>, StoreError> {
        let Some(mut user) = self.users_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        user.base_mut().mark_deleted(now());
        if !self.users_repo.update(&user).await? {
            return Ok(None);
        }
        tracing::info!(user_id = user.id(), "user soft-deleted");
        Ok(Some(user))
    }
}
