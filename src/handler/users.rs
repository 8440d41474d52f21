use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    entities::UserEntity,
    repo::StoreError,
    service::users::{CreateUserInput, UpdateUserInput},
    state::AppState,
};

const MAX_PAGE_SIZE: u64 = 100;
const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    pub mobile_phone_number: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub head_img_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub mobile_phone_number: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub head_img_url: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    10
}

impl ListParams {
    /// Page size and offset after clamping to what the store can bind.
    fn bounds(&self) -> (u64, u64) {
        (self.limit.min(MAX_PAGE_SIZE), self.offset.min(MAX_OFFSET))
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub mobile_phone_number: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub head_img_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<UserEntity> for UserResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id().to_string(),
            created_at: user.base().created_at(),
            modified_at: user.base().modified_at(),
            mobile_phone_number: user.mobile_phone_number,
            email: user.email,
            nickname: user.nickname,
            head_img_url: user.head_img_url,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub limit: u64,
    pub offset: u64,
    /// Live users across all pages.
    pub total: u64,
}

fn internal(err: StoreError) -> StatusCode {
    tracing::error!(error = %err, "users: store failure");
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Every body the `Json` extractor rejects is answered with 400.
fn json_payload<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, StatusCode> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "users: rejected payload");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), StatusCode> {
    let payload = json_payload(payload)?;
    let input = CreateUserInput {
        mobile_phone_number: payload.mobile_phone_number,
        email: payload.email,
        nickname: payload.nickname,
        head_img_url: payload.head_img_url,
    };

    let created = state.users().create(input).await.map_err(internal)?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListParams),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<UserListResponse>, StatusCode> {
    let (limit, offset) = params.bounds();
    let users = state.users().list(limit, offset).await.map_err(internal)?;
    let total = state.users().count().await.map_err(internal)?;

    Ok(Json(UserListResponse {
        data: users.into_iter().map(Into::into).collect(),
        limit,
        offset,
        total,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, StatusCode> {
    match state.users().get(&id).await.map_err(internal)? {
        Some(user) => Ok(Json(user.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    request_body = UpdateUser,
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<Json<UserResponse>, StatusCode> {
    let payload = json_payload(payload)?;
    let input = UpdateUserInput {
        mobile_phone_number: payload.mobile_phone_number,
        email: payload.email,
        nickname: payload.nickname,
        head_img_url: payload.head_img_url,
    };

    match state.users().update(&id, input).await.map_err(internal)? {
        Some(user) => Ok(Json(user.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.users().delete(&id).await.map_err(internal)? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(StatusCode::NOT_FOUND),
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(state)
}
