use utoipa::OpenApi;

use crate::{
    handler,
    handler::{
        health::Health,
        schema::{ColumnResponse, SchemaResponse},
        users::{CreateUser, UpdateUser, UserListResponse, UserResponse},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::users::create_user,
        handler::users::list_users,
        handler::users::get_user,
        handler::users::update_user,
        handler::users::delete_user,
        handler::schema::get_schema
    ),
    components(schemas(
        Health,
        CreateUser,
        UpdateUser,
        UserResponse,
        UserListResponse,
        SchemaResponse,
        ColumnResponse
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "users", description = "Users"),
        (name = "schema", description = "Entity mapping")
    )
)]
pub struct ApiDoc;
