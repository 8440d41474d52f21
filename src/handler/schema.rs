use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    mapping::{EntitySchema, FieldDef},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct ColumnResponse {
    pub attribute: String,
    pub column: String,
    pub column_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl From<&FieldDef> for ColumnResponse {
    fn from(field: &FieldDef) -> Self {
        Self {
            attribute: field.attribute.clone(),
            column: field.column.clone(),
            column_type: field.column_type.to_string(),
            nullable: field.nullable,
            primary_key: field.primary_key,
        }
    }
}

/// Column bindings of one entity, in mapping order.
#[derive(Serialize, ToSchema)]
pub struct SchemaResponse {
    pub table: String,
    pub columns: Vec<ColumnResponse>,
}

impl From<&EntitySchema> for SchemaResponse {
    fn from(schema: &EntitySchema) -> Self {
        Self {
            table: schema.table().to_string(),
            columns: schema.fields().iter().map(Into::into).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/schema/{table}",
    params(
        ("table" = String, Path, description = "Entity table name")
    ),
    responses(
        (status = 200, description = "Entity schema", body = SchemaResponse),
        (status = 404, description = "Not registered")
    )
)]
pub async fn get_schema(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<SchemaResponse>, StatusCode> {
    let schema = state
        .registry()
        .schema(&table)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(SchemaResponse::from(&**schema)))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/schema/:table", get(get_schema))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::init_registry;

    #[test]
    fn user_schema_response_lists_columns_in_order() {
        let registry = init_registry().expect("registry");
        let schema = registry.schema("user").expect("user");
        let response = SchemaResponse::from(&**schema);

        assert_eq!(response.table, "user");
        assert_eq!(response.columns.len(), 8);
        assert_eq!(response.columns[0].column, "id");
        assert!(response.columns[0].primary_key);
        assert_eq!(response.columns[3].column_type, "boolean");
        assert_eq!(response.columns[7].column, "head_img_url");
        assert!(response.columns[7].nullable);
    }
}
