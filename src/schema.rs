use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use crate::mapping::{ColumnType, EntitySchema, SchemaRegistry};

/// Creates every registered table that does not exist yet.
pub async fn apply(conn: &DatabaseConnection, registry: &SchemaRegistry) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    for schema in registry.schemas() {
        if manager.has_table(schema.table()).await? {
            tracing::debug!(table = schema.table(), "schema: table exists");
            continue;
        }
        manager.create_table(create_table(schema)).await?;
        tracing::info!(table = schema.table(), "schema: table created");
    }

    Ok(())
}

fn create_table(schema: &EntitySchema) -> TableCreateStatement {
    let mut table = Table::create();
    table.table(Alias::new(schema.table())).if_not_exists();

    for field in schema.fields() {
        let mut column = ColumnDef::new(Alias::new(field.column.as_str()));
        match field.column_type {
            ColumnType::String => column.string(),
            ColumnType::Integer => column.big_integer(),
            ColumnType::Boolean => column.boolean(),
            ColumnType::Timestamp => column.timestamp_with_time_zone(),
        };
        if !field.nullable {
            column.not_null();
        }
        if field.primary_key {
            column.primary_key();
        }
        table.col(&mut column);
    }

    table
}
