use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{
        Alias, Asterisk, Expr, Func, Order, Query, SelectStatement, SimpleExpr, UpdateStatement,
    },
    ConnectionTrait, DbErr, QueryResult,
};

use crate::mapping::{ColumnType, EntitySchema, FieldDef, Row, Value};

const DELETED_COLUMN: &str = "deleted";
const CREATED_COLUMN: &str = "created_at";
const TOTAL_ALIAS: &str = "total";

/// Postgres binds LIMIT/OFFSET as i64; anything larger cannot be sent.
const MAX_PAGE_BOUND: u64 = i64::MAX as u64;

fn db_value(column_type: ColumnType, value: &Value) -> sea_orm::Value {
    match (column_type, value) {
        (_, Value::String(s)) => sea_orm::Value::from(s.clone()),
        (_, Value::Integer(i)) => sea_orm::Value::from(*i),
        (_, Value::Boolean(b)) => sea_orm::Value::from(*b),
        (_, Value::Timestamp(ts)) => sea_orm::Value::from(*ts),
        (ColumnType::String, Value::Null) => sea_orm::Value::String(None),
        (ColumnType::Integer, Value::Null) => sea_orm::Value::BigInt(None),
        (ColumnType::Boolean, Value::Null) => sea_orm::Value::Bool(None),
        (ColumnType::Timestamp, Value::Null) => sea_orm::Value::ChronoDateTimeUtc(None),
    }
}

fn column_value(field: &FieldDef, row: &Row) -> Result<SimpleExpr, DbErr> {
    let value = row.get(&field.column).ok_or_else(|| {
        DbErr::Custom(format!("row is missing column `{}`", field.column))
    })?;
    Ok(SimpleExpr::Value(db_value(field.column_type, value)))
}

fn decode(schema: &EntitySchema, result: &QueryResult) -> Result<Row, DbErr> {
    let mut row = Row::new();
    for field in schema.fields() {
        let column = field.column.as_str();
        let value: Value = match field.column_type {
            ColumnType::String => result.try_get::<Option<String>>("", column)?.into(),
            ColumnType::Integer => result.try_get::<Option<i64>>("", column)?.into(),
            ColumnType::Boolean => result.try_get::<Option<bool>>("", column)?.into(),
            ColumnType::Timestamp => result
                .try_get::<Option<DateTime<Utc>>>("", column)?
                .into(),
        };
        row.insert(column, value);
    }
    Ok(row)
}

fn key_condition(schema: &EntitySchema, key: &Row) -> Result<SimpleExpr, DbErr> {
    let mut condition: Option<SimpleExpr> = None;
    for field in schema.primary_key() {
        let expr = Expr::col(Alias::new(field.column.as_str())).eq(column_value(field, key)?);
        condition = Some(match condition {
            Some(acc) => acc.and(expr),
            None => expr,
        });
    }
    condition.ok_or_else(|| DbErr::Custom(format!("`{}` has no primary key", schema.table())))
}

pub async fn insert<C: ConnectionTrait>(conn: &C, schema: &EntitySchema, row: &Row) -> Result<(), DbErr> {
    let values = schema
        .fields()
        .iter()
        .map(|field| column_value(field, row))
        .collect::<Result<Vec<_>, _>>()?;

    let statement = {
        let mut stmt = Query::insert();
        stmt.into_table(Alias::new(schema.table()))
            .columns(schema.columns().map(Alias::new));
        stmt.values(values)
            .map_err(|err| DbErr::Custom(err.to_string()))?;
        conn.get_database_backend().build(&stmt)
    };
    conn.execute(statement).await?;
    Ok(())
}

/// Rows matching `key` on the primary key columns, unless soft-deleted.
pub async fn select_by_key<C: ConnectionTrait>(
    conn: &C,
    schema: &EntitySchema,
    key: &Row,
) -> Result<Option<Row>, DbErr> {
    let statement = {
        let mut stmt = Query::select();
        stmt.columns(schema.columns().map(Alias::new))
            .from(Alias::new(schema.table()))
            .and_where(key_condition(schema, key)?);
        if let Some(live) = live_only(schema) {
            stmt.and_where(live);
        }
        conn.get_database_backend().build(&stmt)
    };

    match conn.query_one(statement).await? {
        Some(result) => Ok(Some(decode(schema, &result)?)),
        None => Ok(None),
    }
}

fn live_only(schema: &EntitySchema) -> Option<SimpleExpr> {
    schema
        .field_by_column(DELETED_COLUMN)
        .map(|_| Expr::col(Alias::new(DELETED_COLUMN)).eq(false))
}

fn select_page_statement(schema: &EntitySchema, limit: u64, offset: u64) -> SelectStatement {
    let mut stmt = Query::select();
    stmt.columns(schema.columns().map(Alias::new))
        .from(Alias::new(schema.table()))
        .limit(limit.min(MAX_PAGE_BOUND))
        .offset(offset.min(MAX_PAGE_BOUND));
    if let Some(live) = live_only(schema) {
        stmt.and_where(live);
    }
    if schema.field_by_column(CREATED_COLUMN).is_some() {
        stmt.order_by(Alias::new(CREATED_COLUMN), Order::Asc);
    }
    for field in schema.primary_key() {
        stmt.order_by(Alias::new(field.column.as_str()), Order::Asc);
    }
    stmt
}

/// A page of live rows, oldest first.
pub async fn select_page<C: ConnectionTrait>(
    conn: &C,
    schema: &EntitySchema,
    limit: u64,
    offset: u64,
) -> Result<Vec<Row>, DbErr> {
    let statement = conn
        .get_database_backend()
        .build(&select_page_statement(schema, limit, offset));

    conn.query_all(statement)
        .await?
        .iter()
        .map(|result| decode(schema, result))
        .collect()
}

/// Number of live rows.
pub async fn count<C: ConnectionTrait>(conn: &C, schema: &EntitySchema) -> Result<u64, DbErr> {
    let statement = {
        let mut stmt = Query::select();
        stmt.expr_as(Func::count(Expr::col(Asterisk)), Alias::new(TOTAL_ALIAS))
            .from(Alias::new(schema.table()));
        if let Some(live) = live_only(schema) {
            stmt.and_where(live);
        }
        conn.get_database_backend().build(&stmt)
    };

    let total = match conn.query_one(statement).await? {
        Some(result) => result.try_get::<i64>("", TOTAL_ALIAS)?,
        None => 0,
    };
    Ok(u64::try_from(total).unwrap_or(0))
}

fn update_statement(schema: &EntitySchema, row: &Row) -> Result<UpdateStatement, DbErr> {
    let values = schema
        .fields()
        .iter()
        .filter(|field| !field.primary_key)
        .map(|field| {
            column_value(field, row).map(|value| (Alias::new(field.column.as_str()), value))
        })
        .collect::<Result<Vec<_>, DbErr>>()?;

    let mut stmt = Query::update();
    stmt.table(Alias::new(schema.table()))
        .values(values)
        .and_where(key_condition(schema, row)?);
    // A row soft-deleted since it was read stays deleted.
    if let Some(live) = live_only(schema) {
        stmt.and_where(live);
    }
    Ok(stmt)
}

/// Writes every non-key column of `row` to its live row. Returns the number
/// of rows touched; 0 when the row is gone or already soft-deleted.
pub async fn update<C: ConnectionTrait>(
    conn: &C,
    schema: &EntitySchema,
    row: &Row,
) -> Result<u64, DbErr> {
    let statement = conn
        .get_database_backend()
        .build(&update_statement(schema, row)?);
    let result = conn.execute(statement).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::{base::now, init_registry, BaseEntity, UserEntity},
        mapping::Entity,
    };
    use sea_orm::sea_query::{PostgresQueryBuilder, QueryStatementWriter};

    fn user_schema() -> std::sync::Arc<EntitySchema> {
        init_registry()
            .expect("registry")
            .schema(UserEntity::TABLE)
            .expect("user schema")
            .clone()
    }

    #[test]
    fn page_offset_is_clamped_to_bindable_range() {
        let sql = select_page_statement(&user_schema(), u64::MAX, u64::MAX)
            .to_string(PostgresQueryBuilder);

        assert!(sql.contains("LIMIT 9223372036854775807"), "{sql}");
        assert!(sql.contains("OFFSET 9223372036854775807"), "{sql}");
        assert!(!sql.contains("18446744073709551615"), "{sql}");
    }

    #[test]
    fn page_skips_soft_deleted_rows() {
        let sql = select_page_statement(&user_schema(), 10, 0).to_string(PostgresQueryBuilder);
        let where_clause = sql.split(" WHERE ").nth(1).expect("where clause");

        assert!(where_clause.contains(r#""deleted" = FALSE"#), "{sql}");
    }

    #[test]
    fn update_leaves_soft_deleted_rows_alone() {
        let schema = user_schema();
        let user = UserEntity::new(BaseEntity::with_id("u1", now()));
        let row = init_registry().expect("registry").to_row(&user).expect("row");

        let sql = update_statement(&schema, &row)
            .expect("statement")
            .to_string(PostgresQueryBuilder);
        let where_clause = sql.split(" WHERE ").nth(1).expect("where clause");

        assert!(where_clause.contains(r#""id" = 'u1'"#), "{sql}");
        assert!(where_clause.contains(r#""deleted" = FALSE"#), "{sql}");
    }

    #[test]
    fn null_values_keep_their_column_type() {
        assert_eq!(
            db_value(ColumnType::String, &Value::Null),
            sea_orm::Value::String(None)
        );
        assert_eq!(
            db_value(ColumnType::Timestamp, &Value::Null),
            sea_orm::Value::ChronoDateTimeUtc(None)
        );
        assert_eq!(
            db_value(ColumnType::Boolean, &Value::Boolean(true)),
            sea_orm::Value::Bool(Some(true))
        );
    }
}
