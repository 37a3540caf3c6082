/*
 * Responsibility
 * - customers ドキュメント向け SQLx 操作 (create / get-by-id / createdAt 降順 list)
 * - DB エラーは RepoError に変換して返す (unique violation は Conflict)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    #[sqlx(rename = "customerId")]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    db: &PgPool,
    customer_id: &str,
    name: &str,
    email: Option<&str>,
) -> Result<CustomerRow, RepoError> {
    // createdAt is stamped by the store, not the caller.
    let row = sqlx::query_as::<_, CustomerRow>(
        r#"
        INSERT INTO customers ("customerId", name, email)
        VALUES ($1, $2, $3)
        RETURNING "customerId", name, email, "createdAt"
        "#,
    )
    .bind(customer_id)
    .bind(name)
    .bind(email)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, customer_id: &str) -> Result<Option<CustomerRow>, RepoError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r#"
        SELECT "customerId", name, email, "createdAt"
        FROM customers
        WHERE "customerId" = $1
        "#,
    )
    .bind(customer_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list(db: &PgPool, limit: i64) -> Result<Vec<CustomerRow>, RepoError> {
    let rows = sqlx::query_as::<_, CustomerRow>(
        r#"
        SELECT "customerId", name, email, "createdAt"
        FROM customers
        ORDER BY "createdAt" DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}
