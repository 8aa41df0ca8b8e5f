//! PostgreSQL user repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use papers_core::error::{AppError, ErrorKind};
use papers_core::result::AppResult;
use papers_core::traits::{Document, EntityStore};
use papers_core::types::Query;
use papers_entity::user::{User, UserPatch};

use crate::query::{ColumnType, push_where};

fn user_column(field: &str) -> Option<(&'static str, ColumnType)> {
    match field {
        "id" => Some(("id", ColumnType::Uuid)),
        "email" => Some(("email", ColumnType::Text)),
        "fullname" => Some(("fullname", ColumnType::Text)),
        _ => None,
    }
}

fn map_write_err(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::with_source(ErrorKind::Conflict, "Email is already registered", e)
        }
        _ => AppError::with_source(ErrorKind::Store, "Failed to write user", e),
    }
}

/// User persistence in the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<User> for PgUserStore {
    async fn get(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to find user", e))
    }

    async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let mut users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to fetch users", e))?;
        users.sort_by_key(|u| ids.iter().position(|id| *id == u.id.into_uuid()));
        Ok(users)
    }

    async fn filter(&self, query: &Query) -> AppResult<Vec<User>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_where(&mut builder, query, user_column)?;
        builder.push(" ORDER BY date_created ASC");
        builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to query users", e))
    }

    async fn insert(&self, mut user: User) -> AppResult<User> {
        user.assign_id(Uuid::now_v7());
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, fullname, email, password_hash, date_created, date_modified) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(user.id)
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.date_created)
        .bind(user.date_modified)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET fullname = COALESCE($2, fullname), \
             password_hash = COALESCE($3, password_hash), date_modified = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(patch.fullname.clone())
        .bind(patch.password_hash.clone())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_err)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_where(&self, query: &Query, patch: &UserPatch) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET fullname = COALESCE(");
        builder
            .push_bind(patch.fullname.clone())
            .push(", fullname), password_hash = COALESCE(")
            .push_bind(patch.password_hash.clone())
            .push(", password_hash), date_modified = NOW()");
        push_where(&mut builder, query, user_column)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_write_err)?;
        Ok(result.rows_affected())
    }

    async fn delete_where(&self, query: &Query) -> AppResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM users");
        push_where(&mut builder, query, user_column)?;
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Failed to delete users", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_filterable() {
        assert!(user_column("password_hash").is_none());
        assert_eq!(user_column("email"), Some(("email", ColumnType::Text)));
    }
}
