use crate::auth::repo_types::{Admin, User};
use sqlx::PgPool;
use uuid::Uuid;

impl User {
    /// Find a customer by (already normalized) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new customer with hashed password.
    pub async fn create(
        db: &PgPool,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, email, password_hash, created_at
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Returns false when no such customer exists.
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

impl Admin {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, email, full_name, password_hash, created_at
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(admin)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, email, full_name, password_hash, created_at
            FROM admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(admin)
    }

    pub async fn create(
        db: &PgPool,
        email: &str,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> Result<Admin, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (email, full_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, full_name, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(full_name)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Admin>> {
        let rows = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, email, full_name, password_hash, created_at
            FROM admins
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
