use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smart_shared::models::user::{Role, User};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::catalog_repo::is_unique_violation;

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("Username or email already exists")]
    Duplicate,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub fn hash_password(password: &str) -> Result<String, UserStoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| UserStoreError::Hash(err.to_string()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Data access seam for back-office accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), UserStoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserStoreError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserStoreError>;

    async fn count(&self) -> Result<i64, UserStoreError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    full_name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, UserStoreError> {
        let role = Role::from_str(&self.role).map_err(UserStoreError::Backend)?;
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            role,
            created_at: self.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, role, created_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                UserStoreError::Duplicate
            } else {
                backend(err)
            }
        })?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserStoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserStoreError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, UserStoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(count)
    }
}

/// Create the default admin/staff accounts when the user store is empty.
/// Replaces the original one-shot seeding script with an idempotent startup
/// step.
pub async fn ensure_seed_users(users: &dyn UserRepository) -> Result<(), UserStoreError> {
    if users.count().await? > 0 {
        return Ok(());
    }

    let admin = User::new(
        "admin",
        "admin@smart.local",
        hash_password("admin123")?,
        "System Administrator",
        Role::Admin,
    );
    let staff = User::new(
        "staff",
        "staff@smart.local",
        hash_password("staff123")?,
        "Staff Member",
        Role::Staff,
    );

    users.insert(&admin).await?;
    users.insert(&staff).await?;

    tracing::warn!("seeded default admin/staff accounts with well-known passwords; rotate them");
    Ok(())
}

fn backend(err: sqlx::Error) -> UserStoreError {
    UserStoreError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
