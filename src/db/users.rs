//! Users repository
//!
//! Usernames are unique at the storage layer; a duplicate insert fails
//! with a constraint violation that the createUser mutation reports as
//! a user input error. No password column exists (see the login
//! mutation for why).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::sqlite_helpers::now_iso8601;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub favorite_genre: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub favorite_genre: String,
}

pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query(
            "INSERT INTO users (id, username, favorite_genre, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.favorite_genre)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(UserRecord {
            id,
            username: user.username,
            favorite_genre: user.favorite_genre,
            created_at: now,
        })
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, username, favorite_genre, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserRecord {
            id: r.0,
            username: r.1,
            favorite_genre: r.2,
            created_at: r.3,
        }))
    }

    /// Get user by username (case-sensitive exact match)
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, username, favorite_genre, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserRecord {
            id: r.0,
            username: r.1,
            favorite_genre: r.2,
            created_at: r.3,
        }))
    }

    /// Count all users
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
