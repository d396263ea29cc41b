//! Authors repository
//!
//! Author names are unique by convention only; nothing at the storage
//! layer enforces it, so concurrent creates for the same name can both
//! succeed (see the addBook mutation).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::sqlite_helpers::now_iso8601;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub born: Option<i32>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateAuthor {
    pub name: String,
    pub born: Option<i32>,
}

pub struct AuthorsRepository {
    pool: SqlitePool,
}

impl AuthorsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new author
    pub async fn create(&self, author: CreateAuthor) -> Result<AuthorRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();

        sqlx::query("INSERT INTO authors (id, name, born, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&author.name)
            .bind(author.born)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(AuthorRecord {
            id,
            name: author.name,
            born: author.born,
            created_at: now,
        })
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<AuthorRecord>> {
        let row = sqlx::query_as::<_, (String, String, Option<i32>, String)>(
            "SELECT id, name, born, created_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AuthorRecord {
            id: r.0,
            name: r.1,
            born: r.2,
            created_at: r.3,
        }))
    }

    /// Get author by exact name match (case-sensitive)
    pub async fn get_by_name(&self, name: &str) -> Result<Option<AuthorRecord>> {
        let row = sqlx::query_as::<_, (String, String, Option<i32>, String)>(
            "SELECT id, name, born, created_at FROM authors WHERE name = ? ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AuthorRecord {
            id: r.0,
            name: r.1,
            born: r.2,
            created_at: r.3,
        }))
    }

    /// List all authors
    pub async fn list_all(&self) -> Result<Vec<AuthorRecord>> {
        let rows = sqlx::query_as::<_, (String, String, Option<i32>, String)>(
            "SELECT id, name, born, created_at FROM authors ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AuthorRecord {
                id: r.0,
                name: r.1,
                born: r.2,
                created_at: r.3,
            })
            .collect())
    }

    /// Set the birth year for an author
    pub async fn set_born(&self, id: &str, born: i32) -> Result<()> {
        sqlx::query("UPDATE authors SET born = ? WHERE id = ?")
            .bind(born)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Count all authors
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
