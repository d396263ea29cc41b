//! Database connection and operations
//!
//! Three independently stored collections: authors, books (each book
//! referencing exactly one author id), and users.

pub mod authors;
pub mod books;
pub mod sqlite_helpers;
pub mod users;

use std::str::FromStr;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use authors::{AuthorRecord, AuthorsRepository, CreateAuthor};
pub use books::{BookFilter, BookRecord, BookWithAuthor, BooksRepository, CreateBook};
pub use users::{CreateUser, UserRecord, UsersRepository};

const CREATE_AUTHORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    born INTEGER,
    created_at TEXT NOT NULL
)
"#;

const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    published INTEGER NOT NULL,
    author_id TEXT NOT NULL REFERENCES authors(id),
    genres TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    favorite_genre TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the maximum connection pool size from environment or default
    fn get_max_connections() -> u32 {
        std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10)
    }

    /// Create a new database connection pool
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(Self::get_max_connections())
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Create any missing tables
    pub async fn migrate(&self) -> Result<()> {
        for sql in [CREATE_AUTHORS_TABLE, CREATE_BOOKS_TABLE, CREATE_USERS_TABLE] {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get an authors repository
    pub fn authors(&self) -> AuthorsRepository {
        AuthorsRepository::new(self.pool.clone())
    }

    /// Get a books repository
    pub fn books(&self) -> BooksRepository {
        BooksRepository::new(self.pool.clone())
    }

    /// Get a users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }
}
