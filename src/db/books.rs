//! Books repository
//!
//! Every book references exactly one author by id. Reads join the full
//! author record so callers never hold a dangling reference.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::authors::AuthorRecord;
use super::sqlite_helpers::{json_array_contains_sql, json_to_vec, now_iso8601, vec_to_json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub published: i32,
    pub author_id: String,
    pub genres: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub published: i32,
    pub author_id: String,
    pub genres: Vec<String>,
}

/// A book row joined with its author row
#[derive(Debug, Clone)]
pub struct BookWithAuthor {
    pub book: BookRecord,
    pub author: AuthorRecord,
}

/// Filter for listing books. Both fields compose with AND.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Restrict to books referencing this author id
    pub author_id: Option<String>,
    /// Restrict to books whose genre list contains this exact string
    pub genre: Option<String>,
}

pub struct BooksRepository {
    pool: SqlitePool,
}

impl BooksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new book referencing an existing author
    pub async fn create(&self, book: CreateBook) -> Result<BookRecord> {
        let id = Uuid::new_v4().to_string();
        let now = now_iso8601();
        let genres_json = vec_to_json(&book.genres);

        sqlx::query(
            r#"
            INSERT INTO books (id, title, published, author_id, genres, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&book.title)
        .bind(book.published)
        .bind(&book.author_id)
        .bind(&genres_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(BookRecord {
            id,
            title: book.title,
            published: book.published,
            author_id: book.author_id,
            genres: book.genres,
            created_at: now,
        })
    }

    /// List books matching the filter, each joined with its author
    pub async fn list(&self, filter: BookFilter) -> Result<Vec<BookWithAuthor>> {
        let mut sql = String::from(
            "SELECT b.id, b.title, b.published, b.genres, b.created_at, \
                    a.id, a.name, a.born, a.created_at \
             FROM books b JOIN authors a ON a.id = b.author_id",
        );

        let mut clauses = Vec::new();
        if filter.author_id.is_some() {
            clauses.push("b.author_id = ?".to_string());
        }
        if filter.genre.is_some() {
            clauses.push(json_array_contains_sql("b.genres"));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY b.created_at");

        let mut query = sqlx::query_as::<
            _,
            (
                String,
                String,
                i32,
                String,
                String,
                String,
                String,
                Option<i32>,
                String,
            ),
        >(&sql);
        if let Some(author_id) = &filter.author_id {
            query = query.bind(author_id);
        }
        if let Some(genre) = &filter.genre {
            query = query.bind(genre);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|r| BookWithAuthor {
                book: BookRecord {
                    id: r.0,
                    title: r.1,
                    published: r.2,
                    author_id: r.5.clone(),
                    genres: json_to_vec(&r.3),
                    created_at: r.4,
                },
                author: AuthorRecord {
                    id: r.5,
                    name: r.6,
                    born: r.7,
                    created_at: r.8,
                },
            })
            .collect())
    }

    /// Count all books
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Count books referencing the given author
    pub async fn count_by_author(&self, author_id: &str) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
