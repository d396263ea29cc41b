//! GraphQL type definitions
//!
//! These types mirror the stored records but are decorated with
//! async-graphql attributes. `Author.bookCount` is never stored; it is
//! resolved against the books collection on every read.

use async_graphql::{Context, Object, Result, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::db::Database;

/// An author in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub born: Option<i32>,
}

#[Object]
impl Author {
    async fn id(&self) -> &str {
        &self.id
    }

    async fn name(&self) -> &str {
        &self.name
    }

    /// Birth year, if known
    async fn born(&self) -> Option<i32> {
        self.born
    }

    /// Number of books referencing this author, counted on demand.
    /// One count query per author instance; queries returning many
    /// authors issue one count each (no batching).
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let db = ctx.data_unchecked::<Database>();
        db.books()
            .count_by_author(&self.id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }
}

/// A book, joined with its full author record
#[derive(Debug, Clone, SimpleObject)]
pub struct Book {
    pub id: String,
    pub title: String,
    /// Year of publication
    pub published: i32,
    pub author: Author,
    /// Ordered list of genres, may be empty
    pub genres: Vec<String>,
}

/// A registered user
#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub favorite_genre: String,
}

/// A signed login token
#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub value: String,
}
