// Helper functions shared across GraphQL query/mutation modules.

use async_graphql::ErrorExtensions;

use crate::db::{AuthorRecord, BookWithAuthor, UserRecord};
use crate::graphql::types::{Author, Book, User};

/// Convert an AuthorRecord from the database to a GraphQL Author
pub(crate) fn author_to_graphql(r: AuthorRecord) -> Author {
    Author {
        id: r.id,
        name: r.name,
        born: r.born,
    }
}

/// Convert a joined book row to a GraphQL Book with its author populated
pub(crate) fn book_to_graphql(r: BookWithAuthor) -> Book {
    Book {
        id: r.book.id,
        title: r.book.title,
        published: r.book.published,
        genres: r.book.genres,
        author: author_to_graphql(r.author),
    }
}

/// Convert a UserRecord from the database to a GraphQL User
pub(crate) fn user_to_graphql(r: UserRecord) -> User {
    User {
        id: r.id,
        username: r.username,
        favorite_genre: r.favorite_genre,
    }
}

/// Wrap a persistence failure as a user input error carrying the
/// arguments that caused it, for client diagnostics.
pub(crate) fn user_input_error(
    message: impl Into<String>,
    invalid_args: serde_json::Value,
) -> async_graphql::Error {
    let args = async_graphql::Value::from_json(invalid_args).unwrap_or_default();
    async_graphql::Error::new(message).extend_with(|_, e| {
        e.set("code", "BAD_USER_INPUT");
        e.set("invalidArgs", args);
    })
}
