//! GraphQL schema definition with queries, mutations, and subscriptions
//!
//! The roots are merged from per-domain modules. Shared state (config,
//! database, event hub) is attached as schema data; the per-request
//! current user is attached as request data by the auth gate in main.

use std::sync::Arc;

use async_graphql::{MergedObject, Schema};

use crate::config::Config;
use crate::db::Database;
use crate::services::BookEvents;

use super::mutations::{AuthorMutations, BookMutations, UserMutations};
use super::queries::{AuthorQueries, BookQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type
pub type BookshelfSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(BookQueries, AuthorQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(BookMutations, AuthorMutations, UserMutations);

/// Build the GraphQL schema with all resolvers
pub fn build_schema(config: Arc<Config>, db: Database, events: BookEvents) -> BookshelfSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(config)
    .data(db)
    .data(events)
    .finish()
}

#[cfg(test)]
mod tests {
    //! End-to-end tests driving the built schema against a fresh
    //! in-memory SQLite database per test.

    use async_graphql::Request;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::graphql::auth::{CurrentUser, verify_token};

    use super::*;

    const JWT_SECRET: &str = "test-secret";

    async fn setup() -> (BookshelfSchema, Database) {
        // One connection, or every pool checkout would see its own
        // empty in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Database::new(pool);
        db.migrate().await.unwrap();

        let config = Arc::new(Config {
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: JWT_SECRET.to_string(),
        });
        let schema = build_schema(config, db.clone(), BookEvents::new());
        (schema, db)
    }

    async fn logged_in_user(db: &Database) -> CurrentUser {
        let record = db
            .users()
            .create(crate::db::CreateUser {
                username: "tester".to_string(),
                favorite_genre: "fantasy".to_string(),
            })
            .await
            .unwrap();
        CurrentUser(record)
    }

    async fn execute_authed(schema: &BookshelfSchema, user: &CurrentUser, query: &str) -> Value {
        let resp = schema
            .execute(Request::new(query).data(user.clone()))
            .await;
        assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
        resp.data.into_json().unwrap()
    }

    async fn seed_book(
        schema: &BookshelfSchema,
        user: &CurrentUser,
        title: &str,
        published: i32,
        author: &str,
        genres: &[&str],
    ) {
        let genres = genres
            .iter()
            .map(|g| format!("{g:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mutation = format!(
            r#"mutation {{
                addBook(title: {title:?}, published: {published}, author: {author:?}, genres: [{genres}]) {{ id }}
            }}"#
        );
        let resp = schema
            .execute(Request::new(mutation).data(user.clone()))
            .await;
        assert!(resp.errors.is_empty(), "seed failed: {:?}", resp.errors);
    }

    #[tokio::test]
    async fn author_with_no_books_has_zero_count() {
        let (schema, db) = setup().await;
        db.authors()
            .create(crate::db::CreateAuthor {
                name: "Tove Jansson".to_string(),
                born: Some(1914),
            })
            .await
            .unwrap();

        let resp = schema.execute("{ allAuthors { name bookCount } }").await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "allAuthors": [{ "name": "Tove Jansson", "bookCount": 0 }] })
        );
    }

    #[tokio::test]
    async fn add_book_creates_missing_author() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;

        let data = execute_authed(
            &schema,
            &user,
            r#"mutation {
                addBook(title: "Dune", published: 1965, author: "Frank Herbert", genres: ["scifi"]) {
                    title
                    author { name born }
                }
            }"#,
        )
        .await;

        assert_eq!(
            data,
            json!({ "addBook": {
                "title": "Dune",
                "author": { "name": "Frank Herbert", "born": null }
            }})
        );
        assert_eq!(db.authors().count().await.unwrap(), 1);
        assert_eq!(db.books().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn add_book_reuses_existing_author() {
        let (schema, db) = setup().await;
        db.authors()
            .create(crate::db::CreateAuthor {
                name: "Frank Herbert".to_string(),
                born: Some(1920),
            })
            .await
            .unwrap();
        let user = logged_in_user(&db).await;

        let data = execute_authed(
            &schema,
            &user,
            r#"mutation {
                addBook(title: "Dune", published: 1965, author: "Frank Herbert", genres: []) {
                    author { name born }
                }
            }"#,
        )
        .await;

        // The existing record is referenced, not a fresh one.
        assert_eq!(
            data,
            json!({ "addBook": { "author": { "name": "Frank Herbert", "born": 1920 } } })
        );
        assert_eq!(db.authors().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn genre_filter_returns_exact_matches() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;
        seed_book(&schema, &user, "Dune", 1965, "Frank Herbert", &["scifi"]).await;
        seed_book(&schema, &user, "LOTR", 1954, "Tolkien", &["fantasy", "classic"]).await;
        seed_book(&schema, &user, "The Hobbit", 1937, "Tolkien", &["fantasy"]).await;

        let resp = schema
            .execute(r#"{ allBooks(genre: "fantasy") { title } }"#)
            .await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "allBooks": [{ "title": "LOTR" }, { "title": "The Hobbit" }] })
        );

        // Genre matching is case-sensitive and exact.
        let resp = schema
            .execute(r#"{ allBooks(genre: "Fantasy") { title } }"#)
            .await;
        assert!(resp.errors.is_empty());
        assert_eq!(resp.data.into_json().unwrap(), json!({ "allBooks": [] }));

        // Author and genre filters intersect.
        let resp = schema
            .execute(r#"{ allBooks(author: "Tolkien", genre: "classic") { title } }"#)
            .await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "allBooks": [{ "title": "LOTR" }] })
        );
    }

    #[tokio::test]
    async fn unknown_author_filter_returns_empty() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;
        seed_book(&schema, &user, "Dune", 1965, "Frank Herbert", &["scifi"]).await;

        let resp = schema
            .execute(r#"{ allBooks(author: "Unknown Name") { title } }"#)
            .await;
        assert!(resp.errors.is_empty());
        assert_eq!(resp.data.into_json().unwrap(), json!({ "allBooks": [] }));
    }

    #[tokio::test]
    async fn edit_unknown_author_returns_null_and_writes_nothing() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;

        let data = execute_authed(
            &schema,
            &user,
            r#"mutation { editAuthor(name: "Unknown Name", setBornTo: 1900) { name } }"#,
        )
        .await;

        assert_eq!(data, json!({ "editAuthor": null }));
        assert_eq!(db.authors().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn login_returns_decodable_token() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;

        let resp = schema
            .execute(r#"mutation { login(username: "tester", password: "123") { value } }"#)
            .await;
        assert!(resp.errors.is_empty(), "{:?}", resp.errors);
        let data = resp.data.into_json().unwrap();
        let token = data["login"]["value"].as_str().unwrap();

        let claims = verify_token(JWT_SECRET, token).unwrap();
        assert_eq!(claims.sub, user.0.id);
        assert_eq!(claims.username, "tester");
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (schema, db) = setup().await;
        logged_in_user(&db).await;

        let wrong_password = schema
            .execute(r#"mutation { login(username: "tester", password: "hunter2") { value } }"#)
            .await;
        let unknown_user = schema
            .execute(r#"mutation { login(username: "nobody", password: "123") { value } }"#)
            .await;

        assert_eq!(wrong_password.errors.len(), 1);
        assert_eq!(unknown_user.errors.len(), 1);
        assert_eq!(wrong_password.errors[0].message, "invalid credentials");
        assert_eq!(
            wrong_password.errors[0].message,
            unknown_user.errors[0].message
        );
    }

    #[tokio::test]
    async fn protected_mutations_require_auth() {
        let (schema, db) = setup().await;

        let add = schema
            .execute(r#"mutation { addBook(title: "X", published: 2000, author: "Y", genres: []) { id } }"#)
            .await;
        assert_eq!(add.errors.len(), 1);
        assert_eq!(add.errors[0].message, "failed authentication");
        let err = serde_json::to_value(&add.errors[0]).unwrap();
        assert_eq!(err["extensions"]["code"], json!("UNAUTHORIZED"));

        let edit = schema
            .execute(r#"mutation { editAuthor(name: "Y", setBornTo: 1950) { name } }"#)
            .await;
        assert_eq!(edit.errors.len(), 1);
        assert_eq!(edit.errors[0].message, "failed authentication");

        // No side effects from either rejected mutation.
        assert_eq!(db.authors().count().await.unwrap(), 0);
        assert_eq!(db.books().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_user_input_error() {
        let (schema, db) = setup().await;
        logged_in_user(&db).await; // takes the name "tester"

        let resp = schema
            .execute(r#"mutation { createUser(username: "tester", favoriteGenre: "scifi") { id } }"#)
            .await;
        assert_eq!(resp.errors.len(), 1);
        let err = serde_json::to_value(&resp.errors[0]).unwrap();
        assert_eq!(err["extensions"]["code"], json!("BAD_USER_INPUT"));
        assert_eq!(
            err["extensions"]["invalidArgs"],
            json!({ "username": "tester", "favoriteGenre": "scifi" })
        );
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn me_reflects_request_auth() {
        let (schema, db) = setup().await;

        let anonymous = schema.execute("{ me { username } }").await;
        assert!(anonymous.errors.is_empty());
        assert_eq!(anonymous.data.into_json().unwrap(), json!({ "me": null }));

        let user = logged_in_user(&db).await;
        let resp = schema
            .execute(Request::new("{ me { username favoriteGenre } }").data(user))
            .await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "me": { "username": "tester", "favoriteGenre": "fantasy" } })
        );
    }

    #[tokio::test]
    async fn tolkien_scenario() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;
        seed_book(&schema, &user, "LOTR", 1954, "Tolkien", &["fantasy"]).await;

        let resp = schema.execute("{ allAuthors { name bookCount } }").await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "allAuthors": [{ "name": "Tolkien", "bookCount": 1 }] })
        );

        let resp = schema
            .execute(r#"{ allBooks(genre: "fantasy") { title published author { name } genres } }"#)
            .await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "allBooks": [{
                "title": "LOTR",
                "published": 1954,
                "author": { "name": "Tolkien" },
                "genres": ["fantasy"]
            }]})
        );

        let data = execute_authed(
            &schema,
            &user,
            r#"mutation { editAuthor(name: "Tolkien", setBornTo: 1892) { name born } }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({ "editAuthor": { "name": "Tolkien", "born": 1892 } })
        );
    }

    #[tokio::test]
    async fn book_counts_track_collections() {
        let (schema, db) = setup().await;
        let user = logged_in_user(&db).await;
        seed_book(&schema, &user, "Dune", 1965, "Frank Herbert", &["scifi"]).await;
        seed_book(&schema, &user, "LOTR", 1954, "Tolkien", &["fantasy"]).await;
        seed_book(&schema, &user, "The Hobbit", 1937, "Tolkien", &["fantasy"]).await;

        let resp = schema.execute("{ bookCount authorCount }").await;
        assert!(resp.errors.is_empty());
        assert_eq!(
            resp.data.into_json().unwrap(),
            json!({ "bookCount": 3, "authorCount": 2 })
        );
    }
}
