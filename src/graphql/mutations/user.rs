//! User mutations: account creation and login
//!
//! Neither operation requires authentication. Login does not verify a
//! stored credential: there is no password storage, and any username
//! logs in with one fixed literal password. This is a known defect kept
//! on purpose rather than silently hardened; see DESIGN.md.

use super::prelude::*;

/// The only password `login` accepts, for any username.
const LOGIN_PASSWORD: &str = "123";

#[derive(Default)]
pub struct UserMutations;

#[Object]
impl UserMutations {
    /// Create a user account. A duplicate username is rejected by the
    /// storage layer and reported as a user input error.
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        favorite_genre: String,
    ) -> Result<User> {
        let db = ctx.data_unchecked::<Database>();

        let record = db
            .users()
            .create(CreateUser {
                username: username.clone(),
                favorite_genre: favorite_genre.clone(),
            })
            .await
            .map_err(|e| {
                tracing::warn!(username = %username, error = %e, "User creation failed");
                user_input_error(
                    e.to_string(),
                    json!({ "username": &username, "favoriteGenre": &favorite_genre }),
                )
            })?;

        tracing::info!(user_id = %record.id, username = %record.username, "User created");

        Ok(user_to_graphql(record))
    }

    /// Log in and receive a signed bearer token. Unknown usernames and
    /// wrong passwords produce the same invalid-credentials error.
    async fn login(&self, ctx: &Context<'_>, username: String, password: String) -> Result<Token> {
        let db = ctx.data_unchecked::<Database>();
        let config = ctx.data_unchecked::<Arc<Config>>();

        let record = db
            .users()
            .get_by_username(&username)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        let user = match record {
            Some(u) if password == LOGIN_PASSWORD => u,
            _ => {
                tracing::warn!(username = %username, "Login failed");
                return Err(AuthError::InvalidCredentials.extend());
            }
        };

        let value = issue_token(&config.jwt_secret, &user)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(Token { value })
    }
}
