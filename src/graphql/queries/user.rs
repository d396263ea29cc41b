use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// The current authenticated user, or null when the request carried
    /// no usable bearer token
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        Ok(ctx
            .try_current_user()
            .map(|user| user_to_graphql(user.0.clone())))
    }
}
