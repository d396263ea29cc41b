use super::prelude::*;

#[derive(Default)]
pub struct AuthorMutations;

#[Object]
impl AuthorMutations {
    /// Set an author's birth year. Returns null (without writing
    /// anything) when no author has that exact name. Requires
    /// authentication.
    async fn edit_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        set_born_to: i32,
    ) -> Result<Option<Author>> {
        let user = ctx.current_user()?;
        let db = ctx.data_unchecked::<Database>();

        let Some(record) = db
            .authors()
            .get_by_name(&name)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
        else {
            return Ok(None);
        };

        db.authors()
            .set_born(&record.id, set_born_to)
            .await
            .map_err(|e| {
                user_input_error(
                    e.to_string(),
                    json!({ "name": &name, "setBornTo": set_born_to }),
                )
            })?;

        tracing::info!(
            user = %user.0.username,
            author = %record.name,
            born = set_born_to,
            "Author updated"
        );

        Ok(Some(Author {
            id: record.id,
            name: record.name,
            born: Some(set_born_to),
        }))
    }
}
