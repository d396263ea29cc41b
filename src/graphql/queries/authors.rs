use super::prelude::*;

#[derive(Default)]
pub struct AuthorQueries;

#[Object]
impl AuthorQueries {
    /// Total number of authors in the catalog
    async fn author_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let db = ctx.data_unchecked::<Database>();
        db.authors()
            .count()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    /// All authors. Requesting `bookCount` here issues one count query
    /// per returned author.
    async fn all_authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let db = ctx.data_unchecked::<Database>();
        let records = db
            .authors()
            .list_all()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(author_to_graphql).collect())
    }
}
