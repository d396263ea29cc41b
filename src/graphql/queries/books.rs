use super::prelude::*;

#[derive(Default)]
pub struct BookQueries;

#[Object]
impl BookQueries {
    /// Total number of books in the catalog
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        let db = ctx.data_unchecked::<Database>();
        db.books()
            .count()
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))
    }

    /// All books, optionally filtered by author name and/or genre.
    /// Both filters compose; genre matching is exact and case-sensitive.
    async fn all_books(
        &self,
        ctx: &Context<'_>,
        author: Option<String>,
        genre: Option<String>,
    ) -> Result<Vec<Book>> {
        let db = ctx.data_unchecked::<Database>();

        // An author filter naming nobody resolves to an empty result,
        // never an error.
        let author_id = match author {
            Some(name) => {
                let record = db
                    .authors()
                    .get_by_name(&name)
                    .await
                    .map_err(|e| async_graphql::Error::new(e.to_string()))?;
                match record {
                    Some(a) => Some(a.id),
                    None => return Ok(Vec::new()),
                }
            }
            None => None,
        };

        let records = db
            .books()
            .list(BookFilter { author_id, genre })
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        Ok(records.into_iter().map(book_to_graphql).collect())
    }
}
