use super::prelude::*;

#[derive(Default)]
pub struct BookMutations;

#[Object]
impl BookMutations {
    /// Add a book, creating its author first if no author with that
    /// exact name exists yet. Requires authentication.
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        published: i32,
        author: String,
        genres: Vec<String>,
    ) -> Result<Book> {
        let user = ctx.current_user()?;
        let db = ctx.data_unchecked::<Database>();
        let events = ctx.data_unchecked::<BookEvents>();

        let invalid_args = json!({
            "title": &title,
            "published": published,
            "author": &author,
            "genres": &genres,
        });

        // Auto-vivify the author. Lookup-then-create is not atomic:
        // two concurrent calls for a brand-new name can race and both
        // insert, leaving two authors with the same name.
        let existing = db
            .authors()
            .get_by_name(&author)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        let author_record = match existing {
            Some(a) => a,
            None => db
                .authors()
                .create(CreateAuthor {
                    name: author.clone(),
                    born: None,
                })
                .await
                .map_err(|e| user_input_error(e.to_string(), invalid_args.clone()))?,
        };

        let record = db
            .books()
            .create(CreateBook {
                title,
                published,
                author_id: author_record.id.clone(),
                genres,
            })
            .await
            .map_err(|e| user_input_error(e.to_string(), invalid_args))?;

        tracing::info!(
            user = %user.0.username,
            book_id = %record.id,
            title = %record.title,
            author = %author_record.name,
            "Book added"
        );

        let created = BookWithAuthor {
            book: record,
            author: author_record,
        };
        events.publish_book_added(created.clone());

        Ok(book_to_graphql(created))
    }
}
