//! GraphQL subscriptions for live catalog updates

use async_graphql::{Context, Subscription};
use futures::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::services::BookEvents;

use super::helpers::book_to_graphql;
use super::types::Book;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Fires for every book created via `addBook`
    async fn book_added<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Book> + 'ctx {
        let events = ctx.data_unchecked::<BookEvents>();

        BroadcastStream::new(events.subscribe())
            .filter_map(|result| result.ok().map(book_to_graphql))
    }
}
