//! In-process event hub backing GraphQL subscriptions
//!
//! `addBook` publishes each created book here; the `bookAdded`
//! subscription streams them to connected WebSocket clients.

use tokio::sync::broadcast;

use crate::db::BookWithAuthor;

/// Slow subscribers past this many pending events start losing the
/// oldest ones.
const CHANNEL_CAPACITY: usize = 64;

/// Broadcast hub for book creation events. Cheap to clone; all clones
/// share the same channel.
#[derive(Clone)]
pub struct BookEvents {
    sender: broadcast::Sender<BookWithAuthor>,
}

impl BookEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a newly created book. A send error only means nobody is
    /// subscribed right now.
    pub fn publish_book_added(&self, book: BookWithAuthor) {
        let _ = self.sender.send(book);
    }

    /// Subscribe to book creation events
    pub fn subscribe(&self) -> broadcast::Receiver<BookWithAuthor> {
        self.sender.subscribe()
    }
}

impl Default for BookEvents {
    fn default() -> Self {
        Self::new()
    }
}
