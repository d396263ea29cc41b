//! Shared services used by resolvers and the transport layer

pub mod events;

pub use events::BookEvents;
