//! Client-side state for the monitor feed.
//!
//! [`FeedState`] is a plain value updated by [`Message`]s; [`FeedStore`] owns the only
//! writer, talks to the HTTP API through [`FeedApi`] and publishes every new state to
//! subscribers.

pub mod api;
pub mod persist;
pub mod sort;
pub mod state;
pub mod store;

pub use api::{FeedApi, HttpFeedApi};
pub use persist::{JsonFileSelection, MemorySelection, SelectionStorage};
pub use sort::sort_posts;
pub use state::{FeedState, Message};
pub use store::FeedStore;
