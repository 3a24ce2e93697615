//! Posts and comments: domain types, upstream shapes and the API client.

mod api_types;
mod client;
mod entity;
mod types;

pub use api_types::{ApiComment, ApiPost};
pub use client::BlogClient;
pub use entity::{POSTS_CACHE_KEY, POSTS_REMOTE_LIMIT};
pub use types::{Comment, CommentUpsert, Post, PostUpsert};

use crate::store::EntityStore;

/// Store for the flat post collection
pub type PostStore<R = BlogClient> = EntityStore<Post, R>;

/// Store for comment collections, scoped by post id
pub type CommentStore<R = BlogClient> = EntityStore<Comment, R>;
