use color_eyre::Result;
use std::sync::Arc;

use crate::blog::{BlogClient, Comment, CommentStore, Post, PostStore};
use crate::cache::{KeyValueStore, MemoryStorage, SqliteStorage};
use crate::config::{CacheBackend, Config};
use crate::store::{EntityStore, RemoteSource};

/// Application state: both entity stores over one shared cache
pub struct App<R = BlogClient> {
  pub posts: PostStore<R>,
  pub comments: CommentStore<R>,
}

impl App<BlogClient> {
  /// Build the stores described by `config`.
  pub fn new(config: &Config) -> Result<Self> {
    let storage: Arc<dyn KeyValueStore> = match config.cache.backend {
      CacheBackend::Sqlite => Arc::new(SqliteStorage::open(config.cache.path.as_deref())?),
      CacheBackend::Memory => Arc::new(MemoryStorage::new()),
    };
    let client = BlogClient::new(config)?;

    Ok(Self::with_parts(storage, client, config.api.post_limit))
  }
}

impl<R> App<R>
where
  R: RemoteSource<Post> + RemoteSource<Comment> + Clone,
{
  /// Build the stores from an explicit cache and remote source.
  pub fn with_parts(storage: Arc<dyn KeyValueStore>, remote: R, post_limit: usize) -> Self {
    Self {
      posts: EntityStore::new(Arc::clone(&storage), remote.clone())
        .with_remote_limit(Some(post_limit)),
      comments: EntityStore::new(storage, remote),
    }
  }
}
