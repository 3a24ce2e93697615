//! Entity store implementations for blog types.

use chrono::{DateTime, Utc};

use crate::store::Entity;

use super::api_types::{ApiComment, ApiPost};
use super::types::{Comment, CommentUpsert, Post, PostUpsert};

/// Cache key for the post collection
pub const POSTS_CACHE_KEY: &str = "posts_cache_v1";

/// Upstream posts kept by a load
pub const POSTS_REMOTE_LIMIT: usize = 50;

// ============================================================================
// Posts: one flat collection
// ============================================================================

impl Entity for Post {
  type Scope = ();
  type Upsert = PostUpsert;
  type Remote = ApiPost;

  fn id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "post"
  }

  fn cache_key(_scope: ()) -> String {
    POSTS_CACHE_KEY.to_string()
  }

  fn load_error() -> &'static str {
    "Failed to load posts."
  }

  fn remote_limit() -> Option<usize> {
    Some(POSTS_REMOTE_LIMIT)
  }

  fn create(id: u64, _scope: (), input: PostUpsert, now: DateTime<Utc>) -> Self {
    Post {
      id,
      title: input.title,
      body: input.body,
      author: input.author,
      created_at: now,
      updated_at: now,
    }
  }

  fn apply(&mut self, input: PostUpsert, now: DateTime<Utc>) {
    self.title = input.title;
    self.body = input.body;
    self.author = input.author;
    self.updated_at = now;
  }

  fn from_remote(record: ApiPost, _scope: (), now: DateTime<Utc>) -> Self {
    Post {
      id: record.id,
      title: record.title,
      body: record.body,
      author: format!("User {}", record.user_id),
      created_at: now,
      updated_at: now,
    }
  }
}

// ============================================================================
// Comments: one collection per post id
// ============================================================================

impl Entity for Comment {
  type Scope = u64;
  type Upsert = CommentUpsert;
  type Remote = ApiComment;

  fn id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "comment"
  }

  fn cache_key(post_id: u64) -> String {
    format!("comments_cache_post_{}", post_id)
  }

  fn load_error() -> &'static str {
    "Failed to load comments."
  }

  fn create(id: u64, post_id: u64, input: CommentUpsert, now: DateTime<Utc>) -> Self {
    Comment {
      id,
      post_id,
      author: input.author,
      content: input.content,
      created_at: now,
      updated_at: now,
    }
  }

  fn apply(&mut self, input: CommentUpsert, now: DateTime<Utc>) {
    self.author = input.author;
    self.content = input.content;
    self.updated_at = now;
  }

  fn from_remote(record: ApiComment, post_id: u64, now: DateTime<Utc>) -> Self {
    Comment {
      id: record.id,
      post_id,
      author: record.email,
      content: record.body,
      created_at: now,
      updated_at: now,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_post_normalization() {
    let now = Utc::now();
    let post = Post::from_remote(
      ApiPost {
        user_id: 7,
        id: 1,
        title: "A".to_string(),
        body: "b".to_string(),
      },
      (),
      now,
    );

    assert_eq!(post.id, 1);
    assert_eq!(post.author, "User 7");
    assert_eq!(post.created_at, now);
    assert_eq!(post.updated_at, now);
  }

  #[test]
  fn test_comment_normalization_uses_scope() {
    let now = Utc::now();
    let comment = Comment::from_remote(
      ApiComment {
        post_id: 1,
        id: 4,
        name: "subject line".to_string(),
        email: "a@b.io".to_string(),
        body: "text".to_string(),
      },
      12,
      now,
    );

    assert_eq!(comment.post_id, 12);
    assert_eq!(comment.author, "a@b.io");
    assert_eq!(comment.content, "text");
  }

  #[test]
  fn test_cache_keys() {
    assert_eq!(Post::cache_key(()), "posts_cache_v1");
    assert_eq!(Comment::cache_key(5), "comments_cache_post_5");
  }

  #[test]
  fn test_persisted_shape_is_camel_case() {
    let now = Utc::now();
    let comment = Comment::create(
      1,
      2,
      CommentUpsert {
        author: "me".to_string(),
        content: "hi".to_string(),
      },
      now,
    );

    let value = serde_json::to_value(&comment).unwrap();
    assert_eq!(value["postId"], 2);
    assert!(value["createdAt"].is_string());
    assert_eq!(value["createdAt"], value["updatedAt"]);
  }
}
