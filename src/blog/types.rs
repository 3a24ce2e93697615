use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post, the top-level entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub id: u64,
  pub title: String,
  pub body: String,
  pub author: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUpsert {
  pub title: String,
  pub body: String,
  pub author: String,
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: u64,
  /// Parent post, fixed at creation
  pub post_id: u64,
  pub author: String,
  pub content: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Mutable fields of a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentUpsert {
  pub author: String,
  pub content: String,
}
