//! Serde-deserializable types matching the upstream JSON API.
//!
//! These are kept apart from the domain types: upstream records carry a
//! numeric owner reference and free-text fields that are relabeled when a
//! collection is loaded.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPost {
  #[serde(rename = "userId")]
  pub user_id: u64,
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiComment {
  #[serde(rename = "postId")]
  pub post_id: u64,
  pub id: u64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub body: String,
}
