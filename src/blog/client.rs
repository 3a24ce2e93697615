use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::store::RemoteSource;

use super::api_types::{ApiComment, ApiPost};
use super::types::{Comment, Post};

/// Read-only client for the upstream posts/comments API
#[derive(Clone)]
pub struct BlogClient {
  http: reqwest::Client,
  base_url: Url,
}

impl BlogClient {
  pub fn new(config: &Config) -> Result<Self> {
    let mut base_url = Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    // Relative joins replace the last segment unless the path ends in a slash
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("postcache/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// URL listing every post
  pub fn posts_url(&self) -> Result<Url> {
    self
      .base_url
      .join("posts")
      .map_err(|e| eyre!("Failed to build posts URL: {}", e))
  }

  /// URL listing the comments of one post
  pub fn comments_url(&self, post_id: u64) -> Result<Url> {
    let mut url = self
      .base_url
      .join("comments")
      .map_err(|e| eyre!("Failed to build comments URL: {}", e))?;
    url
      .query_pairs_mut()
      .append_pair("postId", &post_id.to_string());
    Ok(url)
  }

  /// Get all posts
  pub async fn get_posts(&self) -> Result<Vec<ApiPost>> {
    self.get_json(self.posts_url()?).await
  }

  /// Get the comments of a post
  pub async fn get_comments(&self, post_id: u64) -> Result<Vec<ApiComment>> {
    self.get_json(self.comments_url(post_id)?).await
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }
}

impl RemoteSource<Post> for BlogClient {
  async fn fetch(&self, _scope: ()) -> Result<Vec<ApiPost>> {
    self.get_posts().await
  }
}

impl RemoteSource<Comment> for BlogClient {
  async fn fetch(&self, post_id: u64) -> Result<Vec<ApiComment>> {
    self.get_comments(post_id).await
  }
}
