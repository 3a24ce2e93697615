//! Command-line subcommands and their execution against the stores.

use clap::{Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use tracing::debug;

use crate::app::App;
use crate::blog::{Comment, CommentUpsert, Post, PostUpsert};
use crate::render;
use crate::store::{Entity, EntityState, EntityStore, RemoteSource};

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Browse and edit posts
  #[command(subcommand)]
  Posts(PostCommand),
  /// Browse and edit the comments of a post
  #[command(subcommand)]
  Comments(CommentCommand),
  /// Manage the local cache
  #[command(subcommand)]
  Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
pub enum PostCommand {
  /// List posts
  #[command(alias = "ls")]
  List {
    /// Fetch from the API even if posts are cached
    #[arg(long)]
    reload: bool,
    /// Only show posts whose title, author or body contain this text
    #[arg(short, long)]
    filter: Option<String>,
    #[arg(long, value_enum, default_value_t = SortOrder::Position)]
    sort: SortOrder,
  },
  /// Show a single post
  Show { id: u64 },
  /// Create a post
  Add {
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    body: String,
  },
  /// Edit a post; omitted fields keep their value
  Edit {
    id: u64,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    body: Option<String>,
  },
  /// Delete a post
  #[command(alias = "rm")]
  Delete { id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum CommentCommand {
  /// List the comments of a post
  #[command(alias = "ls")]
  List {
    post_id: u64,
    /// Fetch from the API even if comments are cached
    #[arg(long)]
    reload: bool,
    #[arg(long, value_enum, default_value_t = SortOrder::Position)]
    sort: SortOrder,
  },
  /// Add a comment to a post
  Add {
    post_id: u64,
    #[arg(long)]
    author: String,
    #[arg(long)]
    content: String,
  },
  /// Edit a comment; omitted fields keep their value
  Edit {
    post_id: u64,
    id: u64,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    content: Option<String>,
  },
  /// Delete a comment
  #[command(alias = "rm")]
  Delete { post_id: u64, id: u64 },
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
  /// Forget cached posts so the next list fetches from the API
  ClearPosts,
  /// Forget the cached comments of a post
  ClearComments { post_id: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
  /// Collection order (newest local entries first)
  #[default]
  Position,
  /// Most recently updated first
  Updated,
  /// Title A-Z, ignoring case (posts only; comments keep collection order)
  Title,
  /// Author A-Z, ignoring case
  Author,
}

/// How a command ended, for the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Done,
  NotFound,
  LoadFailed,
}

// ============================================================================
// Input validation
// ============================================================================

fn require(field: &str, value: &str, min_len: usize) -> Result<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(eyre!("{} is required", field));
  }
  if value.chars().count() < min_len {
    return Err(eyre!("{} must be at least {} characters", field, min_len));
  }
  Ok(value.to_string())
}

/// Check a post form: title 3+, author 2+, body 10+ characters.
pub fn validate_post(input: PostUpsert) -> Result<PostUpsert> {
  Ok(PostUpsert {
    title: require("title", &input.title, 3)?,
    author: require("author", &input.author, 2)?,
    body: require("body", &input.body, 10)?,
  })
}

/// Check a comment form: author 2+, content 5+ characters.
pub fn validate_comment(input: CommentUpsert) -> Result<CommentUpsert> {
  Ok(CommentUpsert {
    author: require("author", &input.author, 2)?,
    content: require("content", &input.content, 5)?,
  })
}

// ============================================================================
// List helpers
// ============================================================================

/// Case-insensitive match over title, author and body
pub fn post_matches(post: &Post, filter: &str) -> bool {
  let filter = filter.trim().to_lowercase();
  format!("{} {} {}", post.title, post.author, post.body)
    .to_lowercase()
    .contains(&filter)
}

trait Sortable {
  fn updated_at(&self) -> chrono::DateTime<chrono::Utc>;
  fn title(&self) -> Option<&str>;
  fn author(&self) -> &str;
}

impl Sortable for Post {
  fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
    self.updated_at
  }

  fn title(&self) -> Option<&str> {
    Some(&self.title)
  }

  fn author(&self) -> &str {
    &self.author
  }
}

impl Sortable for Comment {
  fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
    self.updated_at
  }

  fn title(&self) -> Option<&str> {
    None
  }

  fn author(&self) -> &str {
    &self.author
  }
}

// Stable sorts, so equal keys keep collection order
fn sort_entities<T: Sortable>(items: &mut [T], order: SortOrder) {
  match order {
    SortOrder::Position => {}
    SortOrder::Updated => items.sort_by_key(|item| std::cmp::Reverse(item.updated_at())),
    SortOrder::Title => items.sort_by_cached_key(|item| item.title().map(str::to_lowercase)),
    SortOrder::Author => items.sort_by_cached_key(|item| item.author().to_lowercase()),
  }
}

/// Load a scope and return the state it settled on.
///
/// Subscribes before loading so every transition is observed.
async fn load_settled<E, R>(store: &EntityStore<E, R>, scope: E::Scope, reload: bool) -> EntityState<E>
where
  E: Entity,
  R: RemoteSource<E>,
{
  let mut rx = store.state(scope);
  store.load(scope, reload).await;

  let mut last = EntityState::Idle;
  while let Ok(state) = rx.try_recv() {
    debug!(entity = E::entity_type(), ?scope, status = %state.status(), "state");
    last = state;
  }
  last
}

// ============================================================================
// Execution
// ============================================================================

pub async fn execute<R>(app: &App<R>, command: Command, out: &mut impl Write) -> Result<Outcome>
where
  R: RemoteSource<Post> + RemoteSource<Comment>,
{
  match command {
    Command::Posts(cmd) => execute_post(app, cmd, out).await,
    Command::Comments(cmd) => execute_comment(app, cmd, out).await,
    Command::Cache(cmd) => execute_cache(app, cmd, out),
  }
}

async fn execute_post<R>(app: &App<R>, command: PostCommand, out: &mut impl Write) -> Result<Outcome>
where
  R: RemoteSource<Post> + RemoteSource<Comment>,
{
  let posts = &app.posts;

  match command {
    PostCommand::List {
      reload,
      filter,
      sort,
    } => match load_settled(posts, (), reload).await {
      EntityState::Error(message) => {
        writeln!(out, "{} Run the command again to retry.", message)?;
        Ok(Outcome::LoadFailed)
      }
      state => {
        let mut rows = state.into_data();
        if let Some(filter) = filter.as_deref().filter(|f| !f.trim().is_empty()) {
          rows.retain(|post| post_matches(post, filter));
        }
        sort_entities(&mut rows, sort);
        render::posts_table(out, &rows)?;
        Ok(Outcome::Done)
      }
    },
    PostCommand::Show { id } => {
      if let EntityState::Error(message) = load_settled(posts, (), false).await {
        writeln!(out, "{}", message)?;
        return Ok(Outcome::LoadFailed);
      }
      match posts.get_by_id((), id) {
        Some(post) => {
          render::post_detail(out, &post)?;
          Ok(Outcome::Done)
        }
        None => {
          writeln!(out, "Post not found.")?;
          Ok(Outcome::NotFound)
        }
      }
    }
    PostCommand::Add {
      title,
      author,
      body,
    } => {
      let input = validate_post(PostUpsert {
        title,
        body,
        author,
      })?;
      let post = posts.create((), input)?;
      writeln!(out, "Post created successfully. (id {})", post.id)?;
      Ok(Outcome::Done)
    }
    PostCommand::Edit {
      id,
      title,
      author,
      body,
    } => {
      let Some(existing) = posts.get_by_id((), id) else {
        writeln!(out, "Post not found.")?;
        return Ok(Outcome::NotFound);
      };
      let input = validate_post(PostUpsert {
        title: title.unwrap_or(existing.title),
        body: body.unwrap_or(existing.body),
        author: author.unwrap_or(existing.author),
      })?;
      match posts.update((), id, input)? {
        Some(_) => {
          writeln!(out, "Post updated.")?;
          Ok(Outcome::Done)
        }
        None => {
          writeln!(out, "Post not found.")?;
          Ok(Outcome::NotFound)
        }
      }
    }
    PostCommand::Delete { id } => {
      if posts.delete((), id)? {
        writeln!(out, "Post deleted.")?;
        Ok(Outcome::Done)
      } else {
        writeln!(out, "Post not found.")?;
        Ok(Outcome::NotFound)
      }
    }
  }
}

async fn execute_comment<R>(
  app: &App<R>,
  command: CommentCommand,
  out: &mut impl Write,
) -> Result<Outcome>
where
  R: RemoteSource<Post> + RemoteSource<Comment>,
{
  let comments = &app.comments;

  match command {
    CommentCommand::List {
      post_id,
      reload,
      sort,
    } => {
      // Header from whatever is cached; the posts scope is not loaded here
      match app.posts.get_by_id((), post_id) {
        Some(post) => writeln!(out, "Comments on #{} {}", post.id, post.title)?,
        None => writeln!(out, "Comments on post #{}", post_id)?,
      }

      match load_settled(comments, post_id, reload).await {
        EntityState::Error(message) => {
          writeln!(out, "{} Run the command again to retry.", message)?;
          Ok(Outcome::LoadFailed)
        }
        state => {
          let mut rows = state.into_data();
          sort_entities(&mut rows, sort);
          render::comments_table(out, &rows)?;
          Ok(Outcome::Done)
        }
      }
    }
    CommentCommand::Add {
      post_id,
      author,
      content,
    } => {
      let input = validate_comment(CommentUpsert { author, content })?;
      let comment = comments.create(post_id, input)?;
      writeln!(out, "Comment added. (id {})", comment.id)?;
      Ok(Outcome::Done)
    }
    CommentCommand::Edit {
      post_id,
      id,
      author,
      content,
    } => {
      let Some(existing) = comments.get_by_id(post_id, id) else {
        writeln!(out, "Comment not found.")?;
        return Ok(Outcome::NotFound);
      };
      let input = validate_comment(CommentUpsert {
        author: author.unwrap_or(existing.author),
        content: content.unwrap_or(existing.content),
      })?;
      match comments.update(post_id, id, input)? {
        Some(_) => {
          writeln!(out, "Comment updated.")?;
          Ok(Outcome::Done)
        }
        None => {
          writeln!(out, "Comment not found.")?;
          Ok(Outcome::NotFound)
        }
      }
    }
    CommentCommand::Delete { post_id, id } => {
      if comments.delete(post_id, id)? {
        writeln!(out, "Comment deleted.")?;
        Ok(Outcome::Done)
      } else {
        writeln!(out, "Comment not found.")?;
        Ok(Outcome::NotFound)
      }
    }
  }
}

fn execute_cache<R>(app: &App<R>, command: CacheCommand, out: &mut impl Write) -> Result<Outcome>
where
  R: RemoteSource<Post> + RemoteSource<Comment>,
{
  match command {
    CacheCommand::ClearPosts => {
      app.posts.clear_cache(())?;
      writeln!(out, "Cached posts cleared.")?;
    }
    CacheCommand::ClearComments { post_id } => {
      app.comments.clear_cache(post_id)?;
      writeln!(out, "Cached comments for post #{} cleared.", post_id)?;
    }
  }
  Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blog::{ApiComment, ApiPost};
  use crate::cache::MemoryStorage;
  use std::sync::Arc;

  /// Remote serving fixed data, or failing everything
  #[derive(Clone)]
  struct FixedRemote {
    fail: bool,
  }

  impl RemoteSource<Post> for FixedRemote {
    async fn fetch(&self, _scope: ()) -> Result<Vec<ApiPost>> {
      if self.fail {
        return Err(eyre!("offline"));
      }
      Ok(vec![
        ApiPost {
          user_id: 1,
          id: 1,
          title: "Rust ownership".to_string(),
          body: "Borrowing explained".to_string(),
        },
        ApiPost {
          user_id: 2,
          id: 2,
          title: "Gardening".to_string(),
          body: "Tomatoes in spring".to_string(),
        },
      ])
    }
  }

  impl RemoteSource<Comment> for FixedRemote {
    async fn fetch(&self, post_id: u64) -> Result<Vec<ApiComment>> {
      if self.fail {
        return Err(eyre!("offline"));
      }
      Ok(vec![ApiComment {
        post_id,
        id: 1,
        name: "first".to_string(),
        email: "reader@example.com".to_string(),
        body: "Great read".to_string(),
      }])
    }
  }

  fn app(fail: bool) -> App<FixedRemote> {
    App::with_parts(Arc::new(MemoryStorage::new()), FixedRemote { fail }, 50)
  }

  async fn run(app: &App<FixedRemote>, command: Command) -> (Outcome, String) {
    let mut out = Vec::new();
    let outcome = execute(app, command, &mut out).await.unwrap();
    (outcome, String::from_utf8(out).unwrap())
  }

  fn post_input(title: &str, author: &str, body: &str) -> PostUpsert {
    PostUpsert {
      title: title.to_string(),
      author: author.to_string(),
      body: body.to_string(),
    }
  }

  #[test]
  fn test_validate_post_trims_and_accepts() {
    let input = validate_post(post_input("  Hello ", " Al ", "long enough body")).unwrap();
    assert_eq!(input.title, "Hello");
    assert_eq!(input.author, "Al");
  }

  #[test]
  fn test_validate_post_rejects_short_fields() {
    assert!(validate_post(post_input("Hi", "Al", "long enough body")).is_err());
    assert!(validate_post(post_input("Hello", "A", "long enough body")).is_err());
    assert!(validate_post(post_input("Hello", "Al", "too short")).is_err());
    assert!(validate_post(post_input("   ", "Al", "long enough body")).is_err());
  }

  #[test]
  fn test_validate_comment() {
    let ok = CommentUpsert {
      author: "Jo".to_string(),
      content: "Nice!".to_string(),
    };
    assert!(validate_comment(ok).is_ok());

    let short = CommentUpsert {
      author: "Jo".to_string(),
      content: "Hm".to_string(),
    };
    assert!(validate_comment(short).is_err());
  }

  #[test]
  fn test_post_matches_is_case_insensitive() {
    let now = chrono::Utc::now();
    let post = Post {
      id: 1,
      title: "Rust Ownership".to_string(),
      body: "Borrowing".to_string(),
      author: "User 3".to_string(),
      created_at: now,
      updated_at: now,
    };
    assert!(post_matches(&post, "ownership"));
    assert!(post_matches(&post, " user 3 "));
    assert!(post_matches(&post, "BORROW"));
    assert!(!post_matches(&post, "gardening"));
  }

  #[test]
  fn test_sort_by_title_and_author_ignores_case() {
    let now = chrono::Utc::now();
    let post = |id, title: &str, author: &str| Post {
      id,
      title: title.to_string(),
      body: "Body text here".to_string(),
      author: author.to_string(),
      created_at: now,
      updated_at: now,
    };
    let mut posts = vec![
      post(1, "zebra", "bob"),
      post(2, "Apple", "Carol"),
      post(3, "mango", "alice"),
    ];

    sort_entities(&mut posts, SortOrder::Title);
    let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);

    sort_entities(&mut posts, SortOrder::Author);
    let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);

    let comment = |id, author: &str| Comment {
      id,
      post_id: 1,
      author: author.to_string(),
      content: "Nice post".to_string(),
      created_at: now,
      updated_at: now,
    };
    let mut comments = vec![comment(1, "Zed"), comment(2, "amy")];

    // Comments have no title, so order is kept
    sort_entities(&mut comments, SortOrder::Title);
    let ids: Vec<u64> = comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);

    sort_entities(&mut comments, SortOrder::Author);
    let ids: Vec<u64> = comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1]);
  }

  #[tokio::test]
  async fn test_list_posts_with_filter() {
    let app = app(false);
    let (outcome, text) = run(
      &app,
      Command::Posts(PostCommand::List {
        reload: false,
        filter: Some("rust".to_string()),
        sort: SortOrder::Position,
      }),
    )
    .await;

    assert_eq!(outcome, Outcome::Done);
    assert!(text.contains("Rust ownership"));
    assert!(!text.contains("Gardening"));
  }

  #[tokio::test]
  async fn test_list_posts_failure() {
    let app = app(true);
    let (outcome, text) = run(
      &app,
      Command::Posts(PostCommand::List {
        reload: false,
        filter: None,
        sort: SortOrder::Position,
      }),
    )
    .await;

    assert_eq!(outcome, Outcome::LoadFailed);
    assert!(text.starts_with("Failed to load posts."));
  }

  #[tokio::test]
  async fn test_sort_by_updated_puts_edited_first() {
    let app = app(false);
    app.posts.load((), false).await;
    app
      .posts
      .update((), 2, post_input("Gardening again", "Al", "Tomatoes in summer"))
      .unwrap();

    let (_, text) = run(
      &app,
      Command::Posts(PostCommand::List {
        reload: false,
        filter: None,
        sort: SortOrder::Updated,
      }),
    )
    .await;

    let first_row = text.lines().nth(1).unwrap();
    assert!(first_row.contains("Gardening again"));
  }

  #[tokio::test]
  async fn test_add_edit_delete_post() {
    let app = app(false);

    let (outcome, text) = run(
      &app,
      Command::Posts(PostCommand::Add {
        title: "New post".to_string(),
        author: "Me".to_string(),
        body: "Some body text".to_string(),
      }),
    )
    .await;
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(text, "Post created successfully. (id 1)\n");

    let (outcome, text) = run(
      &app,
      Command::Posts(PostCommand::Edit {
        id: 1,
        title: Some("Renamed post".to_string()),
        author: None,
        body: None,
      }),
    )
    .await;
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(text, "Post updated.\n");
    let post = app.posts.get_by_id((), 1).unwrap();
    assert_eq!(post.title, "Renamed post");
    assert_eq!(post.body, "Some body text");

    let (outcome, text) = run(&app, Command::Posts(PostCommand::Delete { id: 1 })).await;
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(text, "Post deleted.\n");

    let (outcome, text) = run(&app, Command::Posts(PostCommand::Delete { id: 1 })).await;
    assert_eq!(outcome, Outcome::NotFound);
    assert_eq!(text, "Post not found.\n");
  }

  #[tokio::test]
  async fn test_add_post_rejects_invalid_input() {
    let app = app(false);
    let mut out = Vec::new();
    let result = execute(
      &app,
      Command::Posts(PostCommand::Add {
        title: "No".to_string(),
        author: "Me".to_string(),
        body: "Some body text".to_string(),
      }),
      &mut out,
    )
    .await;

    assert!(result.is_err());
    assert!(app.posts.get_by_id((), 1).is_none());
  }

  #[tokio::test]
  async fn test_comments_list_uses_cached_post_title() {
    let app = app(false);
    app.posts.load((), false).await;

    let (outcome, text) = run(
      &app,
      Command::Comments(CommentCommand::List {
        post_id: 1,
        reload: false,
        sort: SortOrder::Position,
      }),
    )
    .await;

    assert_eq!(outcome, Outcome::Done);
    assert!(text.starts_with("Comments on #1 Rust ownership"));
    assert!(text.contains("reader@example.com"));
  }

  #[tokio::test]
  async fn test_comment_not_found() {
    let app = app(false);
    let (outcome, text) = run(
      &app,
      Command::Comments(CommentCommand::Edit {
        post_id: 1,
        id: 5,
        author: None,
        content: Some("changed".to_string()),
      }),
    )
    .await;

    assert_eq!(outcome, Outcome::NotFound);
    assert_eq!(text, "Comment not found.\n");
  }

  #[tokio::test]
  async fn test_clear_posts_cache() {
    let app = app(false);
    app.posts.create((), post_input("Local", "Me", "Only here locally")).unwrap();

    let (outcome, _) = run(&app, Command::Cache(CacheCommand::ClearPosts)).await;
    assert_eq!(outcome, Outcome::Done);

    // The cleared cache sends the next load to the remote
    app.posts.load((), false).await;
    assert_eq!(app.posts.snapshot(()).data().len(), 2);
  }
}
