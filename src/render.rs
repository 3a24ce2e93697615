//! Plain-text rendering of collections for the command line.

use chrono::{DateTime, Utc};
use std::io::Write;

use crate::blog::{Comment, Post};

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Render a timestamp the way list views show it
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
  ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn posts_table(out: &mut impl Write, posts: &[Post]) -> std::io::Result<()> {
  if posts.is_empty() {
    return writeln!(out, "No posts yet.");
  }

  writeln!(out, "{:>5}  {:<40}  {:<16}  {}", "ID", "TITLE", "AUTHOR", "UPDATED")?;
  for post in posts {
    writeln!(
      out,
      "{:>5}  {:<40}  {:<16}  {}",
      post.id,
      truncate(&post.title, 40),
      truncate(&post.author, 16),
      format_timestamp(&post.updated_at)
    )?;
  }
  Ok(())
}

pub fn post_detail(out: &mut impl Write, post: &Post) -> std::io::Result<()> {
  writeln!(out, "#{} {}", post.id, post.title)?;
  writeln!(out, "by {}", post.author)?;
  writeln!(
    out,
    "created {}, updated {}",
    format_timestamp(&post.created_at),
    format_timestamp(&post.updated_at)
  )?;
  writeln!(out)?;
  writeln!(out, "{}", post.body)
}

pub fn comments_table(out: &mut impl Write, comments: &[Comment]) -> std::io::Result<()> {
  if comments.is_empty() {
    return writeln!(out, "No comments yet.");
  }

  writeln!(out, "{:>5}  {:<24}  {:<40}  {}", "ID", "AUTHOR", "CONTENT", "UPDATED")?;
  for comment in comments {
    // Content may span lines upstream; keep one row per comment
    let content = comment.content.replace('\n', " ");
    writeln!(
      out,
      "{:>5}  {:<24}  {:<40}  {}",
      comment.id,
      truncate(&comment.author, 24),
      truncate(&content, 40),
      format_timestamp(&comment.updated_at)
    )?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("ééééééé", 5), "éé...");
  }

  #[test]
  fn test_empty_tables() {
    let mut out = Vec::new();
    posts_table(&mut out, &[]).unwrap();
    comments_table(&mut out, &[]).unwrap();
    assert_eq!(
      String::from_utf8(out).unwrap(),
      "No posts yet.\nNo comments yet.\n"
    );
  }

  #[test]
  fn test_comment_rows_are_single_line() {
    let now = Utc::now();
    let comment = Comment {
      id: 1,
      post_id: 1,
      author: "a@b.io".to_string(),
      content: "line one\nline two".to_string(),
      created_at: now,
      updated_at: now,
    };

    let mut out = Vec::new();
    comments_table(&mut out, &[comment]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("line one line two"));
  }
}
