//! Plain-text rendering of the feed.

use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};
use social_shared::dto::{CommentResponse, PostResponse};

const TIMESTAMP_FORMAT: &str = "%B %d, %Y at %I:%M %p";
const RULE: &str = "------------------------------------------------------------";

/// Feed totals shown in the stats panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub posts: usize,
    pub images: usize,
}

impl Stats {
    pub fn of(posts: &[PostResponse]) -> Self {
        Self {
            posts: posts.len(),
            images: posts.iter().filter(|p| p.image.is_some()).count(),
        }
    }
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn comment_line(comment: &CommentResponse) -> String {
    format!("{}: {}", comment.user.username, comment.content)
}

/// One post as a card, timestamps in local time.
pub fn post_card(post: &PostResponse) -> String {
    card(post, &post.created_at.with_timezone(&Local))
}

fn card<Tz: TimeZone>(post: &PostResponse, created_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Post #{}", post.id);
    let _ = writeln!(out, "By {}", post.user.username);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", post.content);
    if let Some(image) = &post.image {
        let _ = writeln!(out, "[image] {image}");
    }
    if post.comments_count > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "Comments ({})", post.comments_count);
        for comment in &post.comments {
            let _ = writeln!(out, "  {}", comment_line(comment));
        }
    }
    let _ = writeln!(out);
    let _ = write!(out, "{}", format_timestamp(created_at));
    out
}

pub fn feed(posts: &[PostResponse]) -> String {
    if posts.is_empty() {
        return "No posts yet. Be the first!".to_string();
    }
    posts
        .iter()
        .map(post_card)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stats(stats: Stats) -> String {
    format!("Posts:  {}\nImages: {}", stats.posts, stats.images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use social_shared::dto::UserResponse;

    fn user(name: &str) -> UserResponse {
        UserResponse {
            id: 1,
            username: name.to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn post(id: i64, image: Option<&str>, comments: Vec<CommentResponse>) -> PostResponse {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        PostResponse {
            id,
            user: user("alice"),
            content: "Hello".to_string(),
            image: image.map(str::to_string),
            comments_count: comments.len(),
            comments,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();

        assert_eq!(format_timestamp(&at), "March 05, 2024 at 02:07 PM");
    }

    #[test]
    fn test_card_lists_comments() {
        let comment = CommentResponse {
            id: 9,
            post: 1,
            user: user("bob"),
            content: "Nice!".to_string(),
            created_at: Utc::now(),
        };
        let post = post(1, Some("http://localhost:8000/media/posts/a.png"), vec![comment]);

        let text = card(&post, &post.created_at);

        assert!(text.contains("Post #1"));
        assert!(text.contains("By alice"));
        assert!(text.contains("[image] http://localhost:8000/media/posts/a.png"));
        assert!(text.contains("Comments (1)"));
        assert!(text.contains("  bob: Nice!"));
        assert!(text.ends_with("March 05, 2024 at 02:07 PM"));
    }

    #[test]
    fn test_card_without_comments_or_image() {
        let post = post(2, None, Vec::new());

        let text = card(&post, &post.created_at);

        assert!(!text.contains("[image]"));
        assert!(!text.contains("Comments"));
    }

    #[test]
    fn test_stats_count_images() {
        let posts = vec![
            post(1, Some("/media/posts/a.png"), Vec::new()),
            post(2, None, Vec::new()),
            post(3, Some("/media/posts/b.gif"), Vec::new()),
        ];

        assert_eq!(Stats::of(&posts), Stats { posts: 3, images: 2 });
        assert_eq!(feed(&[]), "No posts yet. Be the first!");
    }
}
