//! Domain entities - the core business objects.

mod comment;
mod post;
mod user;

pub use comment::{Comment, CommentView, NewComment};
pub use post::{NewPost, Post, PostView};
pub use user::{NewUser, User};

const PREVIEW_CHARS: usize = 50;

/// First 50 characters of `content`, with `...` appended when it was cut.
pub fn content_preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::content_preview;

    #[test]
    fn short_content_is_unchanged() {
        assert_eq!(content_preview("Hello"), "Hello");
        assert_eq!(content_preview(&"a".repeat(50)), "a".repeat(50));
    }

    #[test]
    fn long_content_is_cut_on_char_boundary() {
        let text = "é".repeat(60);
        let preview = content_preview(&text);
        assert_eq!(preview, format!("{}...", "é".repeat(50)));
    }
}
