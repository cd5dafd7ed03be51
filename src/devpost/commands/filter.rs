use crate::model::{Post, Tags};

/// Number of characters shown for a collapsed description.
pub const PREVIEW_CHARS: usize = 100;

/// Client-side list filter. Blank fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Case-insensitive substring of the title.
    pub title: String,
    /// Case-insensitive substring of any tag.
    pub tag: String,
    /// Exact `YYYY-MM-DD` date.
    pub date: String,
}

impl Criteria {
    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.tag.is_empty() && self.date.is_empty()
    }
}

/// True when the post passes all three criteria.
pub fn apply<P: Post + ?Sized>(post: &P, criteria: &Criteria) -> bool {
    title_matches(post.title(), &criteria.title)
        && tag_matches(post.tags(), &criteria.tag)
        && (criteria.date.is_empty() || post.date() == criteria.date)
}

fn title_matches(title: &str, needle: &str) -> bool {
    needle.is_empty() || title.to_lowercase().contains(&needle.to_lowercase())
}

fn tag_matches(tags: &Tags, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    match tags {
        Tags::Multiple(list) => list.iter().any(|t| t.to_lowercase().contains(&needle)),
        Tags::Single(s) => s.to_lowercase().contains(&needle),
        // Unknown shapes never match a real criterion.
        Tags::Malformed(_) => false,
    }
}

/// Collapsed form of a description: the first [`PREVIEW_CHARS`] characters
/// followed by `...`, or the text itself when it is short enough.
pub fn short_description(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
