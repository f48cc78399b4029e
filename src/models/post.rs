//! Post data structure.

use serde::{Deserialize, Serialize};

/// A single entry from the results listing.
///
/// Two posts are the same post iff both `title` and `url` match exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Post {
    /// Link text, trimmed
    pub title: String,

    /// Link target as it appears in the page (absolute or relative), trimmed
    pub url: String,
}

/// All posts seen at the last successful cycle, in page order.
pub type Snapshot = Vec<Post>;

impl Post {
    /// Create a post, trimming surrounding whitespace from both fields.
    pub fn new(title: impl AsRef<str>, url: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            url: url.as_ref().trim().to_string(),
        }
    }

    /// The `- {title} ({url})` line used in mail bodies and change logs.
    pub fn line(&self) -> String {
        format!("- {} ({})", self.title, self.url)
    }
}
