//! Editable fields accompanying a tree but not part of it.

use serde::{Deserialize, Serialize};

/// Draft/published lifecycle of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    #[default]
    Draft,
    Published,
}

impl LifecycleStatus {
    pub fn is_published(self) -> bool {
        matches!(self, LifecycleStatus::Published)
    }
}

/// Metadata persisted alongside the content tree on save.
///
/// Created with defaults when authoring from scratch, or populated from an
/// existing storage row when editing. Which fields are meaningful for a given
/// entity type is the persistence router's concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub slug: String,
    pub meta_description: String,
    pub category_id: Option<String>,
    pub status: LifecycleStatus,
    /// Scheduled publish time, RFC 3339.
    pub published_at: Option<String>,
}

impl PageMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self {
            title,
            slug,
            ..Self::default()
        }
    }
}

/// Derive a URL slug from a title: lowercase, non-alphanumeric runs become
/// single hyphens, leading/trailing hyphens trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_was_hyphen = true; // swallows leading separators
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
