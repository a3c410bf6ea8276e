use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Unsaved group; the slug is always derived from the title.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl NewGroup {
    pub fn new(title: String, description: String) -> Result<Self, DomainError> {
        let title = title.trim().to_string();
        let slug = slugify(&title)?;
        Ok(Self {
            title,
            slug,
            description,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Group {
    /// Applies changes in place, recomputing the slug when the title is touched.
    pub fn apply(&mut self, changes: GroupChanges) -> Result<(), DomainError> {
        if let Some(title) = changes.title {
            let title = title.trim().to_string();
            self.slug = slugify(&title)?;
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        Ok(())
    }
}

/// Compact group reference embedded into feed items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Accents are folded away (NFKD, non-ASCII dropped), punctuation is removed,
/// and runs of whitespace or dashes become a single `-`.
pub fn slugify(title: &str) -> Result<String, DomainError> {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.nfkd().filter(char::is_ascii).map(|c| c.to_ascii_lowercase()) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch == '-' || ch.is_ascii_whitespace() {
            pending_dash = true;
        }
    }

    let slug = slug.trim_matches(|c| c == '-' || c == '_').to_string();
    if slug.is_empty() {
        return Err(DomainError::validation(
            "title",
            "title must contain at least one latin letter or digit",
        ));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercase_and_dashed() {
        assert_eq!(slugify("Tech").unwrap(), "tech");
        assert_eq!(slugify("  Rust & Go: news!  ").unwrap(), "rust-go-news");
        assert_eq!(slugify("snake_case title").unwrap(), "snake_case-title");
        assert_eq!(slugify("__edge__").unwrap(), "edge");
        assert_eq!(slugify("self - hosted").unwrap(), "self-hosted");
    }

    #[test]
    fn slug_folds_accents_and_drops_apostrophes() {
        assert_eq!(slugify("Café Culture").unwrap(), "cafe-culture");
        assert_eq!(slugify("Don't Panic").unwrap(), "dont-panic");
        assert_eq!(slugify("Ångström Über").unwrap(), "angstrom-uber");
    }

    #[test]
    fn slug_without_ascii_is_rejected() {
        let err = slugify("Котики").unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
        assert!(slugify("!!!").is_err());
    }

    #[test]
    fn renaming_recomputes_slug() {
        let mut group = Group {
            id: 1,
            title: "Tech".into(),
            slug: "tech".into(),
            description: String::new(),
        };
        group
            .apply(GroupChanges {
                title: Some("Tech Talk".into()),
                description: None,
            })
            .unwrap();
        assert_eq!(group.slug, "tech-talk");
        assert_eq!(group.title, "Tech Talk");
    }

    #[test]
    fn description_change_keeps_slug() {
        let mut group = Group {
            id: 1,
            title: "Tech".into(),
            slug: "tech".into(),
            description: String::new(),
        };
        group
            .apply(GroupChanges {
                title: None,
                description: Some("all things tech".into()),
            })
            .unwrap();
        assert_eq!(group.slug, "tech");
        assert_eq!(group.description, "all things tech");
    }
}
