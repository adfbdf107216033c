use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Project,
    Share,
}

impl ContentType {
    /// Site path the content type is served under.
    pub fn path(&self) -> &'static str {
        match self {
            ContentType::Blog => "/blog",
            ContentType::Project => "/projects",
            ContentType::Share => "/shares",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Blog => "Blog",
            ContentType::Project => "Project",
            ContentType::Share => "Share",
        }
    }

    pub fn href(&self, slug: &str) -> String {
        format!("{}/{}", self.path(), slug)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
}

/// A pointer to site content surfaced alongside an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentReference {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub slug: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ReferenceMeta>,
}

impl ContentReference {
    pub fn key(&self) -> (ContentType, &str) {
        (self.content_type, self.slug.as_str())
    }

    /// Title to show on a card, falling back to the slug.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.slug)
    }
}
