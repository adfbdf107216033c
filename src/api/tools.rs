use crate::error::{ChatError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

pub const GET_BLOGS: &str = "GetBlogs";
pub const GET_BLOG_DETAIL: &str = "GetBlogDetail";
pub const GET_PROJECTS: &str = "GetProjects";
pub const GET_PROJECT_DETAIL: &str = "GetProjectDetail";
pub const GET_SHARES: &str = "GetShares";
pub const SEARCH_CONTENT: &str = "SearchContent";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlogItem {
    #[serde(default)]
    pub title: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Minutes; the content API does not guarantee an integer.
    #[serde(default)]
    pub read_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectItem {
    #[serde(default)]
    pub title: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub technologies: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShareItem {
    #[serde(default)]
    pub title: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default, deserialize_with = "lenient_list")]
    pub blogs: Option<Vec<BlogItem>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Option<Vec<ProjectItem>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub shares: Option<Vec<ShareItem>>,
}

/// Result of a backend content lookup, typed by the tool that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Blogs(Vec<BlogItem>),
    BlogDetail(BlogItem),
    Projects(Vec<ProjectItem>),
    ProjectDetail(ProjectItem),
    Shares(Vec<ShareItem>),
    Search(SearchResults),
    /// Tools whose output is not linkable content (e.g. `GetCVDetail`).
    Unknown(String),
}

impl ToolResult {
    /// Decode a raw tool payload, which the server sends either as
    /// string-encoded JSON or as a structured value.
    pub fn decode(tool_name: &str, raw: Value) -> Result<Self> {
        let result = match tool_name {
            GET_BLOGS => ToolResult::Blogs(items(typed(raw)?)),
            GET_BLOG_DETAIL => ToolResult::BlogDetail(typed(raw)?),
            GET_PROJECTS => ToolResult::Projects(items(typed(raw)?)),
            GET_PROJECT_DETAIL => ToolResult::ProjectDetail(typed(raw)?),
            GET_SHARES => ToolResult::Shares(items(typed(raw)?)),
            SEARCH_CONTENT => ToolResult::Search(typed(raw)?),
            other => ToolResult::Unknown(other.to_string()),
        };
        Ok(result)
    }
}

fn typed<T: DeserializeOwned>(raw: Value) -> Result<T> {
    let value = match raw {
        Value::String(encoded) => serde_json::from_str(&encoded)?,
        Value::Null => {
            return Err(ChatError::Other("tool result has no payload".to_string()));
        }
        value => value,
    };
    Ok(serde_json::from_value(value)?)
}

/// Decode list entries one by one so a single malformed item only drops itself.
fn items<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(error = %e, "skipping malformed tool result item");
                None
            }
        })
        .collect()
}

fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values.map(items))
}
