use crate::api::tools::{BlogItem, ProjectItem, SearchResults, ShareItem, ToolResult};
use crate::api::ToolResultEvent;
use crate::models::{ContentReference, ContentType, ReferenceMeta};
use std::collections::HashSet;
use tracing::debug;

/// Map a tool result event to content references.
///
/// Unsuccessful invocations and payloads that fail to decode produce nothing.
pub fn references_from_event(event: &ToolResultEvent) -> Vec<ContentReference> {
    if !event.successful {
        debug!(tool = %event.tool_name, "ignoring unsuccessful tool result");
        return Vec::new();
    }

    match ToolResult::decode(&event.tool_name, event.result.clone()) {
        Ok(result) => extract_references(&result),
        Err(e) => {
            debug!(tool = %event.tool_name, error = %e, "ignoring undecodable tool result");
            Vec::new()
        }
    }
}

pub fn extract_references(result: &ToolResult) -> Vec<ContentReference> {
    match result {
        ToolResult::Blogs(blogs) => blogs.iter().map(blog_reference).collect(),
        ToolResult::BlogDetail(blog) => vec![blog_reference(blog)],
        ToolResult::Projects(projects) => projects.iter().map(project_reference).collect(),
        ToolResult::ProjectDetail(project) => vec![project_reference(project)],
        ToolResult::Shares(shares) => shares.iter().filter_map(share_reference).collect(),
        ToolResult::Search(search) => search_references(search),
        ToolResult::Unknown(_) => Vec::new(),
    }
}

fn search_references(search: &SearchResults) -> Vec<ContentReference> {
    let blogs = search.blogs.iter().flatten().map(blog_reference);
    let projects = search.projects.iter().flatten().map(project_reference);
    let shares = search.shares.iter().flatten().filter_map(share_reference);
    blogs.chain(projects).chain(shares).collect()
}

fn blog_reference(blog: &BlogItem) -> ContentReference {
    let meta = blog
        .read_time
        .filter(|minutes| *minutes > 0.0)
        .map(|minutes| ReferenceMeta {
            read_time: Some(minutes.ceil() as u32),
            ..Default::default()
        });

    ContentReference {
        content_type: ContentType::Blog,
        slug: blog.slug.clone(),
        title: blog.title.clone(),
        description: blog.excerpt.clone(),
        image: blog.featured_image.clone(),
        href: ContentType::Blog.href(&blog.slug),
        meta,
    }
}

fn project_reference(project: &ProjectItem) -> ContentReference {
    let meta = project
        .technologies
        .as_ref()
        .filter(|technologies| !technologies.is_empty())
        .map(|technologies| ReferenceMeta {
            technologies: Some(technologies.clone()),
            ..Default::default()
        });

    ContentReference {
        content_type: ContentType::Project,
        slug: project.slug.clone(),
        title: project.title.clone(),
        description: project.description.clone(),
        image: project.featured_image.clone(),
        href: ContentType::Project.href(&project.slug),
        meta,
    }
}

// Untitled shares have nothing to show on a card.
fn share_reference(share: &ShareItem) -> Option<ContentReference> {
    let title = share.title.as_ref().filter(|title| !title.is_empty())?;
    let meta = share.source_type.as_ref().map(|source_type| ReferenceMeta {
        source_type: Some(source_type.clone()),
        ..Default::default()
    });

    Some(ContentReference {
        content_type: ContentType::Share,
        slug: share.slug.clone(),
        title: Some(title.clone()),
        description: share.description.clone(),
        image: share.image_url.clone(),
        href: ContentType::Share.href(&share.slug),
        meta,
    })
}

/// Append `incoming` to `existing`, skipping any (type, slug) already present.
/// Returns how many references were added.
pub fn merge_references(
    existing: &mut Vec<ContentReference>,
    incoming: Vec<ContentReference>,
) -> usize {
    let mut seen: HashSet<(ContentType, String)> = existing
        .iter()
        .map(|r| (r.content_type, r.slug.clone()))
        .collect();

    let before = existing.len();
    for reference in incoming {
        if seen.insert((reference.content_type, reference.slug.clone())) {
            existing.push(reference);
        }
    }
    existing.len() - before
}
