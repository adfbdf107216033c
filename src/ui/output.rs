use crate::models::{ContentReference, Message, Role};
use colored::*;

/// Format a reference as a two-line card with an absolute link.
pub fn format_reference(reference: &ContentReference, site_url: &str) -> String {
    let mut heading = format!(
        "{} {}",
        format!("[{}]", reference.content_type).cyan(),
        reference.display_title().bold()
    );
    if let Some(description) = reference.description.as_deref().filter(|d| !d.is_empty()) {
        heading.push_str(&format!(" {}", format!("- {}", description).dimmed()));
    }

    let mut details = Vec::new();
    if let Some(meta) = &reference.meta {
        if let Some(minutes) = meta.read_time {
            details.push(format!("{} min read", minutes));
        }
        if let Some(technologies) = &meta.technologies {
            details.push(technologies.join(", "));
        }
        if let Some(source_type) = &meta.source_type {
            details.push(source_type.clone());
        }
    }

    let link = absolute_link(site_url, &reference.href);
    if details.is_empty() {
        format!("{}\n    {}", heading, link.dimmed())
    } else {
        format!(
            "{}\n    {} {}",
            heading,
            link.dimmed(),
            format!("({})", details.join(" | ")).dimmed()
        )
    }
}

pub fn absolute_link(site_url: &str, href: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), href)
}

pub fn display_references(references: &[ContentReference], site_url: &str) {
    if references.is_empty() {
        return;
    }
    println!("{}", "\n---\nRelated content:".dimmed());
    for reference in references {
        println!("{}", format_reference(reference, site_url));
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red(), message);
}

/// Print a restored conversation in full.
pub fn display_history(messages: &[Message], site_url: &str) {
    if messages.is_empty() {
        println!("{}", "No conversation history.".dimmed());
        return;
    }

    for message in messages {
        match message.role {
            Role::User => println!("{} {}", "you>".blue().bold(), message.content),
            Role::Assistant => {
                println!("{} {}", "assistant>".green().bold(), message.content);
                display_references(message.references(), site_url);
            }
        }
        println!();
    }
}
