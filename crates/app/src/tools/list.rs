use mcpserver::{text_result, FnToolHandler};
use serde_json::Value;

use crate::catalog::{catalog, Catalog};

/// How descriptions appear in the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStyle {
    /// First `max_chars` characters followed by `...`.
    Summary { max_chars: usize },
    /// Whole description.
    Full,
}

impl Default for ListingStyle {
    fn default() -> Self {
        ListingStyle::Summary { max_chars: 100 }
    }
}

pub fn register(srv: &mut mcpserver::Server, style: ListingStyle) {
    srv.handle_tool(super::LIST_TOOL, FnToolHandler::new(move |_args: Value| async move {
        Ok(text_result(list_videos(catalog(), style)))
    }));
}

/// One numbered entry per video, in catalog order.
pub fn list_videos(catalog: &Catalog, style: ListingStyle) -> String {
    let entries: Vec<String> = catalog
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let description = match style {
                ListingStyle::Summary { max_chars } => {
                    let prefix: String = v.description.chars().take(max_chars).collect();
                    format!("{}...", prefix)
                }
                ListingStyle::Full => v.description.to_string(),
            };
            format!("{}. {}\n   Video ID: {}\n   {}", i + 1, v.title, v.id, description)
        })
        .collect();

    format!("Available Tutorial Videos:\n\n{}", entries.join("\n\n"))
}
