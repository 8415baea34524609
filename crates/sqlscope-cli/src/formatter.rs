//! Output formatting for parse results.
//!
//! Supports JSON and indented tree output.

use sqlscope_sql::Node;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON, the same text written to the output file.
    Json,
    /// One node per line, indented by depth.
    Tree,
}

/// Formats a parse result according to the specified format.
pub fn format_tree(tree: &Node, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => tree.to_json_pretty(),
        OutputFormat::Tree => Ok(tree.display_tree()),
    }
}
