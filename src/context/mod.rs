//! Rendering of retrieval results into an injectable prompt block.

use std::fmt::Write;

use crate::search::RetrievalResult;

/// Opening marker of the injected knowledge block.
pub const CONTEXT_START: &str = "[KNOWLEDGE CONTEXT - Relevant information:]";

/// Closing marker of the injected knowledge block.
pub const CONTEXT_END: &str = "[END KNOWLEDGE CONTEXT]";

/// Render results as a numbered list between explicit start/end markers.
///
/// Returns an empty string when there is nothing to inject.
#[must_use]
pub fn format_context(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut output = String::from(CONTEXT_START);
    for (position, result) in results.iter().enumerate() {
        let _ = write!(output, "\n{}. {}", position + 1, result.content.trim());
        if let Some(ref category) = result.category {
            let _ = write!(output, " ({category})");
        }
    }
    output.push('\n');
    output.push_str(CONTEXT_END);

    output
}
