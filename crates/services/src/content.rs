use std::path::Path;

use quiz_core::model::ContentData;
use tracing::{info, warn};

use crate::error::ContentError;

/// Parse a content set from JSON and report authoring problems.
///
/// Problems are logged, not rejected: a malformed question still loads and
/// fails only when a session tries to show it.
///
/// # Errors
///
/// Returns `ContentError::Json` if the text is not a valid content document.
pub fn parse_content(json: &str) -> Result<ContentData, ContentError> {
    let content: ContentData = serde_json::from_str(json)?;
    for issue in content.validate() {
        warn!(%issue, "content issue");
    }
    info!(
        version = %content.version,
        categories = content.quiz_categories.len(),
        questions = content.question_count(),
        topics = content.topics.len(),
        "content loaded"
    );
    Ok(content)
}

/// Read and parse a content file.
///
/// # Errors
///
/// Returns `ContentError::Io` if the file cannot be read.
/// Returns `ContentError::Json` if its contents are invalid.
pub async fn load_content(path: impl AsRef<Path>) -> Result<ContentData, ContentError> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_content(&text)
}
