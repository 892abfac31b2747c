//! Result items returned by operations.

use serde::Serialize;
use std::path::Path;

/// A single item of an operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// Human-readable text.
    Text { text: String },
    /// A reference to a resource the caller can fetch separately.
    Resource {
        uri: String,
        name: String,
        description: String,
    },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Reference to the full content of the file at `path`.
    pub fn file_ref(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::Resource {
            uri: file_uri(path),
            name: format!("file content: {name}"),
            description: "full content of the file".into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Resource { .. } => None,
        }
    }
}

/// Ordered content of an operation reply. Text precedes resource references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub content: Vec<ContentItem>,
    /// Whether the text describes a failure rather than a result.
    #[serde(skip)]
    pub is_error: bool,
}

impl OperationResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            is_error: true,
        }
    }

    /// Append a resource reference after the existing items.
    pub fn with_resource(mut self, item: ContentItem) -> Self {
        self.content.push(item);
        self
    }

    /// The text of the first item, if it is text.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(ContentItem::as_text)
    }
}

/// The `file://` locator for a path, each component percent-encoded so the
/// resolver's decoding gives back the same path.
pub fn file_uri(path: &Path) -> String {
    let encoded = path
        .to_string_lossy()
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("file://{encoded}")
}
