use serde::Serialize;

use crate::presence::PresenceState;
use crate::tree::ElementNode;

/// One reason two documents are not equivalent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Difference {
    /// Paired elements have different names.
    NameMismatch {
        path: String,
        left: String,
        right: String,
    },
    /// Attribute presence or value differs.
    AttributeMismatch {
        path: String,
        name: String,
        left: PresenceState,
        right: PresenceState,
    },
    /// Same attributes in a different order (only when order is significant).
    AttributeOrder {
        path: String,
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Text content differs.
    TextMismatch {
        path: String,
        left: Option<String>,
        right: Option<String>,
    },
    /// Comments differ (only when comments are significant).
    CommentMismatch {
        path: String,
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Same children in a different sibling order (strict mode only).
    ChildOrder {
        path: String,
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Element only in the left input.
    OnlyLeft { path: String, node: ElementNode },
    /// Element only in the right input.
    OnlyRight { path: String, node: ElementNode },
}

impl Difference {
    pub fn path(&self) -> &str {
        match self {
            Self::NameMismatch { path, .. }
            | Self::AttributeMismatch { path, .. }
            | Self::AttributeOrder { path, .. }
            | Self::TextMismatch { path, .. }
            | Self::CommentMismatch { path, .. }
            | Self::ChildOrder { path, .. }
            | Self::OnlyLeft { path, .. }
            | Self::OnlyRight { path, .. } => path,
        }
    }
}

/// Outcome of a structural comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub equivalent: bool,
    pub differences: Vec<Difference>,
}

impl ComparisonResult {
    pub(crate) fn from_differences(differences: Vec<Difference>) -> Self {
        Self {
            equivalent: differences.is_empty(),
            differences,
        }
    }
}
