use serde::{Deserialize, Serialize};

/// Result of one delegated tool execution. Produced exactly once per
/// request and always well-formed: every failure path folds into
/// `success: false` with the detail in `error`, never a propagated fault.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(message.into()),
        }
    }

    /// Failure that still carries partial output (e.g. a command's captured
    /// stdout/stderr before a non-zero exit).
    pub fn err_with(content: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: Some(content.into()),
            error: Some(message.into()),
        }
    }
}
