use crate::error::SessionError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing outcome of an upload or report generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    /// Underlying error message, for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
            detail: None,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            description: description.into(),
            detail: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == NotificationKind::Success
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<&SessionError> for Notification {
    fn from(err: &SessionError) -> Self {
        let notification = match err {
            SessionError::InvalidFileType { .. } => {
                Notification::error("Invalid file type", "Please upload an Excel file (.xlsx or .xls)")
            }
            SessionError::Busy => {
                Notification::error("Busy", "Please wait for the current operation to finish")
            }
            SessionError::NoData => {
                Notification::error("No data", "Upload an Excel file before generating a report")
            }
            _ => Notification::error("Error", "Failed to process the file. Please try again."),
        };
        notification.with_detail(err.to_string())
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
