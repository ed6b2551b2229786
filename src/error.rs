//! Error taxonomy for content-tree operations
//!
//! Every failure a user can trigger maps to one [`AdminError`] variant, and
//! each variant renders as a short typed status line through
//! [`AdminError::status_message`].

use std::fmt;
use thiserror::Error;

use crate::content::EntityKind;

/// Transport-level failures on any remote call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not reach {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("{url} answered HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("unreadable response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl NetworkError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("could not load chapters: {reason}")]
    Load {
        reason: String,
        #[source]
        network: Option<NetworkError>,
    },

    #[error("{entity} not found: {locator}")]
    NotFound { entity: EntityKind, locator: String },

    #[error("{entity} id '{id}' already exists")]
    DuplicateId { entity: EntityKind, id: String },

    #[error("invalid {entity}: {message}")]
    Validation { entity: EntityKind, message: String },

    #[error("nothing selected: select a {expected} first")]
    NothingSelected { expected: EntityKind },

    #[error("clipboard is empty")]
    ClipboardEmpty,

    #[error("clipboard holds a {found}, not a {expected}")]
    ClipboardTypeMismatch {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("invalid document: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("server refused the save: {0}")]
    SaveRejected(String),

    #[error("local storage error: {0}")]
    Storage(String),
}

/// Coarse classification of [`AdminError`], stable for matching in callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Load,
    NotFound,
    DuplicateId,
    Validation,
    NothingSelected,
    ClipboardEmpty,
    ClipboardTypeMismatch,
    InvalidFormat,
    Network,
    SaveRejected,
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Load => "load",
            ErrorKind::NotFound => "not-found",
            ErrorKind::DuplicateId => "duplicate-id",
            ErrorKind::Validation => "validation",
            ErrorKind::NothingSelected => "nothing-selected",
            ErrorKind::ClipboardEmpty => "clipboard-empty",
            ErrorKind::ClipboardTypeMismatch => "clipboard-type",
            ErrorKind::InvalidFormat => "invalid-format",
            ErrorKind::Network => "network",
            ErrorKind::SaveRejected => "save-rejected",
            ErrorKind::Storage => "storage",
        };
        f.write_str(label)
    }
}

impl AdminError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::Load { .. } => ErrorKind::Load,
            AdminError::NotFound { .. } => ErrorKind::NotFound,
            AdminError::DuplicateId { .. } => ErrorKind::DuplicateId,
            AdminError::Validation { .. } => ErrorKind::Validation,
            AdminError::NothingSelected { .. } => ErrorKind::NothingSelected,
            AdminError::ClipboardEmpty => ErrorKind::ClipboardEmpty,
            AdminError::ClipboardTypeMismatch { .. } => ErrorKind::ClipboardTypeMismatch,
            AdminError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            AdminError::Network(_) => ErrorKind::Network,
            AdminError::SaveRejected(_) => ErrorKind::SaveRejected,
            AdminError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// True for failures that leave the tree untouched and only inform the user
    pub fn is_advisory(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NothingSelected
                | ErrorKind::ClipboardEmpty
                | ErrorKind::ClipboardTypeMismatch
        )
    }

    /// True when the underlying transport gave up because of a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            AdminError::Network(network) => network.is_timeout(),
            AdminError::Load {
                network: Some(network),
                ..
            } => network.is_timeout(),
            _ => false,
        }
    }

    /// Short, typed, human-readable line for the status area
    pub fn status_message(&self) -> String {
        format!("[{}] {}", self.kind(), self)
    }

    pub(crate) fn not_found(entity: EntityKind, locator: impl Into<String>) -> Self {
        AdminError::NotFound {
            entity,
            locator: locator.into(),
        }
    }

    pub(crate) fn validation(entity: EntityKind, message: impl Into<String>) -> Self {
        AdminError::Validation {
            entity,
            message: message.into(),
        }
    }

    pub(crate) fn nothing_selected(expected: EntityKind) -> Self {
        AdminError::NothingSelected { expected }
    }

    pub(crate) fn load_failed(network: NetworkError) -> Self {
        AdminError::Load {
            reason: network.to_string(),
            network: Some(network),
        }
    }
}

pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_names_kind_and_entity() {
        let err = AdminError::not_found(EntityKind::Step, "chapter ch1, step 4");
        assert_eq!(
            err.status_message(),
            "[not-found] step not found: chapter ch1, step 4"
        );
    }

    #[test]
    fn test_timeout_survives_load_wrapping() {
        let err = AdminError::load_failed(NetworkError::Timeout {
            url: "http://localhost:5000/api/chapters".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Load);
        assert!(err.is_timeout());

        let refused = AdminError::from(NetworkError::Unreachable {
            url: "http://localhost:5000/api/chapters".to_string(),
            message: "connection refused".to_string(),
        });
        assert!(!refused.is_timeout());
    }

    #[test]
    fn test_clipboard_errors_are_advisory() {
        assert!(AdminError::ClipboardEmpty.is_advisory());
        assert!(
            AdminError::ClipboardTypeMismatch {
                expected: EntityKind::Chapter,
                found: EntityKind::Exercise,
            }
            .is_advisory()
        );
        assert!(!AdminError::InvalidFormat("x".into()).is_advisory());
    }

    #[test]
    fn test_missing_selection_is_advisory() {
        let err = AdminError::nothing_selected(EntityKind::Step);
        assert!(err.is_advisory());
        assert_eq!(
            err.status_message(),
            "[nothing-selected] nothing selected: select a step first"
        );
        assert!(!AdminError::validation(EntityKind::Step, "a title is required").is_advisory());
    }
}
