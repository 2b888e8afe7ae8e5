
use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`BoardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Fetch,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A local precondition failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Transport failure or an unreadable response body.
    #[error("{0}")]
    Fetch(String),

    #[error(
        "server returned HTTP {status}: {}",
        .message.as_deref().unwrap_or("no details")
    )]
    Server {
        status: u16,
        message: Option<String>,
    },
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch(message.into())
    }

    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to the user: the server's own message when it
    /// sent one, otherwise the status reason phrase.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Fetch(message) => message.clone(),
            Self::Server {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Server {
                status,
                message: None,
            } => StatusCode::from_u16(*status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {status}")),
        }
    }
}

/// Store operation a failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Remove,
    ChangeStatus,
}

impl Operation {
    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Load => "Failed to fetch tasks from server",
            Self::Create => "Error adding task",
            Self::Update => "Error saving task",
            Self::Remove => "Error deleting task",
            Self::ChangeStatus => "Error changing status",
        }
    }

    /// One-line user message for `err` raised by this operation.
    pub fn report(self, err: &BoardError) -> String {
        match err.kind() {
            ErrorKind::Validation => err.message(),
            _ => format!("{}: {}", self.failure_prefix(), err.message()),
        }
    }
}
