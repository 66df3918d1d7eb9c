use thiserror::Error;

/// Failures reported by the host editor when asked to change its document.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no active text editor to insert into")]
    NoActiveEditor,

    #[error("host rejected the edit: {0}")]
    Rejected(String),

    #[error("host document has been closed")]
    Closed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Problems with a user-supplied [EditorConfig](crate::config::EditorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("debounce interval must be greater than zero")]
    ZeroDebounce,

    #[error("placeholder {0:?} is not a recognised caret anchor")]
    UnknownPlaceholder(char),

    #[error("trigger {0:?} must be a printable, non-whitespace character")]
    InvalidTrigger(char),

    #[error("default limit {0} must not be empty")]
    EmptyLimitDefault(&'static str),

    #[error("default limit {0} must have balanced braces and fit on one line")]
    MalformedLimitDefault(&'static str),
}

/// Errors surfaced while synchronising the document with the host.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to push document to host")]
    Host(#[from] HostError),
}
