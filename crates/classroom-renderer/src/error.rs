use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for classroom-renderer operations
#[derive(Debug, Error, Diagnostic)]
pub enum ClassroomError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Assistant(#[from] AssistantError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Dataset loading errors
#[derive(Debug, Error, Diagnostic)]
pub enum FeedError {
    #[error("failed to read feed at {}", path.display())]
    #[diagnostic(code(feed::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feed is not valid JSON")]
    #[diagnostic(
        code(feed::json),
        help("expected an object mapping week keys to {{ display_name, items }}")
    )]
    Json(#[from] serde_json::Error),

    #[error("item id {id} appears in both week {first_week} and week {second_week}")]
    #[diagnostic(code(feed::duplicate_id), help("item ids are used as page anchors and must be unique"))]
    DuplicateItemId {
        id: String,
        first_week: String,
        second_week: String,
    },

    #[error("item id {id} appears more than once in week {week}")]
    #[diagnostic(code(feed::duplicate_id_in_week), help("item ids are used as page anchors and must be unique"))]
    DuplicateItemInWeek { id: String, week: String },

    #[error("no week {key} in feed")]
    #[diagnostic(code(feed::unknown_week))]
    UnknownWeek { key: String },
}

/// Summary service contract errors
#[derive(Debug, Error, Diagnostic)]
pub enum AssistantError {
    #[error("topic must not be blank")]
    #[diagnostic(code(assistant::empty_topic))]
    EmptyTopic,

    #[error("summary service returned an empty response")]
    #[diagnostic(code(assistant::empty_response))]
    EmptyResponse,

    #[error("failed to parse summary response")]
    #[diagnostic(code(assistant::malformed_summary))]
    MalformedSummary(#[source] serde_json::Error),

    #[error("summary service request failed: {0}")]
    #[diagnostic(code(assistant::service))]
    Service(String),
}

/// Configuration errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue { var: &'static str, message: String },
}
