use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Engine or browser failed to launch. Fatal: the run aborts before
    /// any scenario executes, and the failure is never retried.
    #[error("automation engine launch failed: {0}")]
    Launch(String),

    #[error("suite already started")]
    SuiteAlreadyStarted,

    #[error("suite has already been shut down")]
    SuiteClosed,

    /// A scenario session was requested without a live browser process.
    #[error("no live browser process for scenario '{scenario}': suite not started")]
    SuiteNotStarted { scenario: String },

    #[error("scenario '{scenario}' has no active session")]
    SessionNotActive { scenario: String },

    #[error("navigation failed: {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("timeout after {ms}ms waiting for: {condition}")]
    Timeout { ms: u64, condition: String },

    #[error("driver protocol error: {0}")]
    Driver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HarnessError {
    /// True for failures that must abort the run before scenarios execute.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarnessError::Launch(_)
                | HarnessError::SuiteAlreadyStarted
                | HarnessError::SuiteClosed
                | HarnessError::SuiteNotStarted { .. }
        )
    }
}
