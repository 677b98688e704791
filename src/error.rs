// src/error.rs
use thiserror::Error;

/// User-facing failures of an analysis session, chat exchange or cover
/// letter request. None of them are fatal: the user can always retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Missing required input. Raised before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resume upload failed: {0}")]
    UploadFailed(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SessionError {
    /// Stable code for logs and scripted callers.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Validation(_) => "VALIDATION_ERROR",
            SessionError::UploadFailed(_) => "UPLOAD_FAILED",
            SessionError::AnalysisFailed(_) => "ANALYSIS_FAILED",
            SessionError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Validation(msg) => msg.clone(),
            SessionError::UploadFailed(detail) => {
                format!("Analysis Error: Resume upload failed ({})", detail)
            }
            SessionError::AnalysisFailed(detail) => format!("Analysis Error: {}", detail),
            SessionError::Transport(detail) => format!("Request failed: {}", detail),
        }
    }

    pub(crate) fn upload(err: anyhow::Error) -> Self {
        SessionError::UploadFailed(format!("{:#}", err))
    }

    pub(crate) fn analysis(err: anyhow::Error) -> Self {
        SessionError::AnalysisFailed(format!("{:#}", err))
    }

    pub(crate) fn transport(err: anyhow::Error) -> Self {
        SessionError::Transport(format!("{:#}", err))
    }
}
