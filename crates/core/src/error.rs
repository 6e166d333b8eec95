//! Error types for the interview session lifecycle.

use crate::session::SessionStatus;

/// The external capability a failed call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ProblemGenerator,
    SpeechSynthesizer,
    SpeechTranscriber,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::ProblemGenerator => write!(f, "problem generator"),
            Capability::SpeechSynthesizer => write!(f, "speech synthesizer"),
            Capability::SpeechTranscriber => write!(f, "speech transcriber"),
        }
    }
}

/// Errors surfaced by [`InterviewSession`](crate::session::InterviewSession) operations.
///
/// None of these are retried. When one is returned the session is exactly as
/// it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("cannot {operation} while the session is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: SessionStatus,
    },
    #[error("{capability} failed: {source:#}")]
    CollaboratorFailure {
        capability: Capability,
        #[source]
        source: anyhow::Error,
    },
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("invalid audio: {0}")]
    InvalidAudio(String),
}

impl SessionError {
    pub(crate) fn collaborator(capability: Capability) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| SessionError::CollaboratorFailure { capability, source }
    }
}
