//! Core of the interview practice service: the session lifecycle state
//! machine, the content catalog, and the capability collaborators it calls.

pub mod audio;
pub mod catalog;
pub mod error;
pub mod generator;
pub mod prompts;
pub mod session;
pub mod speech;
pub mod transcript;

use generator::ProblemGenerator;
use serde::Serialize;
use speech::{SpeechSynthesizer, SpeechTranscriber};

/// Result of asking a collaborator whether it can serve requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum CapabilityStatus {
    Ready,
    Unavailable(String),
}

impl CapabilityStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, CapabilityStatus::Ready)
    }
}

/// Name and health of one collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub name: String,
    pub status: CapabilityStatus,
}

/// Health of all three collaborators an interview depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub generator: CapabilityReport,
    pub synthesizer: CapabilityReport,
    pub transcriber: CapabilityReport,
}

impl Capabilities {
    /// Queries each collaborator's status in turn.
    pub async fn probe(
        generator: &dyn ProblemGenerator,
        synthesizer: &dyn SpeechSynthesizer,
        transcriber: &dyn SpeechTranscriber,
    ) -> Self {
        Self {
            generator: CapabilityReport {
                name: generator.name(),
                status: generator.status().await,
            },
            synthesizer: CapabilityReport {
                name: synthesizer.name(),
                status: synthesizer.status().await,
            },
            transcriber: CapabilityReport {
                name: transcriber.name(),
                status: transcriber.status().await,
            },
        }
    }

    pub fn all_ready(&self) -> bool {
        self.generator.status.is_ready()
            && self.synthesizer.status.is_ready()
            && self.transcriber.status.is_ready()
    }
}
