//! API Models
//!
//! Request and response bodies of the REST API. Core types are mapped into
//! flat views here so the OpenAPI document is generated with `utoipa`.

use crate::audio_utils::encode_bytes;
use interview_core::{
    Capabilities, CapabilityReport, CapabilityStatus,
    catalog::{Difficulty, INSTRUCTIONS, InterviewType},
    session::{InterviewSettings, Problem, Session, SessionStatus},
    transcript::{Message, MessageAudio, Role},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct StartInterviewPayload {
    #[schema(value_type = String, example = "coding")]
    pub interview_type: InterviewType,
    #[serde(default)]
    #[schema(value_type = String, example = "medium")]
    pub difficulty: Difficulty,
    #[schema(example = "Arrays")]
    pub topic: String,
    #[serde(default)]
    #[schema(example = "Use Python")]
    pub requirements: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

impl From<StartInterviewPayload> for InterviewSettings {
    fn from(payload: StartInterviewPayload) -> Self {
        Self {
            interview_type: payload.interview_type,
            difficulty: payload.difficulty,
            topic: payload.topic,
            requirements: payload.requirements,
            terms_accepted: payload.terms_accepted,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct SubmitMessagePayload {
    #[schema(example = "I would use a hash map to track what I've seen.")]
    pub text: String,
}

/// One recorded frame: base64 PCM16 little-endian mono samples.
#[derive(Deserialize, ToSchema, Debug)]
pub struct AudioFramePayload {
    pub audio: String,
    #[schema(example = 24000)]
    pub sample_rate: u32,
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct MessageView {
    #[schema(value_type = String, example = "interviewer")]
    pub role: Role,
    pub content: String,
    /// Base64 WAV of the synthesized speech, for interviewer lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    /// Length of the recording a candidate message was transcribed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_ms: Option<u64>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        let (speech, recording_ms) = match &message.audio {
            Some(MessageAudio::Speech { wav }) => (Some(encode_bytes(wav)), None),
            Some(MessageAudio::Recording { duration_ms, .. }) => (None, Some(*duration_ms)),
            None => (None, None),
        };
        Self {
            role: message.role,
            content: message.content.clone(),
            speech,
            recording_ms,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ProblemView {
    #[schema(value_type = String, example = "coding")]
    pub interview_type: InterviewType,
    #[schema(value_type = String, example = "medium")]
    pub difficulty: Difficulty,
    pub topic: String,
    pub requirements: String,
    pub description: String,
    /// What the candidate's answer box is called for this type.
    pub solution_label: String,
}

impl From<&Problem> for ProblemView {
    fn from(problem: &Problem) -> Self {
        Self {
            interview_type: problem.interview_type,
            difficulty: problem.difficulty,
            topic: problem.topic.clone(),
            requirements: problem.requirements.clone(),
            description: problem.description.clone(),
            solution_label: problem.interview_type.solution_label().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    #[schema(value_type = String, example = "in_progress")]
    pub status: SessionStatus,
    pub problem: Option<ProblemView>,
    pub transcript: Vec<MessageView>,
    pub feedback: Option<String>,
    pub pending_audio_frames: usize,
}

impl SessionView {
    pub fn new(id: Uuid, session: &Session, pending_audio_frames: usize) -> Self {
        Self {
            id,
            status: session.status(),
            problem: session.problem().map(ProblemView::from),
            transcript: session.transcript().iter().map(MessageView::from).collect(),
            feedback: session.feedback().map(str::to_string),
            pending_audio_frames,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct InterviewTypeView {
    #[schema(value_type = String, example = "system_design")]
    pub id: InterviewType,
    #[schema(example = "system design")]
    pub name: String,
    pub solution_label: String,
    pub topics: Vec<String>,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct CatalogView {
    pub interview_types: Vec<InterviewTypeView>,
    #[schema(value_type = Vec<String>)]
    pub difficulties: Vec<Difficulty>,
}

impl CatalogView {
    pub fn build() -> Self {
        Self {
            interview_types: InterviewType::ALL
                .into_iter()
                .map(|kind| InterviewTypeView {
                    id: kind,
                    name: kind.to_string(),
                    solution_label: kind.solution_label().to_string(),
                    topics: kind.topics().iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
            difficulties: Difficulty::ALL.to_vec(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CapabilityView {
    pub name: String,
    pub ready: bool,
    pub reason: Option<String>,
}

impl From<CapabilityReport> for CapabilityView {
    fn from(report: CapabilityReport) -> Self {
        let (ready, reason) = match report.status {
            CapabilityStatus::Ready => (true, None),
            CapabilityStatus::Unavailable(reason) => (false, Some(reason)),
        };
        Self {
            name: report.name,
            ready,
            reason,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct CapabilitiesView {
    pub generator: CapabilityView,
    pub synthesizer: CapabilityView,
    pub transcriber: CapabilityView,
}

impl From<Capabilities> for CapabilitiesView {
    fn from(capabilities: Capabilities) -> Self {
        Self {
            generator: capabilities.generator.into(),
            synthesizer: capabilities.synthesizer.into(),
            transcriber: capabilities.transcriber.into(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct InstructionsView {
    pub introduction: String,
    pub quick_start: String,
    pub interface: String,
    pub models: String,
    pub acknowledgements: String,
    pub legal: String,
    pub capabilities: CapabilitiesView,
}

impl InstructionsView {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            introduction: INSTRUCTIONS.introduction.to_string(),
            quick_start: INSTRUCTIONS.quick_start.to_string(),
            interface: INSTRUCTIONS.interface.to_string(),
            models: INSTRUCTIONS.models.to_string(),
            acknowledgements: INSTRUCTIONS.acknowledgements.to_string(),
            legal: INSTRUCTIONS.legal.to_string(),
            capabilities: capabilities.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
