use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Interviewer,
    Candidate,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Interviewer => write!(f, "interviewer"),
            Role::Candidate => write!(f, "candidate"),
        }
    }
}

/// Audio attached to a transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageAudio {
    /// Synthesized speech for an interviewer line, as a WAV file.
    Speech { wav: Vec<u8> },
    /// The candidate's recording that was transcribed into this message.
    Recording { sample_rate: u32, duration_ms: u64 },
}

/// One entry in the interview transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub audio: Option<MessageAudio>,
}

impl Message {
    pub fn interviewer(content: impl Into<String>) -> Self {
        Self {
            role: Role::Interviewer,
            content: content.into(),
            audio: None,
        }
    }

    pub fn candidate(content: impl Into<String>) -> Self {
        Self {
            role: Role::Candidate,
            content: content.into(),
            audio: None,
        }
    }

    pub fn with_audio(mut self, audio: MessageAudio) -> Self {
        self.audio = Some(audio);
        self
    }
}

/// How much of the transcript is sent as context when asking for a reply.
///
/// The stored transcript is never truncated; the window only limits what the
/// generator sees mid-conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    max_messages: Option<usize>,
}

impl HistoryWindow {
    pub const DEFAULT_MAX_MESSAGES: usize = 40;

    /// Keeps at most `max_messages` of the most recent messages.
    /// Zero is treated as unbounded.
    pub fn last(max_messages: usize) -> Self {
        Self {
            max_messages: (max_messages > 0).then_some(max_messages),
        }
    }

    pub fn unbounded() -> Self {
        Self { max_messages: None }
    }

    pub fn max_messages(&self) -> Option<usize> {
        self.max_messages
    }

    pub fn apply<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        match self.max_messages {
            Some(max) if messages.len() > max => &messages[messages.len() - max..],
            _ => messages,
        }
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::last(Self::DEFAULT_MAX_MESSAGES)
    }
}
