//! Interview Session State Machine
//!
//! An [`InterviewSession`] owns one [`Session`] and drives it through its
//! lifecycle:
//!
//! ```text
//! NotStarted --start--> InProgress --finish--> Finished
//!                        |      ^                  |
//!                        +------+                  |
//!                     submit_message               |
//!      InProgress <------------- start ------------+
//! ```
//!
//! Every operation calls its collaborators first and only mutates the session
//! once all of them have succeeded, so a failed call leaves nothing behind.

use crate::{
    Capabilities,
    audio::{AudioBuffer, AudioClip},
    catalog::{Difficulty, InterviewType},
    error::{Capability, SessionError},
    generator::ProblemGenerator,
    speech::{SpeechSynthesizer, SpeechTranscriber},
    transcript::{HistoryWindow, Message, MessageAudio, Role},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::NotStarted => write!(f, "not started"),
            SessionStatus::InProgress => write!(f, "in progress"),
            SessionStatus::Finished => write!(f, "finished"),
        }
    }
}

/// What the candidate picks before an interview begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSettings {
    pub interview_type: InterviewType,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub topic: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

/// The problem an interview is about. Fixed once the session has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub interview_type: InterviewType,
    pub difficulty: Difficulty,
    pub topic: String,
    pub requirements: String,
    pub description: String,
}

/// One interview from settings to feedback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    status: SessionStatus,
    problem: Option<Problem>,
    transcript: Vec<Message>,
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The problem, once `start` has succeeded.
    pub fn problem(&self) -> Option<&Problem> {
        self.problem.as_ref()
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// The feedback message content, once the interview is finished.
    pub fn feedback(&self) -> Option<&str> {
        match self.status {
            SessionStatus::Finished => self.transcript.last().map(|m| m.content.as_str()),
            _ => None,
        }
    }
}

/// Drives a [`Session`] through its lifecycle using the three capability
/// collaborators.
pub struct InterviewSession {
    session: Session,
    generator: Arc<dyn ProblemGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcriber: Arc<dyn SpeechTranscriber>,
    history: HistoryWindow,
    audio: AudioBuffer,
    voice_enabled: bool,
}

impl InterviewSession {
    pub fn new(
        generator: Arc<dyn ProblemGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn SpeechTranscriber>,
    ) -> Self {
        Self {
            session: Session::default(),
            generator,
            synthesizer,
            transcriber,
            history: HistoryWindow::default(),
            audio: AudioBuffer::new(),
            voice_enabled: false,
        }
    }

    /// Limits how much of the transcript is sent when asking for a reply.
    pub fn with_history_window(mut self, history: HistoryWindow) -> Self {
        self.history = history;
        self
    }

    /// Attach synthesized speech to every interviewer message.
    pub fn with_voice(mut self, enabled: bool) -> Self {
        self.voice_enabled = enabled;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn feedback(&self) -> Option<&str> {
        self.session.feedback()
    }

    /// Number of recorded frames waiting for `process_audio`.
    pub fn pending_audio_frames(&self) -> usize {
        self.audio.len()
    }

    /// Generates a problem and opens a new interview.
    ///
    /// Allowed before the first interview and after a finished one; the
    /// previous transcript is discarded.
    #[instrument(skip_all, fields(interview_type = %settings.interview_type, topic = %settings.topic))]
    pub async fn start(&mut self, settings: InterviewSettings) -> Result<(), SessionError> {
        if self.session.status == SessionStatus::InProgress {
            return Err(SessionError::InvalidTransition {
                operation: "start an interview",
                status: self.session.status,
            });
        }
        if !settings.terms_accepted {
            return Err(SessionError::InvalidSettings(
                "the terms and conditions must be accepted".to_string(),
            ));
        }
        if settings.topic.trim().is_empty() {
            return Err(SessionError::InvalidSettings(
                "a topic must be selected".to_string(),
            ));
        }
        let topic = settings
            .interview_type
            .resolve_topic(&settings.topic)
            .ok_or_else(|| {
                SessionError::InvalidSettings(format!(
                    "'{}' is not a {} topic",
                    settings.topic.trim(),
                    settings.interview_type
                ))
            })?;

        let description = self
            .generator
            .get_problem(
                &settings.requirements,
                settings.difficulty,
                topic,
                settings.interview_type,
            )
            .await
            .map_err(SessionError::collaborator(Capability::ProblemGenerator))?;

        let opening = self
            .generator
            .init_conversation(&description, settings.interview_type)
            .await
            .map_err(SessionError::collaborator(Capability::ProblemGenerator))?;
        let greeting = match <[Message; 1]>::try_from(opening) {
            Ok([greeting]) if greeting.role == Role::Interviewer => greeting,
            Ok(_) => {
                return Err(SessionError::collaborator(Capability::ProblemGenerator)(
                    anyhow::anyhow!("conversation must open with an interviewer message"),
                ));
            }
            Err(opening) => {
                return Err(SessionError::collaborator(Capability::ProblemGenerator)(
                    anyhow::anyhow!(
                        "conversation must open with exactly one message, got {}",
                        opening.len()
                    ),
                ));
            }
        };
        let transcript = vec![self.voiced(greeting).await?];

        info!(%topic, difficulty = %settings.difficulty, "Interview started");
        self.audio.clear();
        self.session = Session {
            status: SessionStatus::InProgress,
            problem: Some(Problem {
                interview_type: settings.interview_type,
                difficulty: settings.difficulty,
                topic: topic.to_string(),
                requirements: settings.requirements,
                description,
            }),
            transcript,
        };
        Ok(())
    }

    /// Sends a candidate message and appends it together with the reply.
    ///
    /// Returns the interviewer's reply.
    pub async fn submit_message(&mut self, text: &str) -> Result<&Message, SessionError> {
        self.submit(Message::candidate(text.trim())).await
    }

    /// Transcribes a complete recording and submits it as a candidate message.
    pub async fn submit_audio(&mut self, clip: AudioClip) -> Result<&Message, SessionError> {
        self.require_in_progress("submit audio")?;
        let message = self.transcribe(&clip).await?;
        self.submit(message).await
    }

    /// Queues a recorded frame for a later `process_audio`.
    pub fn push_audio_frame(&mut self, frame: AudioClip) -> Result<(), SessionError> {
        self.require_in_progress("record audio")?;
        self.audio.push(frame).map_err(SessionError::InvalidAudio)
    }

    /// Transcribes everything recorded so far and submits it.
    ///
    /// Returns `Ok(None)` without touching the transcript when nothing was
    /// recorded or the recording transcribed to nothing; in the latter case
    /// the frames are discarded. On failure the frames stay queued.
    pub async fn process_audio(&mut self) -> Result<Option<&Message>, SessionError> {
        self.require_in_progress("process audio")?;
        let Some(clip) = self.audio.snapshot() else {
            debug!("No buffered audio to process");
            return Ok(None);
        };
        let message = self.transcribe(&clip).await?;
        if message.content.is_empty() {
            self.audio.clear();
            return Ok(None);
        }
        self.submit(message).await?;
        self.audio.clear();
        let last = self.session.transcript.len() - 1;
        Ok(Some(&self.session.transcript[last]))
    }

    /// Ends the interview and records the feedback as the final message.
    #[instrument(skip_all)]
    pub async fn finish(&mut self) -> Result<&str, SessionError> {
        let problem = self.require_in_progress("finish the interview")?;

        let feedback = self
            .generator
            .end_interview(
                &problem.description,
                &self.session.transcript,
                problem.interview_type,
            )
            .await
            .map_err(SessionError::collaborator(Capability::ProblemGenerator))?;
        let feedback = self.voiced(Message::interviewer(feedback)).await?;

        info!(
            transcript_len = self.session.transcript.len() + 1,
            "Interview finished"
        );
        self.audio.clear();
        self.session.transcript.push(feedback);
        self.session.status = SessionStatus::Finished;
        Ok(self.session.feedback().unwrap_or_default())
    }

    /// Reports the name and health of each collaborator.
    pub async fn capabilities(&self) -> Capabilities {
        Capabilities::probe(
            self.generator.as_ref(),
            self.synthesizer.as_ref(),
            self.transcriber.as_ref(),
        )
        .await
    }

    async fn submit(&mut self, candidate: Message) -> Result<&Message, SessionError> {
        let problem = self.require_in_progress("submit a message")?;
        if candidate.content.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let mut context = Vec::with_capacity(self.session.transcript.len() + 1);
        context.extend_from_slice(&self.session.transcript);
        context.push(candidate);
        let window = self.history.apply(&context);
        if window.len() < context.len() {
            debug!(
                sent = window.len(),
                total = context.len(),
                "Transcript windowed for reply"
            );
        }

        let reply = self
            .generator
            .get_response(&problem.description, window, problem.interview_type)
            .await
            .map_err(SessionError::collaborator(Capability::ProblemGenerator))?;
        let reply = self.voiced(Message::interviewer(reply)).await?;

        // The context already ends with the candidate message.
        self.session.transcript = context;
        self.session.transcript.push(reply);
        debug!(
            transcript_len = self.session.transcript.len(),
            "Exchange appended"
        );
        let last = self.session.transcript.len() - 1;
        Ok(&self.session.transcript[last])
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<Message, SessionError> {
        if clip.is_empty() {
            return Err(SessionError::InvalidAudio("recording is empty".to_string()));
        }
        let text = self
            .transcriber
            .transcribe(clip)
            .await
            .map_err(SessionError::collaborator(Capability::SpeechTranscriber))?;
        if text.trim().is_empty() {
            warn!(duration_ms = clip.duration_ms(), "Transcription was empty");
        }
        Ok(Message::candidate(text.trim()).with_audio(MessageAudio::Recording {
            sample_rate: clip.sample_rate,
            duration_ms: clip.duration_ms(),
        }))
    }

    async fn voiced(&self, message: Message) -> Result<Message, SessionError> {
        if !self.voice_enabled {
            return Ok(message);
        }
        let wav = self
            .synthesizer
            .synthesize(&message.content)
            .await
            .map_err(SessionError::collaborator(Capability::SpeechSynthesizer))?;
        Ok(message.with_audio(MessageAudio::Speech { wav }))
    }

    /// Fails with `InvalidTransition` unless an interview is running, and
    /// hands back its problem.
    fn require_in_progress(&self, operation: &'static str) -> Result<&Problem, SessionError> {
        match (&self.session.status, &self.session.problem) {
            (SessionStatus::InProgress, Some(problem)) => Ok(problem),
            (status, _) => Err(SessionError::InvalidTransition {
                operation,
                status: *status,
            }),
        }
    }
}

impl fmt::Debug for InterviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterviewSession")
            .field("session", &self.session)
            .field("history", &self.history)
            .field("pending_audio_frames", &self.audio.len())
            .field("voice_enabled", &self.voice_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generator::{MockProblemGenerator, PlaceholderProblemGenerator},
        speech::{
            MockSpeechSynthesizer, MockSpeechTranscriber, PLACEHOLDER_TRANSCRIPTION,
            PlaceholderSpeechSynthesizer, PlaceholderSpeechTranscriber,
        },
    };
    use anyhow::anyhow;
    use std::sync::Mutex;

    fn placeholder_session() -> InterviewSession {
        InterviewSession::new(
            Arc::new(PlaceholderProblemGenerator),
            Arc::new(PlaceholderSpeechSynthesizer),
            Arc::new(PlaceholderSpeechTranscriber),
        )
    }

    fn session_with(generator: MockProblemGenerator) -> InterviewSession {
        InterviewSession::new(
            Arc::new(generator),
            Arc::new(PlaceholderSpeechSynthesizer),
            Arc::new(PlaceholderSpeechTranscriber),
        )
    }

    fn session_with_transcriber(transcriber: MockSpeechTranscriber) -> InterviewSession {
        InterviewSession::new(
            Arc::new(PlaceholderProblemGenerator),
            Arc::new(PlaceholderSpeechSynthesizer),
            Arc::new(transcriber),
        )
    }

    /// A mock generator that behaves like the placeholder for `start`.
    fn startable_generator() -> MockProblemGenerator {
        let mut generator = MockProblemGenerator::new();
        generator
            .expect_get_problem()
            .returning(|_, _, topic, _| Ok(format!("A problem about {topic}")));
        generator
            .expect_init_conversation()
            .returning(|_, _| Ok(vec![Message::interviewer("Hello")]));
        generator
    }

    fn coding_settings() -> InterviewSettings {
        InterviewSettings {
            interview_type: InterviewType::Coding,
            difficulty: Difficulty::Medium,
            topic: "Arrays".to_string(),
            requirements: String::new(),
            terms_accepted: true,
        }
    }

    #[tokio::test]
    async fn test_full_interview_scenario() {
        let mut interview = placeholder_session();
        assert_eq!(interview.status(), SessionStatus::NotStarted);

        interview.start(coding_settings()).await.unwrap();
        assert_eq!(interview.status(), SessionStatus::InProgress);
        let transcript = interview.session().transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, Role::Interviewer);

        let reply = interview.submit_message("I'd use a hash map").await.unwrap();
        assert_eq!(reply.role, Role::Interviewer);
        let transcript = interview.session().transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].role, Role::Candidate);
        assert_eq!(transcript[1].content, "I'd use a hash map");

        let feedback = interview.finish().await.unwrap().to_string();
        assert!(feedback.contains("[Feedback]"));
        let transcript = interview.session().transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[3].content, feedback);
        assert_eq!(interview.status(), SessionStatus::Finished);
        assert_eq!(interview.feedback(), Some(feedback.as_str()));
    }

    #[tokio::test]
    async fn test_start_records_problem_once() {
        let mut interview = placeholder_session();
        assert!(interview.session().problem().is_none());
        interview.start(coding_settings()).await.unwrap();

        let problem = interview.session().problem().unwrap();
        assert_eq!(problem.topic, "Arrays");
        assert_eq!(problem.difficulty, Difficulty::Medium);
        assert_eq!(
            problem.description,
            "Here's a Medium coding problem about Arrays: [Problem description]"
        );
    }

    #[tokio::test]
    async fn test_start_requires_terms() {
        let mut interview = placeholder_session();
        let settings = InterviewSettings {
            terms_accepted: false,
            ..coding_settings()
        };
        let err = interview.start(settings).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSettings(_)));
        assert_eq!(interview.status(), SessionStatus::NotStarted);
        assert!(interview.session().transcript().is_empty());
    }

    #[tokio::test]
    async fn test_start_requires_known_topic() {
        let mut interview = placeholder_session();

        let empty = InterviewSettings {
            topic: "  ".to_string(),
            ..coding_settings()
        };
        assert!(matches!(
            interview.start(empty).await,
            Err(SessionError::InvalidSettings(_))
        ));

        let wrong_type = InterviewSettings {
            topic: "Leadership".to_string(),
            ..coding_settings()
        };
        let err = interview.start(wrong_type).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid settings: 'Leadership' is not a coding topic"
        );
        assert_eq!(interview.status(), SessionStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_start_resolves_topic_to_catalog_name() {
        let mut interview = placeholder_session();
        let settings = InterviewSettings {
            topic: "dynamic prog".to_string(),
            ..coding_settings()
        };
        interview.start(settings).await.unwrap();
        assert_eq!(
            interview.session().problem().unwrap().topic,
            "Dynamic Programming"
        );
    }

    #[tokio::test]
    async fn test_start_while_in_progress_is_rejected() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();
        interview.submit_message("hi").await.unwrap();

        let err = interview.start(coding_settings()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                status: SessionStatus::InProgress,
                ..
            }
        ));
        assert_eq!(interview.session().transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_submit_before_start_is_rejected() {
        let mut interview = placeholder_session();
        let err = interview.submit_message("hello").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                status: SessionStatus::NotStarted,
                ..
            }
        ));
        assert!(matches!(
            interview.finish().await,
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_each_submission_appends_candidate_then_reply() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();

        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            interview.submit_message(text).await.unwrap();
            let transcript = interview.session().transcript();
            assert_eq!(transcript.len(), 1 + 2 * (i + 1));
            let candidate = &transcript[transcript.len() - 2];
            assert_eq!(candidate.role, Role::Candidate);
            assert_eq!(candidate.content, *text);
            assert_eq!(transcript[transcript.len() - 1].role, Role::Interviewer);
        }
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();
        assert!(matches!(
            interview.submit_message("   \n").await,
            Err(SessionError::EmptyMessage)
        ));
        assert_eq!(interview.session().transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_no_messages_after_finish() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();
        interview.finish().await.unwrap();

        let err = interview.submit_message("one more thing").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                status: SessionStatus::Finished,
                ..
            }
        ));
        assert!(matches!(
            interview.finish().await,
            Err(SessionError::InvalidTransition { .. })
        ));
        assert_eq!(interview.session().transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_restart_after_finish_discards_transcript() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();
        interview.submit_message("answer").await.unwrap();
        interview.finish().await.unwrap();

        let settings = InterviewSettings {
            interview_type: InterviewType::Sql,
            topic: "Joins".to_string(),
            ..coding_settings()
        };
        interview.start(settings).await.unwrap();
        assert_eq!(interview.status(), SessionStatus::InProgress);
        assert_eq!(interview.session().transcript().len(), 1);
        assert_eq!(interview.session().problem().unwrap().topic, "Joins");
        assert!(interview.feedback().is_none());
    }

    #[tokio::test]
    async fn test_failed_problem_generation_changes_nothing() {
        let mut generator = MockProblemGenerator::new();
        generator
            .expect_get_problem()
            .returning(|_, _, _, _| Err(anyhow!("model overloaded")));
        let mut interview = session_with(generator);

        let err = interview.start(coding_settings()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::CollaboratorFailure {
                capability: Capability::ProblemGenerator,
                ..
            }
        ));
        assert!(err.to_string().contains("model overloaded"));
        assert_eq!(interview.status(), SessionStatus::NotStarted);
        assert!(interview.session().problem().is_none());
    }

    #[tokio::test]
    async fn test_opening_must_be_interviewer_messages() {
        let mut generator = MockProblemGenerator::new();
        generator
            .expect_get_problem()
            .returning(|_, _, _, _| Ok("desc".to_string()));
        generator
            .expect_init_conversation()
            .returning(|_, _| Ok(vec![Message::candidate("I speak first")]));
        let mut interview = session_with(generator);

        assert!(matches!(
            interview.start(coding_settings()).await,
            Err(SessionError::CollaboratorFailure { .. })
        ));
        assert_eq!(interview.status(), SessionStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_opening_must_be_a_single_greeting() {
        let mut generator = MockProblemGenerator::new();
        generator
            .expect_get_problem()
            .returning(|_, _, _, _| Ok("desc".to_string()));
        generator.expect_init_conversation().returning(|_, _| {
            Ok(vec![
                Message::interviewer("Hello"),
                Message::interviewer("Second"),
            ])
        });
        let mut interview = session_with(generator);

        let err = interview.start(coding_settings()).await.unwrap_err();
        assert!(matches!(err, SessionError::CollaboratorFailure { .. }));
        assert!(err.to_string().contains("exactly one message"));
        assert_eq!(interview.status(), SessionStatus::NotStarted);
        assert!(interview.session().transcript().is_empty());
    }

    #[tokio::test]
    async fn test_empty_opening_is_rejected() {
        let mut generator = MockProblemGenerator::new();
        generator
            .expect_get_problem()
            .returning(|_, _, _, _| Ok("desc".to_string()));
        generator
            .expect_init_conversation()
            .returning(|_, _| Ok(vec![]));
        let mut interview = session_with(generator);

        assert!(matches!(
            interview.start(coding_settings()).await,
            Err(SessionError::CollaboratorFailure { .. })
        ));
        assert_eq!(interview.status(), SessionStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_failed_reply_leaves_transcript_unchanged() {
        let mut generator = startable_generator();
        generator
            .expect_get_response()
            .returning(|_, _, _| Err(anyhow!("timeout")));
        let mut interview = session_with(generator);
        interview.start(coding_settings()).await.unwrap();

        let err = interview.submit_message("my answer").await.unwrap_err();
        assert!(matches!(err, SessionError::CollaboratorFailure { .. }));
        assert_eq!(interview.session().transcript().len(), 1);
        assert_eq!(interview.status(), SessionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_failed_feedback_keeps_interview_open() {
        let mut generator = startable_generator();
        generator
            .expect_end_interview()
            .returning(|_, _, _| Err(anyhow!("quota exceeded")));
        let mut interview = session_with(generator);
        interview.start(coding_settings()).await.unwrap();

        assert!(interview.finish().await.is_err());
        assert_eq!(interview.status(), SessionStatus::InProgress);
        assert_eq!(interview.session().transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_context_is_windowed_but_feedback_sees_everything() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let feedback_len = Arc::new(Mutex::new(0usize));

        let mut generator = startable_generator();
        let seen_in_mock = seen.clone();
        generator
            .expect_get_response()
            .returning(move |_, transcript, _| {
                seen_in_mock.lock().unwrap().push(transcript.len());
                assert_eq!(transcript.last().unwrap().role, Role::Candidate);
                Ok("ok".to_string())
            });
        let feedback_in_mock = feedback_len.clone();
        generator
            .expect_end_interview()
            .returning(move |_, transcript, _| {
                *feedback_in_mock.lock().unwrap() = transcript.len();
                Ok("feedback".to_string())
            });

        let mut interview = session_with(generator).with_history_window(HistoryWindow::last(3));
        interview.start(coding_settings()).await.unwrap();
        for _ in 0..4 {
            interview.submit_message("answer").await.unwrap();
        }
        interview.finish().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![2, 3, 3, 3]);
        assert_eq!(*feedback_len.lock().unwrap(), 9);
        assert_eq!(interview.session().transcript().len(), 10);
    }

    #[tokio::test]
    async fn test_voice_attaches_speech_to_interviewer_messages() {
        let mut interview = placeholder_session().with_voice(true);
        interview.start(coding_settings()).await.unwrap();
        interview.submit_message("hello").await.unwrap();

        let transcript = interview.session().transcript();
        assert!(matches!(
            transcript[0].audio,
            Some(MessageAudio::Speech { .. })
        ));
        assert!(transcript[1].audio.is_none());
        assert!(matches!(
            transcript[2].audio,
            Some(MessageAudio::Speech { .. })
        ));
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_a_collaborator_failure() {
        let mut synthesizer = MockSpeechSynthesizer::new();
        synthesizer
            .expect_synthesize()
            .returning(|_| Err(anyhow!("voice unavailable")));
        let mut interview = InterviewSession::new(
            Arc::new(PlaceholderProblemGenerator),
            Arc::new(synthesizer),
            Arc::new(PlaceholderSpeechTranscriber),
        )
        .with_voice(true);

        let err = interview.start(coding_settings()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::CollaboratorFailure {
                capability: Capability::SpeechSynthesizer,
                ..
            }
        ));
        assert_eq!(interview.status(), SessionStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_process_audio_transcribes_buffered_frames() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();

        assert!(interview.process_audio().await.unwrap().is_none());
        assert_eq!(interview.session().transcript().len(), 1);

        interview
            .push_audio_frame(AudioClip::new(vec![0.1; 8_000], 16_000))
            .unwrap();
        interview
            .push_audio_frame(AudioClip::new(vec![0.2; 8_000], 16_000))
            .unwrap();
        assert_eq!(interview.pending_audio_frames(), 2);

        let reply = interview.process_audio().await.unwrap();
        assert!(reply.is_some());
        assert_eq!(interview.pending_audio_frames(), 0);

        let transcript = interview.session().transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].content, PLACEHOLDER_TRANSCRIPTION);
        assert_eq!(
            transcript[1].audio,
            Some(MessageAudio::Recording {
                sample_rate: 16_000,
                duration_ms: 1000
            })
        );
    }

    #[tokio::test]
    async fn test_failed_transcription_keeps_frames_queued() {
        let mut transcriber = MockSpeechTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_| Err(anyhow!("stt down")));
        let mut interview = session_with_transcriber(transcriber);
        interview.start(coding_settings()).await.unwrap();
        interview
            .push_audio_frame(AudioClip::new(vec![0.1; 1_600], 16_000))
            .unwrap();

        let err = interview.process_audio().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::CollaboratorFailure {
                capability: Capability::SpeechTranscriber,
                ..
            }
        ));
        assert!(err.to_string().contains("stt down"));
        assert_eq!(interview.pending_audio_frames(), 1);
        assert_eq!(interview.session().transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reply_keeps_frames_queued() {
        let mut generator = startable_generator();
        generator
            .expect_get_response()
            .returning(|_, _, _| Err(anyhow!("timeout")));
        let mut interview = session_with(generator);
        interview.start(coding_settings()).await.unwrap();
        interview
            .push_audio_frame(AudioClip::new(vec![0.1; 1_600], 16_000))
            .unwrap();

        assert!(interview.process_audio().await.is_err());
        assert_eq!(interview.pending_audio_frames(), 1);
        assert_eq!(interview.session().transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_transcription_is_ignored() {
        let mut transcriber = MockSpeechTranscriber::new();
        transcriber
            .expect_transcribe()
            .returning(|_| Ok("   ".to_string()));
        let mut interview = session_with_transcriber(transcriber);
        interview.start(coding_settings()).await.unwrap();
        interview
            .push_audio_frame(AudioClip::new(vec![0.0; 1_600], 16_000))
            .unwrap();

        assert!(interview.process_audio().await.unwrap().is_none());
        assert_eq!(interview.session().transcript().len(), 1);
        assert_eq!(interview.status(), SessionStatus::InProgress);
        assert_eq!(interview.pending_audio_frames(), 0);
    }

    #[tokio::test]
    async fn test_audio_requires_running_interview() {
        let mut interview = placeholder_session();
        let frame = AudioClip::new(vec![0.0; 10], 16_000);
        assert!(matches!(
            interview.push_audio_frame(frame.clone()),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            interview.submit_audio(frame).await,
            Err(SessionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            interview.process_audio().await,
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_mismatched_frame_rate_is_invalid_audio() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();
        interview
            .push_audio_frame(AudioClip::new(vec![0.0; 10], 16_000))
            .unwrap();
        assert!(matches!(
            interview.push_audio_frame(AudioClip::new(vec![0.0; 10], 44_100)),
            Err(SessionError::InvalidAudio(_))
        ));
    }

    #[tokio::test]
    async fn test_finish_clears_pending_audio() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();
        interview
            .push_audio_frame(AudioClip::new(vec![0.0; 10], 16_000))
            .unwrap();
        interview.finish().await.unwrap();
        assert_eq!(interview.pending_audio_frames(), 0);
    }

    #[tokio::test]
    async fn test_submit_audio_clip() {
        let mut interview = placeholder_session();
        interview.start(coding_settings()).await.unwrap();

        let empty = AudioClip::new(vec![], 16_000);
        assert!(matches!(
            interview.submit_audio(empty).await,
            Err(SessionError::InvalidAudio(_))
        ));

        interview
            .submit_audio(AudioClip::new(vec![0.3; 1_600], 16_000))
            .await
            .unwrap();
        assert_eq!(interview.session().transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_capabilities_report_placeholders() {
        let interview = placeholder_session();
        let capabilities = interview.capabilities().await;
        assert!(capabilities.all_ready());
        assert_eq!(capabilities.generator.name, "Placeholder LLM");
        assert_eq!(capabilities.synthesizer.name, "Placeholder TTS");
        assert_eq!(capabilities.transcriber.name, "Placeholder STT");
    }
}
