//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the collaborator
//! handles every session shares and the registry of live sessions.

use crate::config::Config;
use interview_core::{
    Capabilities,
    generator::ProblemGenerator,
    session::InterviewSession,
    speech::{SpeechSynthesizer, SpeechTranscriber},
    transcript::HistoryWindow,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

/// A session handle. The mutex serializes events for one session.
pub type SharedSession = Arc<Mutex<InterviewSession>>;

struct SessionEntry {
    session: SharedSession,
    last_used: Instant,
}

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub generator: Arc<dyn ProblemGenerator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub config: Arc<Config>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl AppState {
    pub fn new(
        config: Config,
        generator: Arc<dyn ProblemGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn SpeechTranscriber>,
    ) -> Self {
        Self {
            generator,
            synthesizer,
            transcriber,
            config: Arc::new(config),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new, not yet started session. Sessions idle for longer
    /// than the configured limit are dropped first.
    pub async fn create_session(&self) -> (Uuid, SharedSession) {
        if let Some(max_idle) = self.config.session_idle_timeout() {
            self.evict_idle(max_idle).await;
        }

        let interview = InterviewSession::new(
            self.generator.clone(),
            self.synthesizer.clone(),
            self.transcriber.clone(),
        )
        .with_history_window(HistoryWindow::last(self.config.history_window))
        .with_voice(self.config.voice_enabled);

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(interview));
        let entry = SessionEntry {
            session: session.clone(),
            last_used: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        (id, session)
    }

    /// Looks a session up and marks it as used.
    pub async fn session(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(entry.session.clone())
    }

    /// Drops a session. Returns whether it existed.
    pub async fn remove_session(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops every session not looked up within `max_idle`. Returns how many
    /// were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_used.elapsed() <= max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn capabilities(&self) -> Capabilities {
        Capabilities::probe(
            self.generator.as_ref(),
            self.synthesizer.as_ref(),
            self.transcriber.as_ref(),
        )
        .await
    }
}
