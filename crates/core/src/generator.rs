//! Problem and Response Generation
//!
//! The problem generator is the language capability behind an interview: it
//! writes the problem statement, opens the conversation, produces each
//! interviewer reply, and summarizes the interview into feedback.

use crate::{
    CapabilityStatus,
    catalog::{self, Difficulty, InterviewType},
    prompts::{self, FEEDBACK_PROMPT, INTERVIEWER_PROMPT, PROBLEM_PROMPT},
    transcript::{Message, Role},
};
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Defines the contract for any service that can drive the interviewer's side
/// of the conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemGenerator: Send + Sync {
    /// Writes the problem statement for a new interview.
    async fn get_problem(
        &self,
        requirements: &str,
        difficulty: Difficulty,
        topic: &str,
        interview_type: InterviewType,
    ) -> Result<String>;

    /// Produces the opening interviewer message(s) for a problem.
    async fn init_conversation(
        &self,
        description: &str,
        interview_type: InterviewType,
    ) -> Result<Vec<Message>>;

    /// Produces the interviewer's reply to the latest candidate message.
    ///
    /// `transcript` ends with that candidate message and may be a window over
    /// a longer conversation.
    async fn get_response(
        &self,
        description: &str,
        transcript: &[Message],
        interview_type: InterviewType,
    ) -> Result<String>;

    /// Writes the end-of-interview feedback from the full transcript.
    async fn end_interview(
        &self,
        description: &str,
        transcript: &[Message],
        interview_type: InterviewType,
    ) -> Result<String>;

    /// Human readable name of the backing model.
    fn name(&self) -> String;

    /// Checks whether the backend can currently serve requests.
    async fn status(&self) -> CapabilityStatus;
}

/// A `ProblemGenerator` backed by any OpenAI-compatible chat completions API.
pub struct LLMProblemGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: HashMap<String, String>,
}

impl LLMProblemGenerator {
    /// Creates a new generator.
    ///
    /// # Arguments
    ///
    /// * `config` - OpenAI API configuration (API key, base URL, etc.).
    /// * `model` - Chat model identifier (e.g., "gpt-4o").
    /// * `prompts` - Template map; must contain `problem`, `interviewer` and
    ///   `feedback`.
    pub fn new(config: OpenAIConfig, model: String, prompts: HashMap<String, String>) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            prompts,
        }
    }

    fn template(&self, name: &str) -> Result<&str> {
        self.prompts
            .get(name)
            .map(String::as_str)
            .with_context(|| format!("Missing prompt template: '{name}'"))
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        let content = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_ref()
            .context("No content in LLM response")?;
        Ok(content.trim().to_string())
    }
}

/// Renders a transcript as plain "role: content" lines.
fn format_transcript(transcript: &[Message]) -> String {
    transcript
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ProblemGenerator for LLMProblemGenerator {
    async fn get_problem(
        &self,
        requirements: &str,
        difficulty: Difficulty,
        topic: &str,
        interview_type: InterviewType,
    ) -> Result<String> {
        let difficulty_name = difficulty.to_string();
        let type_name = interview_type.to_string();
        let prompt = prompts::render(
            self.template(PROBLEM_PROMPT)?,
            &[
                ("difficulty", difficulty_name.as_str()),
                ("interview_type", type_name.as_str()),
                ("topic", topic),
                ("requirements", requirements),
            ],
        );
        info!(%interview_type, %difficulty, topic, "Requesting problem from LLM");

        self.complete(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content("You are an expert interviewer who writes interview problems.")
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ])
        .await
    }

    async fn init_conversation(
        &self,
        _description: &str,
        _interview_type: InterviewType,
    ) -> Result<Vec<Message>> {
        Ok(vec![Message::interviewer(catalog::greeting())])
    }

    async fn get_response(
        &self,
        description: &str,
        transcript: &[Message],
        interview_type: InterviewType,
    ) -> Result<String> {
        let type_name = interview_type.to_string();
        let system_prompt = prompts::render(
            self.template(INTERVIEWER_PROMPT)?,
            &[
                ("interview_type", type_name.as_str()),
                ("description", description),
            ],
        );

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()?
                .into(),
        ];
        for msg in transcript {
            match msg.role {
                Role::Candidate => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?
                        .into(),
                ),
                Role::Interviewer => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(msg.content.clone())
                        .build()?
                        .into(),
                ),
            };
        }
        debug!(history_len = transcript.len(), "Requesting interviewer reply");

        self.complete(messages).await
    }

    async fn end_interview(
        &self,
        description: &str,
        transcript: &[Message],
        interview_type: InterviewType,
    ) -> Result<String> {
        let type_name = interview_type.to_string();
        let rendered_transcript = format_transcript(transcript);
        let prompt = prompts::render(
            self.template(FEEDBACK_PROMPT)?,
            &[
                ("interview_type", type_name.as_str()),
                ("description", description),
                ("transcript", rendered_transcript.as_str()),
            ],
        );
        info!(transcript_len = transcript.len(), "Requesting interview feedback");

        self.complete(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content("You are an experienced interviewer giving candid, constructive feedback.")
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ])
        .await
    }

    fn name(&self) -> String {
        self.model.clone()
    }

    async fn status(&self) -> CapabilityStatus {
        probe(&self.client).await
    }
}

/// Asks an OpenAI-compatible backend to list its models as a cheap liveness check.
pub(crate) async fn probe(client: &Client<OpenAIConfig>) -> CapabilityStatus {
    match client.models().list().await {
        Ok(_) => CapabilityStatus::Ready,
        Err(e) => {
            warn!(error = %e, "Capability health check failed");
            CapabilityStatus::Unavailable(e.to_string())
        }
    }
}

/// A `ProblemGenerator` that returns canned text.
///
/// Useful for running the service without model credentials and for
/// deterministic tests.
pub struct PlaceholderProblemGenerator;

#[async_trait]
impl ProblemGenerator for PlaceholderProblemGenerator {
    async fn get_problem(
        &self,
        _requirements: &str,
        difficulty: Difficulty,
        topic: &str,
        interview_type: InterviewType,
    ) -> Result<String> {
        Ok(format!(
            "Here's a {} {} problem about {}: [Problem description]",
            difficulty, interview_type, topic
        ))
    }

    async fn init_conversation(
        &self,
        _description: &str,
        _interview_type: InterviewType,
    ) -> Result<Vec<Message>> {
        Ok(vec![Message::interviewer(catalog::greeting())])
    }

    async fn get_response(
        &self,
        _description: &str,
        _transcript: &[Message],
        _interview_type: InterviewType,
    ) -> Result<String> {
        Ok("This is a placeholder response from the AI interviewer.".to_string())
    }

    async fn end_interview(
        &self,
        _description: &str,
        _transcript: &[Message],
        _interview_type: InterviewType,
    ) -> Result<String> {
        Ok("Thank you for completing the interview. Here's some feedback: [Feedback]".to_string())
    }

    fn name(&self) -> String {
        "Placeholder LLM".to_string()
    }

    async fn status(&self) -> CapabilityStatus {
        CapabilityStatus::Ready
    }
}
