//! Main Entrypoint for the Interview API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the problem generator and speech collaborators for the
//!    configured provider.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use interview_api::{
    config::{Config, Provider},
    router::create_router,
    state::AppState,
};
use interview_core::{
    generator::{LLMProblemGenerator, PlaceholderProblemGenerator, ProblemGenerator},
    prompts::load_prompts,
    speech::{
        OpenAISpeechSynthesizer, OpenAISpeechTranscriber, PlaceholderSpeechSynthesizer,
        PlaceholderSpeechTranscriber, SpeechSynthesizer, SpeechTranscriber, parse_voice,
    },
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

type Collaborators = (
    Arc<dyn ProblemGenerator>,
    Arc<dyn SpeechSynthesizer>,
    Arc<dyn SpeechTranscriber>,
);

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn build_collaborators(config: &Config) -> anyhow::Result<Collaborators> {
    match &config.provider {
        Provider::OpenAI => {
            info!("Using OpenAI provider.");
            let api_key = config
                .openai_api_key
                .as_ref()
                .context("OPENAI_API_KEY must be set for 'openai' provider")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://api.openai.com/v1");
            let prompts = load_prompts(&config.prompts_path)?;
            let voice = parse_voice(&config.tts_voice)?;
            Ok((
                Arc::new(LLMProblemGenerator::new(
                    openai_config.clone(),
                    config.chat_model.clone(),
                    prompts,
                )),
                Arc::new(OpenAISpeechSynthesizer::new(
                    openai_config.clone(),
                    config.tts_model.clone(),
                    voice,
                )),
                Arc::new(OpenAISpeechTranscriber::new(
                    openai_config,
                    config.stt_model.clone(),
                )),
            ))
        }
        Provider::Gemini => {
            info!("Using Gemini provider. Speech falls back to placeholders.");
            let api_key = config
                .gemini_api_key
                .as_ref()
                .context("GEMINI_API_KEY must be set for 'gemini' provider")?;
            let openai_config = OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai");
            let prompts = load_prompts(&config.prompts_path)?;
            Ok((
                Arc::new(LLMProblemGenerator::new(
                    openai_config,
                    config.chat_model.clone(),
                    prompts,
                )),
                Arc::new(PlaceholderSpeechSynthesizer),
                Arc::new(PlaceholderSpeechTranscriber),
            ))
        }
        Provider::Placeholder => {
            info!("Using placeholder provider.");
            Ok((
                Arc::new(PlaceholderProblemGenerator),
                Arc::new(PlaceholderSpeechSynthesizer),
                Arc::new(PlaceholderSpeechTranscriber),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Collaborators ---
    let (generator, synthesizer, transcriber) =
        build_collaborators(&config).context("Failed to initialize collaborators")?;
    let app_state = Arc::new(AppState::new(
        config.clone(),
        generator,
        synthesizer,
        transcriber,
    ));

    let capabilities = app_state.capabilities().await;
    info!(
        generator = %capabilities.generator.name,
        synthesizer = %capabilities.synthesizer.name,
        transcriber = %capabilities.transcriber.name,
        all_ready = capabilities.all_ready(),
        "Collaborators initialized"
    );

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        history_window = config.history_window,
        voice_enabled = config.voice_enabled,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
