//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and its OpenAPI documentation.

use crate::{
    handlers,
    models::{
        AudioFramePayload, CapabilitiesView, CapabilityView, CatalogView, ErrorResponse,
        InstructionsView, InterviewTypeView, MessageView, ProblemView, SessionView,
        StartInterviewPayload, SubmitMessagePayload,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_catalog,
        handlers::get_instructions,
        handlers::create_session,
        handlers::get_session,
        handlers::delete_session,
        handlers::start_interview,
        handlers::submit_message,
        handlers::push_audio,
        handlers::process_audio,
        handlers::finish_interview,
    ),
    components(
        schemas(
            SessionView, ProblemView, MessageView, CatalogView, InterviewTypeView,
            InstructionsView, CapabilitiesView, CapabilityView, StartInterviewPayload,
            SubmitMessagePayload, AudioFramePayload, ErrorResponse
        )
    ),
    tags(
        (name = "Interview API", description = "Mock interview sessions with problem generation, replies and feedback")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/catalog", get(handlers::get_catalog))
        .route("/instructions", get(handlers::get_instructions))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/start", post(handlers::start_interview))
        .route("/sessions/{id}/messages", post(handlers::submit_message))
        .route("/sessions/{id}/audio", post(handlers::push_audio))
        .route("/sessions/{id}/audio/process", post(handlers::process_audio))
        .route("/sessions/{id}/finish", post(handlers::finish_interview))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
