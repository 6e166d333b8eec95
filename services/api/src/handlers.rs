//! Axum Handlers for the REST API
//!
//! This module forwards HTTP requests into interview sessions and maps the
//! outcome back onto status codes. It uses `utoipa` doc comments to generate
//! OpenAPI documentation.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use interview_core::{audio::AudioClip, error::SessionError};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    audio_utils::decode_f32_from_base64_i16,
    models::{
        AudioFramePayload, CatalogView, ErrorResponse, InstructionsView, SessionView,
        StartInterviewPayload, SubmitMessagePayload,
    },
    state::{AppState, SharedSession},
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::BadGateway(message) => {
                error!("Upstream failure: {}", message);
                (StatusCode::BAD_GATEWAY, message)
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err {
            SessionError::InvalidSettings(_)
            | SessionError::EmptyMessage
            | SessionError::InvalidAudio(_) => ApiError::BadRequest(message),
            SessionError::InvalidTransition { .. } => ApiError::Conflict(message),
            SessionError::CollaboratorFailure { .. } => ApiError::BadGateway(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, ApiError> {
    state
        .session(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))
}

/// List the interview types, topics and difficulties on offer.
#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Interview catalog", body = CatalogView)
    )
)]
pub async fn get_catalog() -> Json<CatalogView> {
    Json(CatalogView::build())
}

/// Get the instructions page along with the status of each collaborator.
#[utoipa::path(
    get,
    path = "/instructions",
    responses(
        (status = 200, description = "Instructions and capability status", body = InstructionsView)
    )
)]
pub async fn get_instructions(State(state): State<Arc<AppState>>) -> Json<InstructionsView> {
    Json(InstructionsView::new(state.capabilities().await))
}

/// Create a new, not yet started interview session.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = SessionView)
    )
)]
#[instrument(skip_all)]
pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (id, session) = state.create_session().await;
    info!(session_id = %id, "Session created");
    let interview = session.lock().await;
    (
        StatusCode::CREATED,
        Json(SessionView::new(id, interview.session(), 0)),
    )
}

/// Get a specific session by its ID.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let interview = session.lock().await;
    Ok(Json(SessionView::new(
        id,
        interview.session(),
        interview.pending_audio_frames(),
    )))
}

/// Delete a session and everything recorded in it.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
#[instrument(skip(state))]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.remove_session(id).await {
        info!("Session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!(
            "Session with id '{}' not found",
            id
        )))
    }
}

/// Generate a problem and start the interview.
#[utoipa::path(
    post,
    path = "/sessions/{id}/start",
    request_body = StartInterviewPayload,
    responses(
        (status = 200, description = "Interview started", body = SessionView),
        (status = 400, description = "Invalid settings", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Interview already in progress", body = ErrorResponse),
        (status = 502, description = "Problem generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
#[instrument(skip(state, payload))]
pub async fn start_interview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<StartInterviewPayload>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(payload) = payload?;
    let session = find_session(&state, id).await?;
    let mut interview = session.lock().await;
    interview.start(payload.into()).await?;
    Ok(Json(SessionView::new(
        id,
        interview.session(),
        interview.pending_audio_frames(),
    )))
}

/// Send a candidate message and receive the interviewer's reply.
#[utoipa::path(
    post,
    path = "/sessions/{id}/messages",
    request_body = SubmitMessagePayload,
    responses(
        (status = 200, description = "Message and reply appended", body = SessionView),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Interview not in progress", body = ErrorResponse),
        (status = 502, description = "Reply generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
#[instrument(skip(state, payload))]
pub async fn submit_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SubmitMessagePayload>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let Json(payload) = payload?;
    let session = find_session(&state, id).await?;
    let mut interview = session.lock().await;
    interview.submit_message(&payload.text).await?;
    Ok(Json(SessionView::new(
        id,
        interview.session(),
        interview.pending_audio_frames(),
    )))
}

/// Queue one recorded audio frame for later processing.
#[utoipa::path(
    post,
    path = "/sessions/{id}/audio",
    request_body = AudioFramePayload,
    responses(
        (status = 202, description = "Frame queued", body = SessionView),
        (status = 400, description = "Malformed audio", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Interview not in progress", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn push_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AudioFramePayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let samples = decode_f32_from_base64_i16(&payload.audio)
        .map_err(|e| ApiError::BadRequest(format!("invalid audio: {}", e)))?;
    let session = find_session(&state, id).await?;
    let mut interview = session.lock().await;
    interview.push_audio_frame(AudioClip::new(samples, payload.sample_rate))?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SessionView::new(
            id,
            interview.session(),
            interview.pending_audio_frames(),
        )),
    ))
}

/// Transcribe the queued audio and submit it as a candidate message.
#[utoipa::path(
    post,
    path = "/sessions/{id}/audio/process",
    responses(
        (status = 200, description = "Audio processed, or nothing was queued", body = SessionView),
        (status = 400, description = "Unusable recording", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Interview not in progress", body = ErrorResponse),
        (status = 502, description = "Transcription or reply failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
#[instrument(skip(state))]
pub async fn process_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let mut interview = session.lock().await;
    interview.process_audio().await?;
    Ok(Json(SessionView::new(
        id,
        interview.session(),
        interview.pending_audio_frames(),
    )))
}

/// End the interview and produce feedback.
#[utoipa::path(
    post,
    path = "/sessions/{id}/finish",
    responses(
        (status = 200, description = "Interview finished with feedback", body = SessionView),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "Interview not in progress", body = ErrorResponse),
        (status = 502, description = "Feedback generation failed", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
#[instrument(skip(state))]
pub async fn finish_interview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let mut interview = session.lock().await;
    interview.finish().await?;
    Ok(Json(SessionView::new(
        id,
        interview.session(),
        interview.pending_audio_frames(),
    )))
}
