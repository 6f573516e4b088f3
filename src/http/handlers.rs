use super::state::AppState;
use crate::error::InterviewError;
use crate::questions::{EditQuestionRequest, EditedQuestion, GeneratedQuestions, GenerationRequest};
use crate::scoring::{ScoreResult, ScoringHealth};
use crate::session::{
    InterviewResult, InterviewTemplate, InterviewUpdate, NewInterview, ResultFilter, ResultRecord,
    ReviewStatus, Session, StartFromInterview, StartInterview, StartedInterview, SubmitOutcome,
};
use crate::speech::{AudioUpload, TRANSCRIPTION_FAILED};
use crate::store::{InterviewStore, ResultStore};
use axum::{
    extract::{rejection::FormRejection, Form, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// A WAV file this size or smaller carries no audio
const WAV_HEADER_BYTES: usize = 44;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitResponseForm {
    pub session_id: String,
    pub question_index: i64,
    #[serde(default)]
    pub transcript_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcript: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub question: String,
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `{"error": ...}` with a mapped status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Generation endpoints report bad input as 422
    fn unprocessable(e: InterviewError) -> Self {
        match e {
            InterviewError::InvalidInput(message) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message,
            },
            other => other.into(),
        }
    }
}

impl From<InterviewError> for ApiError {
    fn from(e: InterviewError) -> Self {
        let status = match &e {
            InterviewError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            InterviewError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterviewError::FailedPrecondition(_) => StatusCode::BAD_REQUEST,
            InterviewError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            InterviewError::Storage(_) | InterviewError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.message);
        } else {
            warn!("{} {}", self.status, self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn question_index(raw: i64) -> Result<usize, InterviewError> {
    usize::try_from(raw).map_err(|_| {
        InterviewError::invalid_input(format!("Question index {} out of range", raw))
    })
}

// ============================================================================
// Interview sessions
// ============================================================================

/// POST /interview/start
/// Create a session from job details or client-supplied questions
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterview>,
) -> ApiResult<StartedInterview> {
    info!(
        "Starting interview: role={:?}, questions_supplied={}",
        req.job_role,
        req.questions.is_some()
    );
    Ok(Json(state.sessions.start_interview(req).await?))
}

/// GET /interview/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Session> {
    Ok(Json(state.sessions.get_session(&session_id).await?))
}

/// POST /interview/submit
/// Link a transcript (or a skip) to a question
pub async fn submit_response(
    State(state): State<AppState>,
    form: Result<Form<SubmitResponseForm>, FormRejection>,
) -> ApiResult<SubmitOutcome> {
    let Form(form) =
        form.map_err(|rejection| InterviewError::invalid_input(rejection.body_text()))?;
    let index = question_index(form.question_index)?;
    let outcome = state
        .sessions
        .submit_response(&form.session_id, index, form.transcript_id)
        .await?;
    Ok(Json(outcome))
}

/// GET /interview/:session_id/results
/// Score a completed session
pub async fn get_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<InterviewResult> {
    Ok(Json(state.sessions.get_results(&session_id).await?))
}

// ============================================================================
// Speech
// ============================================================================

/// POST /transcribe
/// Multipart upload: `audio`, optional `session_id` and `question_index`
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<TranscribeResponse> {
    let mut audio: Option<AudioUpload> = None;
    let mut session_id: Option<String> = None;
    let mut index: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InterviewError::invalid_input(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    InterviewError::invalid_input(format!("Failed to read audio: {}", e))
                })?;
                audio = Some(AudioUpload {
                    bytes: bytes.to_vec(),
                    filename,
                    content_type,
                });
            }
            "session_id" | "question_index" => {
                let value = field.text().await.map_err(|e| {
                    InterviewError::invalid_input(format!("Invalid field {}: {}", name, e))
                })?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                if name == "session_id" {
                    session_id = value;
                } else {
                    index = value;
                }
            }
            _ => {}
        }
    }

    let audio = audio
        .filter(|a| !a.bytes.is_empty())
        .ok_or_else(|| InterviewError::invalid_input("Audio file is required"))?;
    let filename = audio.filename.clone();

    let text = match state.transcriber.transcribe(audio).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Transcription failed: {:#}", e);
            TRANSCRIPTION_FAILED.to_string()
        }
    };

    let transcript_id = match (session_id, index) {
        (Some(session_id), Some(raw)) => {
            let raw: i64 = raw.parse().map_err(|_| {
                InterviewError::invalid_input(format!("Invalid question index: {}", raw))
            })?;
            let transcript = state
                .sessions
                .record_transcript(
                    &session_id,
                    question_index(raw)?,
                    text.clone(),
                    filename.clone(),
                )
                .await?;
            Some(transcript.id)
        }
        _ => None,
    };

    Ok(Json(TranscribeResponse {
        transcript: text,
        transcript_id,
        filename,
        timestamp: Utc::now(),
    }))
}

/// POST /synthesize
/// Returns `audio/wav`
pub async fn synthesize(
    State(state): State<AppState>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Response, ApiError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(InterviewError::invalid_input("Text is required").into());
    }
    let voice = req
        .voice
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(state.default_voice.as_str());

    let audio = state
        .synthesizer
        .synthesize(text, voice)
        .await
        .map_err(|e| InterviewError::upstream(format!("Speech synthesis failed: {:#}", e)))?;
    if audio.len() <= WAV_HEADER_BYTES {
        return Err(InterviewError::upstream("Speech synthesis produced no audio").into());
    }

    info!("Synthesized {} bytes with voice {}", audio.len(), voice);
    Ok(([(header::CONTENT_TYPE, "audio/wav")], audio).into_response())
}

// ============================================================================
// Question generation
// ============================================================================

/// POST /generate
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(req): Json<GenerationRequest>,
) -> ApiResult<GeneratedQuestions> {
    let generated = state
        .generator
        .generate(&req)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(generated))
}

/// POST /questions/edit
pub async fn edit_question(
    State(state): State<AppState>,
    Json(req): Json<EditQuestionRequest>,
) -> ApiResult<EditedQuestion> {
    let edited = state
        .generator
        .edit_question(&req)
        .await
        .map_err(ApiError::unprocessable)?;
    Ok(Json(edited))
}

// ============================================================================
// Scoring
// ============================================================================

/// POST /scoring/score
/// Standalone scoring with strict transcript checks
pub async fn score_response(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult<ScoreResult> {
    if req.question.trim().is_empty() {
        return Err(InterviewError::invalid_input("Question cannot be empty").into());
    }
    let policy = state.scorer.standalone_policy();
    Ok(Json(
        state
            .scorer
            .score(&req.question, &req.transcript, &policy)
            .await?,
    ))
}

/// GET /scoring/health
pub async fn scoring_health(State(state): State<AppState>) -> (StatusCode, Json<ScoringHealth>) {
    let health = state.scorer.health().await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}

// ============================================================================
// Interview templates
// ============================================================================

/// POST /interviews
pub async fn create_interview(
    State(state): State<AppState>,
    Json(req): Json<NewInterview>,
) -> Result<(StatusCode, Json<InterviewTemplate>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(InterviewError::invalid_input("Interview title is required").into());
    }
    let interview = InterviewTemplate::new(req);
    state.store.create_interview(interview.clone()).await?;
    info!("Created interview {} ({})", interview.id, interview.title);
    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /interviews
pub async fn list_interviews(State(state): State<AppState>) -> ApiResult<Vec<InterviewTemplate>> {
    Ok(Json(state.store.list_interviews().await?))
}

/// GET /interviews/:interview_id
pub async fn get_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> ApiResult<InterviewTemplate> {
    let interview = state
        .store
        .get_interview(&interview_id)
        .await?
        .ok_or_else(|| InterviewError::not_found("Interview", &interview_id))?;
    Ok(Json(interview))
}

/// PUT /interviews/:interview_id
/// Edit title, description, question settings or the active flag
pub async fn update_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Json(req): Json<InterviewUpdate>,
) -> ApiResult<InterviewTemplate> {
    let interview = state.store.update_interview(&interview_id, req).await?;
    info!(
        "Updated interview {} (active: {})",
        interview.id, interview.active
    );
    Ok(Json(interview))
}

/// DELETE /interviews/:interview_id
pub async fn delete_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_interview(&interview_id).await?;
    info!("Deleted interview {}", interview_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /interviews/:interview_id/results
pub async fn list_interview_results(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Query(filter): Query<ResultFilter>,
) -> ApiResult<Vec<ResultRecord>> {
    let filter = ResultFilter {
        interview_id: Some(interview_id),
        ..filter
    };
    filtered_results(&state, &filter).await
}

/// POST /interviews/:interview_id/start
pub async fn start_from_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
    Json(req): Json<StartFromInterview>,
) -> ApiResult<StartedInterview> {
    Ok(Json(
        state
            .sessions
            .start_from_interview(&interview_id, req)
            .await?,
    ))
}

// ============================================================================
// Results review
// ============================================================================

/// GET /results?interview_id=&candidate_id=
pub async fn list_results(
    State(state): State<AppState>,
    Query(filter): Query<ResultFilter>,
) -> ApiResult<Vec<ResultRecord>> {
    filtered_results(&state, &filter).await
}

async fn filtered_results(state: &AppState, filter: &ResultFilter) -> ApiResult<Vec<ResultRecord>> {
    let mut results = state.store.list_results().await?;
    results.retain(|record| filter.matches(record));
    Ok(Json(results))
}

/// GET /results/:session_id
pub async fn get_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ResultRecord> {
    let record = state
        .store
        .get_result(&session_id)
        .await?
        .ok_or_else(|| InterviewError::not_found("Result", &session_id))?;
    Ok(Json(record))
}

/// DELETE /results/:session_id
pub async fn delete_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_result(&session_id).await?;
    info!("Deleted result for session {}", session_id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /results/:session_id/accept
pub async fn accept_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ResultRecord> {
    review(&state, &session_id, ReviewStatus::Accepted).await
}

/// POST /results/:session_id/reject
pub async fn reject_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<ResultRecord> {
    review(&state, &session_id, ReviewStatus::Rejected).await
}

async fn review(state: &AppState, session_id: &str, status: ReviewStatus) -> ApiResult<ResultRecord> {
    let record = state.store.set_result_status(session_id, status).await?;
    info!("Result for session {} marked {:?}", session_id, status);
    Ok(Json(record))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
