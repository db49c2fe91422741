//! API handlers for the riskpm server
//!
//! Provides REST endpoints for:
//! - Profile capture
//! - Standards upload
//! - Template generation, regeneration and download

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use risk_engine::{
    generate_template, regenerate_template, ProfileUpdate, RenderOutcome, RenderedTemplate,
    SessionSummary,
};
use serde::{Deserialize, Serialize};
use shared_types::{TemplateStyle, UploadedDocument};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Where the last parsed template can be fetched
pub const DOWNLOAD_PATH: &str = "/api/template/download";

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "riskpm-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Session response
#[derive(Serialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub session: SessionSummary,
}

/// Handler: GET /api/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.session.lock().await;
    Json(SessionResponse {
        success: true,
        session: session.summary(),
    })
}

/// Handler: PUT /api/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Json<SessionResponse> {
    let mut session = state.session.lock().await;
    session.update_profile(update);
    debug!("Profile updated: {:?}", session.profile);

    Json(SessionResponse {
        success: true,
        session: session.summary(),
    })
}

/// Standards upload response
#[derive(Serialize)]
pub struct StandardsResponse {
    pub success: bool,
    pub files: Vec<String>,
    pub characters: usize,
}

/// Handler: POST /api/standards
///
/// Multipart form with one or more `files` parts. All files are extracted
/// together; if any file fails to decode nothing is stored.
pub async fn handle_upload_standards(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StandardsResponse>, ServerError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(format!("Malformed upload: {}", e)))?
    {
        if !matches!(field.name(), Some("files") | Some("file")) {
            continue;
        }

        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidRequest(format!("Failed to read '{}': {}", filename, e)))?;

        documents.push(UploadedDocument::new(filename, bytes.to_vec()));
    }

    if documents.is_empty() {
        return Err(ServerError::InvalidRequest(
            "No files provided. Upload PDFs in the 'files' field".to_string(),
        ));
    }

    let files: Vec<String> = documents.iter().map(|d| d.filename.clone()).collect();
    info!("Standards upload: {} file(s)", files.len());

    let text = tokio::task::spawn_blocking(move || shared_pdf::extract_standards_text(&documents))
        .await
        .map_err(|e| ServerError::Internal(format!("Extraction task failed: {}", e)))??;

    let characters = text.chars().count();
    state.session.lock().await.set_standards(files.clone(), text);

    Ok(Json(StandardsResponse {
        success: true,
        files,
        characters,
    }))
}

/// Handler: DELETE /api/standards
pub async fn handle_clear_standards(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut session = state.session.lock().await;
    session.clear_standards();

    Json(SessionResponse {
        success: true,
        session: session.summary(),
    })
}

/// Generate request body
#[derive(Deserialize)]
pub struct GenerateRequest {
    /// "long" or "short"; defaults to the session's current style
    #[serde(default)]
    pub style: Option<String>,
}

/// Regenerate request body
#[derive(Deserialize)]
pub struct RegenerateRequest {
    /// Comments to amend the current template
    #[serde(default)]
    pub comments: String,
}

/// Rendered template response
#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    /// True when the reply parsed as CSV
    pub success: bool,
    pub file_name: String,
    pub raw_text: String,
    /// "parsed" or "unparsed"
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<&'static str>,
}

impl From<&RenderedTemplate> for TemplateResponse {
    fn from(template: &RenderedTemplate) -> Self {
        let base = TemplateResponse {
            success: false,
            file_name: template.file_name.clone(),
            raw_text: template.raw_text.clone(),
            status: "unparsed",
            headers: None,
            rows: None,
            row_count: None,
            table_html: None,
            error: None,
            download_url: None,
        };

        match &template.outcome {
            RenderOutcome::Parsed(table) => TemplateResponse {
                success: true,
                status: "parsed",
                headers: Some(table.headers.clone()),
                rows: Some(table.rows.clone()),
                row_count: Some(table.row_count()),
                table_html: Some(table.to_html()),
                download_url: Some(DOWNLOAD_PATH),
                ..base
            },
            RenderOutcome::Unparsed { error } => TemplateResponse {
                error: Some(format!(
                    "There was an error parsing the CSV. Please check the format of the response. {}",
                    error
                )),
                ..base
            },
        }
    }
}

/// Handler: POST /api/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<TemplateResponse>, ServerError> {
    let style = match req.style.as_deref() {
        Some(s) => s
            .parse::<TemplateStyle>()
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?,
        None => state.session.lock().await.style,
    };

    info!("Generate request: style={}", style.as_str());

    let rendered = generate_template(
        state.completion.as_ref(),
        &state.session,
        style,
        &state.settings,
    )
    .await?;

    Ok(Json(TemplateResponse::from(&rendered)))
}

/// Handler: POST /api/regenerate
pub async fn handle_regenerate(
    State(state): State<AppState>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<TemplateResponse>, ServerError> {
    info!("Regenerate request: edit comments={} chars", req.comments.len());

    let rendered = regenerate_template(
        state.completion.as_ref(),
        &state.session,
        &req.comments,
        &state.settings,
    )
    .await?;

    Ok(Json(TemplateResponse::from(&rendered)))
}

/// Handler: GET /api/template/download
pub async fn handle_download(State(state): State<AppState>) -> Result<Response, ServerError> {
    let session = state.session.lock().await;
    let download = session
        .download()
        .ok_or_else(|| ServerError::NotFound("No parsed template available".to_string()))?;

    let disposition = format!("attachment; filename=\"{}\"", download.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.body.to_string(),
    )
        .into_response())
}
