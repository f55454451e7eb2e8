// HTTP surface: `/`, `/info`, `/download`

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::downloader::extractors::BlockingReason;
use crate::downloader::{DownloadError, DownloadOrchestrator, StreamCatalog, VideoMetadata};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DownloadOrchestrator>,
    /// Used when `/download` gets no `resolution`
    pub default_resolution: String,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/info", get(info))
        .route("/download", get(download))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub reason: Option<BlockingReason>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            reason: None,
        }
    }
}

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        let status = match &err {
            DownloadError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DownloadError::StreamNotFound => StatusCode::NOT_FOUND,
            DownloadError::Extraction { .. }
            | DownloadError::ArtifactNotFound(_)
            | DownloadError::Storage(_)
            | DownloadError::EngineUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            match err.reason() {
                Some(reason) => warn!(
                    error = %err,
                    reason = reason.description(),
                    permanent = reason.is_permanent(),
                    "Request failed"
                ),
                None => warn!(error = %err, "Request failed"),
            }
        }

        Self {
            status,
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<BlockingReason>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            reason: self.reason,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub message: String,
    pub engine: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    #[serde(flatten)]
    pub metadata: VideoMetadata,
    pub formats: StreamCatalog,
}

fn required_url(url: Option<String>) -> ApiResult<String> {
    url.map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing required query parameter: url"))
}

async fn home(State(state): State<AppState>) -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "video-relay is running".to_string(),
        engine: state.orchestrator.engine_name().to_string(),
    })
}

async fn info(
    State(state): State<AppState>,
    Query(query): Query<InfoQuery>,
) -> ApiResult<Json<InfoResponse>> {
    let url = required_url(query.url)?;
    let (metadata, formats) = state.orchestrator.resolve(&url).await?;
    Ok(Json(InfoResponse { metadata, formats }))
}

async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let url = required_url(query.url)?;
    let resolution = query
        .resolution
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| state.default_resolution.clone());

    let prepared = state.orchestrator.fetch(&url, &resolution).await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header_value(prepared.content_type())?);
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(prepared.content_disposition())?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(prepared.size_bytes()));

    let body = Body::from_stream(prepared.into_stream());
    Ok((StatusCode::OK, headers, body).into_response())
}

fn header_value(value: String) -> ApiResult<HeaderValue> {
    HeaderValue::try_from(value).map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("invalid header value: {}", e),
        reason: None,
    })
}
