//! HTTP surface of the gateway.
//!
//! - `GET /cdc-file/{urn}?type=<category>` with an optional fallback header
//!   carrying comma-separated urns
//! - `GET /health`

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use cdcfile_catalog::MetadataResolver;
use cdcfile_model::{FileCategory, FileRecord, Urn};
use cdcfile_storage::BlobFetcher;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::ManagerError;
use crate::manager::FileManager;

/// Characters left unescaped in an RFC 5987 `filename*` value.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Shared by every request.
pub struct GatewayState<R, F> {
    manager: Arc<FileManager<R, F>>,
    fallback_header: HeaderName,
    shutdown: CancellationToken,
}

impl<R, F> GatewayState<R, F> {
    pub fn new(manager: FileManager<R, F>, fallback_header: HeaderName) -> Self {
        Self {
            manager: Arc::new(manager),
            fallback_header,
            shutdown: CancellationToken::new(),
        }
    }

    /// Requests in flight are cancelled when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn manager(&self) -> &FileManager<R, F> { &self.manager }

    /// Token for one request. It fires on shutdown or when the guard drops.
    fn request_token(&self) -> (CancellationToken, DropGuard) {
        let cancel = self.shutdown.child_token();
        let guard = cancel.clone().drop_guard();
        (cancel, guard)
    }
}

impl<R, F> Clone for GatewayState<R, F> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
            fallback_header: self.fallback_header.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

pub fn router<R, F>(state: GatewayState<R, F>) -> Router
where
    R: MetadataResolver + 'static,
    F: BlobFetcher + 'static,
{
    Router::new()
        .route("/cdc-file/{urn}", get(get_file_handler::<R, F>))
        .route("/health", get(health_handler))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}

/// A validated `GET /cdc-file/{urn}` request.
#[derive(Debug, PartialEq, Eq)]
pub struct FileRequest {
    pub urn: Urn,
    pub category: FileCategory,
    pub fallback_urns: Option<Vec<Urn>>,
}

/// Caller errors, all answered with 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid urn '{0}'")]
    InvalidUrn(String),

    #[error("missing 'type' query parameter")]
    MissingType,

    #[error("unknown file type '{0}', expected one of: report, site-plan")]
    UnknownType(String),

    #[error("fallback header '{0}' is empty")]
    EmptyFallback(HeaderName),

    #[error("fallback header '{header}' is not a valid urn list: {reason}")]
    InvalidFallback { header: HeaderName, reason: String },
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Validate the path segment, query parameter and fallback header.
pub fn parse_request(
    urn: &str,
    file_type: Option<&str>,
    fallback_header: &HeaderName,
    headers: &HeaderMap,
) -> Result<FileRequest, RequestError> {
    let urn = urn.parse::<Urn>().map_err(|_| RequestError::InvalidUrn(urn.to_string()))?;

    let category = match file_type {
        None => return Err(RequestError::MissingType),
        Some(raw) if raw.trim().is_empty() => return Err(RequestError::MissingType),
        Some(raw) => raw
            .parse::<FileCategory>()
            .map_err(|_| RequestError::UnknownType(raw.to_string()))?,
    };

    let fallback_urns = match headers.get(fallback_header) {
        None => None,
        Some(value) => Some(parse_fallback(fallback_header, value)?),
    };

    Ok(FileRequest {
        urn,
        category,
        fallback_urns,
    })
}

fn parse_fallback(header: &HeaderName, value: &HeaderValue) -> Result<Vec<Urn>, RequestError> {
    let raw = value.to_str().map_err(|e| RequestError::InvalidFallback {
        header: header.clone(),
        reason: e.to_string(),
    })?;
    if raw.trim().is_empty() {
        return Err(RequestError::EmptyFallback(header.clone()));
    }
    Urn::parse_list(raw).map_err(|e| RequestError::InvalidFallback {
        header: header.clone(),
        reason: e.to_string(),
    })
}

/// `GET /cdc-file/{urn}`
pub async fn get_file_handler<R, F>(
    State(state): State<GatewayState<R, F>>,
    Path(urn): Path<String>,
    Query(query): Query<FileQuery>,
    headers: HeaderMap,
) -> Response
where
    R: MetadataResolver,
    F: BlobFetcher,
{
    let request = match parse_request(&urn, query.file_type.as_deref(), &state.fallback_header, &headers) {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(%urn, error = %e, "rejecting request");
            return e.into_response();
        }
    };

    // Dropping the handler future (client went away) cancels the request.
    let (cancel, _guard) = state.request_token();

    let result = state
        .manager
        .get_file(
            request.urn,
            request.category,
            request.fallback_urns.as_deref(),
            &cancel,
        )
        .await;

    match result {
        Ok(Some(file)) => file_response(file),
        Ok(None) => {
            tracing::info!(urn = %request.urn, category = %request.category, "no files found");
            (StatusCode::NOT_FOUND, format!("no {} files found for urn {}", request.category, request.urn)).into_response()
        }
        Err(ManagerError::Cancelled) => {
            tracing::warn!(urn = %request.urn, "request cancelled");
            (StatusCode::SERVICE_UNAVAILABLE, "request cancelled").into_response()
        }
        Err(e) => {
            tracing::error!(urn = %request.urn, error = %e, "failed to get file");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health_handler() -> &'static str { "ok" }

/// 200 with the file's bytes, content type and, when named, a download name.
pub fn file_response(file: FileRecord) -> Response {
    let mut headers = HeaderMap::new();

    match HeaderValue::from_str(file.content_type()) {
        Ok(value) => {
            headers.insert(CONTENT_TYPE, value);
        }
        Err(_) => {
            tracing::warn!(content_type = file.content_type(), "content type is not a valid header value");
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(cdcfile_model::DEFAULT_CONTENT_TYPE));
        }
    }

    if let Some(value) = file.file_name().and_then(content_disposition) {
        headers.insert(CONTENT_DISPOSITION, value);
    }

    (StatusCode::OK, headers, file.content_bytes().clone()).into_response()
}

/// `attachment; filename="..."; filename*=UTF-8''...`
///
/// The plain `filename` keeps printable ASCII only; `filename*` carries the
/// full name.
pub fn content_disposition(file_name: &str) -> Option<HeaderValue> {
    let ascii: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, ATTR_CHAR);
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}"
    ))
    .ok()
}
