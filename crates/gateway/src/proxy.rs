use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use shared::AppError;
use svc_common::error::ApiError;

use crate::state::{AppState, ROUTES};

/// Bodies larger than this are rejected rather than buffered; every payload
/// this system forwards (tenant/user/resource/booking JSON) is small.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
];

/// Forwards every request whose path matches a known prefix to the owning
/// service, unchanged apart from hop-by-hop headers. No retry, no
/// authentication — each downstream service verifies its own bearer token.
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    match forward(&state, &method, &uri, headers, body).await {
        Ok(response) => response,
        Err(err) => ApiError::from(err).into_response(),
    }
}

async fn forward(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, AppError> {
    let path = uri.path();
    let upstream = ROUTES
        .iter()
        .find(|r| path == r.prefix || path.starts_with(&format!("{}/", r.prefix)))
        .map(|r| (r.upstream)(&state.config))
        .ok_or_else(|| AppError::NotFound(format!("no route for {path}")))?;

    let target = match uri.query() {
        Some(query) => format!("{upstream}{path}?{query}"),
        None => format!("{upstream}{path}"),
    };

    let body_bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| AppError::Validation(format!("request body unreadable: {err}")))?;

    // axum 0.7 and reqwest 0.11 pin different major versions of the `http`
    // crate, so header types cannot cross the boundary directly — go via
    // `&str`/`&[u8]` in both directions instead of the typed values.
    let reqwest_method: reqwest::Method = method
        .as_str()
        .parse()
        .map_err(|_| AppError::Validation(format!("unsupported method {method}")))?;
    let mut request = state.client.request(reqwest_method, &target);
    for (name, value) in headers.iter() {
        if !is_hop_by_hop(name.as_str()) {
            request = request.header(name.as_str(), value.as_bytes());
        }
    }
    if !body_bytes.is_empty() {
        request = request.body(body_bytes);
    }

    let upstream_response = request
        .send()
        .await
        .map_err(|err| AppError::DependencyUnavailable(format!("{target}: {err}")))?;

    let status = StatusCode::from_u16(upstream_response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);

    let mut response_headers = HeaderMap::new();
    for (name, value) in upstream_response.headers().iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            axum::http::HeaderName::from_bytes(name.as_str().as_bytes()),
            axum::http::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            response_headers.insert(name, value);
        }
    }

    let response_body = upstream_response
        .bytes()
        .await
        .map_err(|err| AppError::DependencyUnavailable(format!("{target}: {err}")))?;

    let mut response = (status, response_body).into_response();
    *response.headers_mut() = response_headers;
    Ok(response)
}

fn is_hop_by_hop(header_name: &str) -> bool {
    HOP_BY_HOP.contains(&header_name.to_ascii_lowercase().as_str())
}
