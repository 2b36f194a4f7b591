// src/proxy.rs
use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::AppState;

/// `GET /proxyhttp/{host-and-path}`: relay a remote http resource.
///
/// The consumer's WebGL context cannot read cross-domain images, so the
/// frontend rewrites remote artwork URLs through this route. Status and
/// content type pass through; upstream failures map to 502.
pub async fn proxy_resource(
    Path(resource): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<AppState>,
) -> Response {
    let url = match query {
        Some(q) => format!("http://{resource}?{q}"),
        None => format!("http://{resource}"),
    };

    let upstream = match state.proxy_client.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = ?e, url = %url, "proxy upstream fetch failed");
            return (StatusCode::BAD_GATEWAY, "upstream fetch failed").into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| HeaderValue::from_bytes(v.as_bytes()).ok());

    let bytes = match upstream.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = ?e, url = %url, "proxy upstream body read failed");
            return (StatusCode::BAD_GATEWAY, "upstream body read failed").into_response();
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    builder
        .body(Body::from(bytes.to_vec()))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}
