//! Request handlers.

use crate::builder::BuildError;
use crate::cache::SheetArtifact;
use crate::fetch::TileSource;
use crate::service::SheetService;
use crate::time::now_millis;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use url::form_urlencoded;

pub const HEADER_SHEET_QUERY: &str = "x-sheet-query";
pub const HEADER_SHEET_COLS: &str = "x-sheet-cols";
pub const HEADER_SHEET_ROWS: &str = "x-sheet-rows";
pub const HEADER_SHEET_GENERATED_AT: &str = "x-sheet-generated-at";

/// Routes listed by `/`.
pub const ENDPOINTS: [&str; 4] = ["/", "/healthz", "/update_sheet", "/sheet.png"];

fn no_store() -> HeaderValue {
    HeaderValue::from_static("no-store")
}

/// Query string of `/update_sheet`.
///
/// Everything arrives as text so malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, PartialEq)]
pub struct UpdateSheetParams {
    pub q: Option<String>,
    pub cols: Option<String>,
    pub rows: Option<String>,
    pub page: Option<String>,
}

impl UpdateSheetParams {
    /// Collects the known parameters from raw pairs.
    ///
    /// A repeated parameter keeps its first value; unknown names are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "q" => &mut params.q,
                "cols" => &mut params.cols,
                "rows" => &mut params.rows,
                "page" => &mut params.page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UpdateSheetResponse {
    pub ok: bool,
    pub q: String,
    pub cols: u32,
    pub rows: u32,
    pub at: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub ok: bool,
    pub at: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IndexResponse {
    pub ok: bool,
    pub endpoints: Vec<String>,
}

pub(super) async fn index() -> Response {
    json(
        StatusCode::OK,
        IndexResponse {
            ok: true,
            endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        },
    )
}

pub(super) async fn healthz() -> Response {
    json(
        StatusCode::OK,
        HealthResponse {
            ok: true,
            at: now_millis(),
        },
    )
}

pub(super) async fn update_sheet<S>(
    State(service): State<Arc<SheetService<S>>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response
where
    S: TileSource + 'static,
{
    let params = match query {
        Ok(Query(pairs)) => UpdateSheetParams::from_pairs(pairs),
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable update_sheet query string");
            return error(StatusCode::BAD_REQUEST, "invalid_query".to_string());
        }
    };

    let request = match service.sheet_request(
        params.q.as_deref().unwrap_or(""),
        params.cols.as_deref(),
        params.rows.as_deref(),
        params.page.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => {
            info!(reason = %e, "Sheet update rejected");
            return error(StatusCode::BAD_REQUEST, e.code().to_string());
        }
    };

    match service.regenerate(request).await {
        Ok(artifact) => {
            info!(
                query = %artifact.query(),
                shape = %artifact.shape(),
                bytes = artifact.len(),
                "Sheet updated"
            );
            json(
                StatusCode::OK,
                UpdateSheetResponse {
                    ok: true,
                    q: artifact.query().to_string(),
                    cols: artifact.shape().columns(),
                    rows: artifact.shape().rows(),
                    at: artifact.generated_at_millis(),
                },
            )
        }
        Err(e) => {
            warn!(error = %e, "Sheet update failed");
            error(StatusCode::BAD_GATEWAY, build_error_message(&e))
        }
    }
}

pub(super) async fn sheet_png<S>(State(service): State<Arc<SheetService<S>>>) -> Response
where
    S: TileSource + 'static,
{
    match service.latest() {
        Some(artifact) => {
            let mut response = png(artifact.png().clone());
            insert_sheet_headers(response.headers_mut(), &artifact);
            response
        }
        None => png(service.placeholder()),
    }
}

fn build_error_message(error: &BuildError) -> String {
    match error {
        BuildError::Fetch(e) => format!("tile_fetch_failed: {}", e),
        BuildError::Compose(e) => format!("compose_failed: {}", e),
        BuildError::Interrupted(reason) => format!("build_interrupted: {}", reason),
    }
}

fn json<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, no_store());
    response
}

fn error(status: StatusCode, message: String) -> Response {
    json(
        status,
        ErrorResponse {
            ok: false,
            error: message,
        },
    )
}

fn png(bytes: Bytes) -> Response {
    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(header::CACHE_CONTROL, no_store());
    response
}

fn insert_sheet_headers(headers: &mut HeaderMap, artifact: &SheetArtifact) {
    let shape = artifact.shape();
    let values = [
        (HEADER_SHEET_QUERY, percent_encode(artifact.query())),
        (HEADER_SHEET_COLS, shape.columns().to_string()),
        (HEADER_SHEET_ROWS, shape.rows().to_string()),
        (
            HEADER_SHEET_GENERATED_AT,
            artifact.generated_at_millis().to_string(),
        ),
    ];

    for (name, value) in values {
        // Every value here is ASCII
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

/// Percent-encodes `value` for use in a header; spaces become `%20`.
fn percent_encode(value: &str) -> String {
    // form encoding writes spaces as '+' and a literal '+' as %2B
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode() {
        assert_eq!(percent_encode("cat"), "cat");
        assert_eq!(percent_encode("cats & dogs"), "cats%20%26%20dogs");
        assert_eq!(percent_encode("c++"), "c%2B%2B");
        assert_eq!(percent_encode("猫"), "%E7%8C%AB");
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_params_keep_first_repeated_value() {
        let params = UpdateSheetParams::from_pairs(pairs(&[
            ("q", "a"),
            ("cols", "2"),
            ("q", "b"),
            ("cols", "9"),
            ("utm_source", "x"),
        ]));

        assert_eq!(
            params,
            UpdateSheetParams {
                q: Some("a".to_string()),
                cols: Some("2".to_string()),
                rows: None,
                page: None,
            }
        );
    }

    #[test]
    fn test_params_from_no_pairs() {
        assert_eq!(
            UpdateSheetParams::from_pairs(Vec::new()),
            UpdateSheetParams::default()
        );
    }

    #[test]
    fn test_build_error_message() {
        let error = BuildError::Fetch(crate::fetch::FetchError::Status {
            index: 7,
            status: 404,
        });
        assert_eq!(
            build_error_message(&error),
            "tile_fetch_failed: tile 7: upstream returned HTTP 404"
        );
    }

    #[tokio::test]
    async fn test_json_responses_are_not_cached() {
        let response = healthz().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let response = error(StatusCode::BAD_REQUEST, "missing_query".to_string());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_update_response_shape() {
        let body = UpdateSheetResponse {
            ok: true,
            q: "cat".to_string(),
            cols: 3,
            rows: 4,
            at: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"ok": true, "q": "cat", "cols": 3, "rows": 4, "at": 1_700_000_000_000i64})
        );
    }

    #[test]
    fn test_png_response_headers() {
        let response = png(Bytes::from_static(b"\x89PNG"));
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(response.headers().get(HEADER_SHEET_QUERY).is_none());
    }
}
