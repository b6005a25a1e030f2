use crate::app_state::AppState;
use crate::params::{ContentQuery, InputReference, ListJobsQuery, RawCreateForm};
use crate::proxy::{UpstreamBody, proxy_json, proxy_stream};
use crate::response::{error_response, json_response, method_not_allowed};
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Extension, Multipart, Path as AxumPath, Query};
use axum::http::{HeaderMap, Response, StatusCode};
use bytes::Bytes;
use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

/// POST /jobs
///
/// Validates the multipart form, then re-encodes a fresh outbound form with
/// only the whitelisted fields so nothing else can be injected upstream.
pub(crate) async fn create_job(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response<Body> {
    let Ok(mut multipart) = multipart else {
        return error_response(StatusCode::BAD_REQUEST, "Expected multipart/form-data");
    };

    let form = match collect_create_form(&mut multipart).await {
        Ok(form) => form,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let params = match form.validate() {
        Ok(params) => params,
        Err(error) => {
            warn!(%error, "Rejected create request");
            return error_response(StatusCode::BAD_REQUEST, &error.to_string());
        }
    };

    info!(
        model = %params.model,
        seconds = %params.seconds,
        size = %params.size,
        has_reference = params.input_reference.is_some(),
        "Creating video job"
    );

    let mut outbound = reqwest::multipart::Form::new()
        .text("prompt", params.prompt)
        .text("model", params.model)
        .text("seconds", params.seconds)
        .text("size", params.size);

    if let Some(reference) = params.input_reference {
        outbound = outbound.part("input_reference", reference.into_part());
    }

    proxy_json(
        &state,
        &headers,
        Method::POST,
        "/videos",
        UpstreamBody::Multipart(outbound),
    )
    .await
}

/// GET /jobs?after=&limit=&order=
pub(crate) async fn list_jobs(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListJobsQuery>,
) -> Response<Body> {
    let path = match query.to_query_string() {
        Some(qs) => format!("/videos?{qs}"),
        None => "/videos".to_string(),
    };

    proxy_json(&state, &headers, Method::GET, &path, UpstreamBody::Empty).await
}

/// OPTIONS /jobs, answered locally with no upstream call.
pub(crate) async fn options_jobs() -> Response<Body> {
    json_response(StatusCode::OK, &json!({ "ok": true }))
}

/// GET /jobs/{video_id}
pub(crate) async fn get_job(
    Extension(state): Extension<AppState>,
    AxumPath(video_id): AxumPath<String>,
    headers: HeaderMap,
) -> Response<Body> {
    let path = format!("/videos/{}", urlencoding::encode(&video_id));
    proxy_json(&state, &headers, Method::GET, &path, UpstreamBody::Empty).await
}

/// DELETE /jobs/{video_id}
pub(crate) async fn delete_job(
    Extension(state): Extension<AppState>,
    AxumPath(video_id): AxumPath<String>,
    headers: HeaderMap,
) -> Response<Body> {
    let path = format!("/videos/{}", urlencoding::encode(&video_id));
    proxy_json(&state, &headers, Method::DELETE, &path, UpstreamBody::Empty).await
}

/// GET /jobs/{video_id}/content?variant=
pub(crate) async fn job_content(
    Extension(state): Extension<AppState>,
    AxumPath(video_id): AxumPath<String>,
    Query(query): Query<ContentQuery>,
    headers: HeaderMap,
) -> Response<Body> {
    let mut path = format!("/videos/{}/content", urlencoding::encode(&video_id));
    if let Some(variant) = query.variant.as_deref().filter(|v| !v.is_empty()) {
        path.push_str(&format!("?variant={}", urlencoding::encode(variant)));
    }

    proxy_stream(&state, &headers, Method::GET, &path).await
}

/// POST /jobs/{video_id}/remix
///
/// The outbound body carries only `prompt`; a body that fails to parse is the
/// same as an empty one and falls to the prompt-required check.
pub(crate) async fn remix_job(
    Extension(state): Extension<AppState>,
    AxumPath(video_id): AxumPath<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Body> {
    let payload =
        serde_json::from_slice::<serde_json::Value>(&body).unwrap_or(serde_json::Value::Null);
    let prompt = payload
        .get("prompt")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or_default();

    if prompt.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "prompt is required");
    }

    let path = format!("/videos/{}/remix", urlencoding::encode(&video_id));
    proxy_json(
        &state,
        &headers,
        Method::POST,
        &path,
        UpstreamBody::Json(json!({ "prompt": prompt }).to_string()),
    )
    .await
}

pub(crate) async fn jobs_method_not_allowed() -> Response<Body> {
    method_not_allowed(&["GET", "POST"])
}

pub(crate) async fn job_method_not_allowed() -> Response<Body> {
    method_not_allowed(&["GET", "DELETE"])
}

pub(crate) async fn content_method_not_allowed() -> Response<Body> {
    method_not_allowed(&["GET"])
}

pub(crate) async fn remix_method_not_allowed() -> Response<Body> {
    method_not_allowed(&["POST"])
}

async fn collect_create_form(multipart: &mut Multipart) -> Result<RawCreateForm, &'static str> {
    let mut form = RawCreateForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return Err("Malformed multipart/form-data body"),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" => form.prompt = Some(read_text(field).await?),
            "model" => form.model = Some(read_text(field).await?),
            "seconds" => form.seconds = Some(read_text(field).await?),
            "size" => form.size = Some(read_text(field).await?),
            "input_reference" => {
                // only a genuine file part counts; a plain text field here is ignored
                let filename = match field.file_name() {
                    Some(name) if !name.is_empty() => name.to_string(),
                    Some(_) => "reference".to_string(),
                    None => continue,
                };
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| "Failed to read input_reference upload")?;

                form.input_reference = Some(InputReference {
                    filename,
                    content_type,
                    data,
                });
            }
            // field whitelisting: anything else is dropped
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, &'static str> {
    field
        .text()
        .await
        .map_err(|_| "Malformed multipart/form-data body")
}
