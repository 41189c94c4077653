use crate::error::UploadError;
use crate::server::{AppState, intake};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{Html, IntoResponse},
};
use serde::Serialize;

const INDEX_HTML: &str = include_str!("../../public/index.html");
const SCRIPT_JS: &str = include_str!("../../public/script.js");

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub success: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

pub(crate) async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    // Configuration problems are reported before the body is touched.
    let uploader = state.uploader()?;
    let multipart = multipart.map_err(|rejection| UploadError::Parse(rejection.body_text()))?;

    let request = intake::read_upload(multipart, state.server_config()).await?;
    let stored = uploader.upload(request).await?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        filename: stored.filename,
        path: stored.object.path,
        commit: stored.object.commit_sha,
    }))
}

pub(crate) async fn method_not_allowed() -> UploadError {
    UploadError::MethodNotAllowed
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}
