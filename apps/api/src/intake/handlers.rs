//! Axum route handlers for submission and download.

use std::time::SystemTime;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use bytes::Bytes;
use reqwest::Url;
use tracing::{info, warn};

use crate::checkout::CheckoutRequest;
use crate::config::Config;
use crate::errors::AppError;
use crate::intake::filename::filename_for_form;
use crate::intake::form::{decode_submission, FormFields};
use crate::intake::validate;
use crate::render;
use crate::state::AppState;
use crate::storage::StoreError;

const FALLBACK_HOST: &str = "localhost";

/// POST /processar_curriculo
///
/// Decodes the form, renders the PDF into the artifact store, then redirects
/// either to the payment provider's checkout page or straight to the download.
pub async fn handle_submission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let fields = FormFields::from_pairs(pairs);
    let decoded = decode_submission(&fields);
    validate(&decoded.record, state.config.name_policy)?;
    let filename = filename_for_form(&fields);
    let base = base_url(&state.config, &headers);
    let download = download_url(&base, &filename)?;

    // Layout is CPU-bound and the store does blocking file I/O.
    let store = state.store.clone();
    let options = state.render.clone();
    let tolerated = decoded.warnings.len();
    let record = decoded.record;
    let artifact = filename.clone();
    let written = tokio::task::spawn_blocking(move || {
        let written = store.write_with(&artifact, |sink| {
            render::compose(&record, options.as_ref(), sink)
        })?;
        if let Err(e) = store.evict_expired(SystemTime::now()) {
            warn!("Artifact eviction failed: {e}");
        }
        Ok::<_, StoreError>(written)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in composition: {e}")))??;

    info!(
        artifact = %written.name,
        bytes = written.size_bytes,
        warnings = tolerated,
        "PDF generated"
    );

    match &state.checkout {
        Some(gateway) => {
            let request =
                CheckoutRequest::for_artifact(download.to_string(), &state.config.checkout_return_url);
            let session = gateway.create_session(&request).await?;
            info!(
                artifact = %filename,
                reference = %request.external_reference,
                "Redirecting to checkout"
            );
            Ok(Redirect::to(&session.init_point))
        }
        None => Ok(Redirect::to(download.path())),
    }
}

/// GET /download/:filename
///
/// Streams a stored artifact as an attachment, or 404 if it is missing or expired.
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.store.read(&filename).await?;
    info!(artifact = %filename, bytes = bytes.len(), "Serving artifact");

    let disposition = HeaderValue::from_str(&content_disposition(&filename)).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("invalid Content-Disposition for '{filename}': {e}"))
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}

/// Public origin for absolute links: configured value, else Host + X-Forwarded-Proto.
pub fn base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(base) = &config.public_base_url {
        return base.clone();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_HOST);
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| *s == "http" || *s == "https")
        .unwrap_or("http");
    format!("{scheme}://{host}")
}

/// `{base}/download/{filename}` with the filename percent-encoded as one segment.
pub fn download_url(base: &str, filename: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(base)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid base URL '{base}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("base URL '{base}' cannot hold a path")))?
        .pop_if_empty()
        .push("download")
        .push(filename);
    Ok(url)
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987 UTF-8 form.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
        .collect();
    if ascii == filename {
        return format!("attachment; filename=\"{filename}\"");
    }
    let encoded = download_url("http://localhost", filename)
        .ok()
        .and_then(|u| u.path_segments().and_then(|mut s| s.next_back().map(str::to_string)))
        .unwrap_or_else(|| ascii.clone());
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
