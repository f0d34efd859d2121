// SPDX-License-Identifier: MPL-2.0
//! HTTP adapter implementing the [`ProcessingService`] trait.
//!
//! Talks to the detection server over `reqwest`:
//!
//! | Call | Request |
//! |------|---------|
//! | process | `POST /process/` (multipart, one `files` part per file) |
//! | result | `GET /results/<filename>` |
//! | images archive | `GET /download/pics` |
//! | annotations archive | `GET /download/json/` |
//! | cleanup | `POST /cleanup/` |
//!
//! [`ProcessingService`]: crate::application::port::ProcessingService

use futures_util::FutureExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::Deserialize;

use crate::application::port::{
    ProcessingResponse, ProcessingService, ServiceError, ServiceFuture, UploadPart,
};
use crate::domain::newtypes::RequestTimeout;
use crate::domain::results::{ArchiveKind, ArchivePayload};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("IcedDetect/", env!("CARGO_PKG_VERSION"));

/// Longest server error body kept in [`ServiceError::Status`].
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// JSON body of a successful `/process/` call.
#[derive(Debug, Deserialize)]
struct ProcessBody {
    filenames: Vec<String>,
    #[serde(default)]
    json_filenames: Vec<String>,
}

/// `reqwest`-backed processing service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpProcessingService {
    client: Client,
    base: Url,
}

impl HttpProcessingService {
    /// Creates a service for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not an absolute http(s) URL,
    /// and [`Error::Http`] if the client cannot be built.
    pub fn new(base_url: &str, timeout: RequestTimeout) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .timeout(timeout.as_duration())
            .build()?;
        Ok(Self { client, base })
    }

    /// Server root this service talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Only fails for cannot-be-a-base URLs, rejected in `parse_base_url`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn archive_endpoint(&self, kind: ArchiveKind) -> Url {
        match kind {
            ArchiveKind::Images => self.endpoint(&["download", "pics"]),
            ArchiveKind::Annotations => self.endpoint(&["download", "json", ""]),
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| Error::Config(format!("invalid server URL '{base_url}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "server URL must be http or https: '{base_url}'"
        )));
    }
    Ok(url)
}

fn map_transport_error(err: &reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout
    } else if err.is_decode() {
        ServiceError::InvalidResponse(err.to_string())
    } else {
        ServiceError::Unreachable(err.to_string())
    }
}

async fn ensure_success(response: Response) -> std::result::Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body.chars().take(MAX_ERROR_DETAIL_CHARS).collect()
    };
    Err(ServiceError::Status {
        code: status.as_u16(),
        detail,
    })
}

/// Extracts `filename` from a `Content-Disposition` header value.
fn filename_from_content_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

fn build_form(parts: Vec<UploadPart>) -> std::result::Result<Form, ServiceError> {
    parts.into_iter().try_fold(Form::new(), |form, upload| {
        let part = Part::bytes(upload.bytes.as_ref().clone())
            .file_name(upload.name)
            .mime_str(upload.mime)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        Ok(form.part("files", part))
    })
}

impl ProcessingService for HttpProcessingService {
    fn process(&self, parts: Vec<UploadPart>) -> ServiceFuture<ProcessingResponse> {
        let client = self.client.clone();
        let url = self.endpoint(&["process", ""]);
        async move {
            let form = build_form(parts)?;
            let response = client
                .post(url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| map_transport_error(&e))?;
            let body: ProcessBody = ensure_success(response)
                .await?
                .json()
                .await
                .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
            Ok(ProcessingResponse {
                filenames: body.filenames,
                annotation_filenames: body.json_filenames,
            })
        }
        .boxed()
    }

    fn result_url(&self, filename: &str) -> String {
        self.endpoint(&["results", filename]).into()
    }

    fn fetch_result(&self, filename: &str) -> ServiceFuture<Vec<u8>> {
        let client = self.client.clone();
        let url = self.endpoint(&["results", filename]);
        async move {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| map_transport_error(&e))?;
            let bytes = ensure_success(response)
                .await?
                .bytes()
                .await
                .map_err(|e| map_transport_error(&e))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }

    fn download_archive(&self, kind: ArchiveKind) -> ServiceFuture<ArchivePayload> {
        let client = self.client.clone();
        let url = self.archive_endpoint(kind);
        async move {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| map_transport_error(&e))?;
            let response = ensure_success(response).await?;
            let suggested_filename = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok())
                .and_then(filename_from_content_disposition)
                .unwrap_or_else(|| kind.default_filename().to_string());
            let bytes = response
                .bytes()
                .await
                .map_err(|e| map_transport_error(&e))?;
            Ok(ArchivePayload {
                kind,
                bytes: bytes.to_vec(),
                suggested_filename,
            })
        }
        .boxed()
    }

    fn cleanup(&self) -> ServiceFuture<()> {
        let client = self.client.clone();
        let url = self.endpoint(&["cleanup", ""]);
        async move {
            let response = client
                .post(url)
                .send()
                .await
                .map_err(|e| map_transport_error(&e))?;
            ensure_success(response).await?;
            Ok(())
        }
        .boxed()
    }
}
