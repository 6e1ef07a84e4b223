use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{FileState, ModelInfo, RemoteFile, TranscriptionProvider};

/// Gemini client for the Generative Language REST API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL, without the version path
    endpoint: String,
    /// Timeout for generation calls
    generate_timeout: Duration,
}

/// generateContent request body
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A content part: either text or a reference to an uploaded file
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// File resource as returned by the files API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    state: String,
}

impl From<FileResource> for RemoteFile {
    fn from(resource: FileResource) -> Self {
        RemoteFile {
            name: resource.name,
            uri: resource.uri,
            mime_type: resource.mime_type,
            state: FileState::from_api(&resource.state),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelResource {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Which call produced an error response, for status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Generate,
    Other,
}

impl GenerateContentRequest {
    /// Audio reference followed by the instruction text
    pub fn for_audio(file: &RemoteFile, prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        file_data: Some(FileData {
                            mime_type: file.mime_type.clone(),
                            file_uri: file.uri.clone(),
                        }),
                        ..Default::default()
                    },
                    Part {
                        text: Some(prompt.to_string()),
                        ..Default::default()
                    },
                ],
            }],
        }
    }
}

/// Map a non-success response to a provider error.
///
/// The HTTP status and the `error.status` field of the body are the structured
/// signals; the message text is only carried along.
pub fn map_error_response(status: u16, body: &str, kind: CallKind) -> ProviderError {
    let (message, api_status) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status.unwrap_or_default()),
        Err(_) => (body.trim().to_string(), String::new()),
    };

    match (status, api_status.as_str()) {
        (429, _) | (_, "RESOURCE_EXHAUSTED") => ProviderError::RateLimitExceeded(message),
        (404, _) | (_, "NOT_FOUND") if kind == CallKind::Generate => ProviderError::ModelNotFound(message),
        (401, _) | (403, _) | (_, "UNAUTHENTICATED") | (_, "PERMISSION_DENIED") => {
            ProviderError::AuthenticationError(message)
        }
        _ => ProviderError::ApiError { status_code: status, message },
    }
}

/// Extract the generated text from a generateContent response body
pub fn parse_generate_response(body: &str) -> Result<String, ProviderError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("generateContent response: {}", e)))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::RequestFailed(format!("Content blocked by safety filters: {}", reason)));
    }

    let candidate = response.candidates.into_iter().next()
        .ok_or_else(|| ProviderError::ParseError("No candidates returned".to_string()))?;

    if let Some(reason) = &candidate.finish_reason {
        debug!("Generation finished with reason {}", reason);
    }

    let text: String = candidate.content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::ParseError("Candidate contained no text".to_string()));
    }
    Ok(text)
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_connect() {
        ProviderError::ConnectionError(e.to_string())
    } else if e.is_timeout() {
        ProviderError::RequestFailed(format!("Request timed out: {}", e))
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, generate_timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            generate_timeout: Duration::from_secs(generate_timeout_secs),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.endpoint, path)
    }

    async fn check(response: Response, kind: CallKind) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("Gemini API error ({}): {}", status, body);
        Err(map_error_response(status.as_u16(), &body, kind))
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ProviderError> {
        response.json::<T>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TranscriptionProvider for Gemini {
    async fn upload_audio(&self, path: &Path, mime_type: &str) -> Result<RemoteFile, ProviderError> {
        let data: Bytes = tokio::fs::read(path).await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read {}: {}", path.display(), e)))?
            .into();
        let display_name = path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());

        // Resumable upload: open a session, then send the bytes and finalize
        let start = self.client
            .post(format!("{}/upload/v1beta/files", self.endpoint))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(map_send_error)?;
        let start = Self::check(start, CallKind::Other).await?;

        let upload_url = start.headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Upload session URL missing".to_string()))?;

        let finish = self.client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await
            .map_err(map_send_error)?;
        let finish = Self::check(finish, CallKind::Other).await?;

        let uploaded: UploadResponse = Self::json(finish).await?;
        debug!("Uploaded {} as {}", path.display(), uploaded.file.name);
        Ok(uploaded.file.into())
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, ProviderError> {
        let response = self.client
            .get(self.api_url(name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = Self::check(response, CallKind::Other).await?;
        let resource: FileResource = Self::json(response).await?;
        Ok(resource.into())
    }

    async fn delete_file(&self, name: &str) -> Result<(), ProviderError> {
        let response = self.client
            .delete(self.api_url(name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(map_send_error)?;
        Self::check(response, CallKind::Other).await?;
        Ok(())
    }

    async fn generate(&self, model: &str, file: &RemoteFile, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest::for_audio(file, prompt);
        let response = self.client
            .post(self.api_url(&format!("models/{}:generateContent", model)))
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.generate_timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = Self::check(response, CallKind::Generate).await?;

        let body = response.text().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        parse_generate_response(&body)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client
                .get(self.api_url("models"))
                .header("x-goog-api-key", &self.api_key)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await.map_err(map_send_error)?;
            let response = Self::check(response, CallKind::Other).await?;
            let page: ListModelsResponse = Self::json(response).await?;

            models.extend(page.models.into_iter().map(|m| ModelInfo {
                name: m.name.trim_start_matches("models/").to_string(),
                supported_methods: m.supported_generation_methods,
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }
}
