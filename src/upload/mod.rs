//! Recipe document upload. The backend extracts text, parses it into a
//! recipe and opens an agent thread; we get back the initial session.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::error::TransportError;
use crate::models::RecipeSession;

const UPLOAD_PATH: &str = "/upload";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub thread_id: String,
    #[serde(default)]
    pub run_id: Option<String>,
    pub state: RecipeSession,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub thread_id: String,
    pub session: RecipeSession,
}

impl From<UploadResponse> for UploadResult {
    fn from(response: UploadResponse) -> Self {
        Self {
            thread_id: response.thread_id,
            session: response.state,
        }
    }
}

#[async_trait]
pub trait UploadIntake: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResult, TransportError>;
}

pub struct HttpUploadIntake {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploadIntake {
    pub fn new(backend_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), backend_url)
    }

    pub fn with_client(client: reqwest::Client, backend_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", backend_url.trim_end_matches('/'), UPLOAD_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UploadIntake for HttpUploadIntake {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResult, TransportError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| TransportError::request("Upload", err))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TransportError::status(
                "Upload",
                status.canonical_reason().unwrap_or(status.as_str()),
            ));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| TransportError::decode("Upload", err))?;

        log::info!(
            "uploaded {file_name}; thread {} (recipe parsed: {})",
            body.thread_id,
            body.state.recipe.is_some()
        );

        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_backend_response() {
        let json = r#"{
            "threadId": "t-1",
            "runId": "r-1",
            "state": {
                "document_text": "Pancakes...",
                "recipe": {
                    "title": "Pancakes",
                    "servings": 2,
                    "ingredients": [],
                    "steps": [{"step_number": 1, "instruction": "Whisk"}]
                }
            },
            "tools": [],
            "messages": []
        }"#;
        let result: UploadResult = serde_json::from_str::<UploadResponse>(json).unwrap().into();
        assert_eq!(result.thread_id, "t-1");
        assert_eq!(result.session.total_steps(), 1);
        assert_eq!(result.session.current_step, 0);
    }

    #[test]
    fn test_status_failure_message() {
        let err = TransportError::status("Upload", "Internal Server Error");
        assert_eq!(err.to_string(), "Upload failed: Internal Server Error");
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let intake = HttpUploadIntake::new("http://127.0.0.1:9/");
        assert_eq!(intake.endpoint(), "http://127.0.0.1:9/upload");
        let result = intake.upload("recipe.txt", b"flour".to_vec()).await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
