//! Google Drive storage.
//!
//! Expects an OAuth access token that already carries the `drive.file`
//! scope. Obtaining and refreshing it happens outside this crate.

use super::{CloudStorage, UploadedFile};
use crate::error::{DocentError, Result};
use crate::openai::http_client;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{info, instrument, warn};

const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,name,webViewLink";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const BOUNDARY: &str = "docent-report-boundary";

/// Google Drive upload client.
pub struct DriveStorage {
    http: reqwest::Client,
    access_token: Option<String>,
    default_folder_id: Option<String>,
}

impl DriveStorage {
    /// Create a new Drive client.
    pub fn new(access_token: Option<&str>, default_folder_id: Option<&str>) -> Self {
        Self {
            http: http_client(),
            access_token: access_token.map(str::to_string),
            default_folder_id: default_folder_id.map(str::to_string),
        }
    }

    fn token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            DocentError::Config(
                "Google Drive is not authorized. Set GOOGLE_DRIVE_TOKEN or drive.access_token."
                    .to_string(),
            )
        })
    }

    /// Grant read access to anyone holding the link.
    async fn share(&self, token: &str, file_id: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/{}/permissions", FILES_URL, file_id))
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| DocentError::Upload(format!("sharing failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DocentError::Upload(format!(
                "sharing failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudStorage for DriveStorage {
    #[instrument(skip(self))]
    async fn upload(&self, path: &Path, folder_id: Option<&str>) -> Result<UploadedFile> {
        let token = self.token()?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DocentError::Upload(format!("cannot read {}: {}", path.display(), e)))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "report".to_string());

        let mut metadata = json!({ "name": name });
        if let Some(folder) = folder_id.or(self.default_folder_id.as_deref()) {
            metadata["parents"] = json!([folder]);
        }

        let body = related_body(&metadata, mime_type_for(path), &bytes);

        let response = self
            .http
            .post(UPLOAD_URL)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| DocentError::Upload(format!("upload failed: {}", e)))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| DocentError::Upload(format!("unreadable response: {}", e)))?;

        if !status.is_success() {
            let message = payload["error"]["message"].as_str().unwrap_or("unknown error");
            return Err(DocentError::Upload(format!("{} ({})", message, status)));
        }

        let id = payload["id"]
            .as_str()
            .ok_or_else(|| DocentError::Upload("response had no file id".to_string()))?
            .to_string();

        // The file is uploaded either way; a failed share only limits who can open the link.
        if let Err(e) = self.share(token, &id).await {
            warn!("Uploaded {} but could not share it: {}", id, e);
        }

        let link = payload["webViewLink"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", id));

        info!("Uploaded {} as {}", path.display(), id);
        Ok(UploadedFile { id, link })
    }
}

/// MIME type for a saved report, based on its extension.
fn mime_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Build a `multipart/related` body holding JSON metadata and file bytes.
fn related_body(metadata: &Value, mime: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
            b = BOUNDARY,
            meta = metadata,
            mime = mime
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
