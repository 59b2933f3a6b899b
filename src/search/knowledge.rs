//! Building the internal document index (an OpenAI vector store).

use crate::error::{DocentError, Result};
use crate::openai::{api_key, http_client, API_BASE};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Name given to newly created stores.
pub const KNOWLEDGE_STORE_NAME: &str = "docent-knowledge";

/// File extensions accepted into the index.
pub const INDEXABLE_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "docx"];

/// Client for creating a vector store and filling it with files.
pub struct KnowledgeIndex {
    http: reqwest::Client,
}

impl KnowledgeIndex {
    pub fn new() -> Self {
        Self { http: http_client() }
    }

    /// Create an empty vector store and return its id.
    #[instrument(skip(self))]
    pub async fn create_store(&self, name: &str) -> Result<String> {
        let payload = self
            .post_json("vector_stores", &json!({ "name": name }))
            .await?;
        let id = id_of(&payload)?;
        info!("Created vector store {}", id);
        Ok(id)
    }

    /// Upload one file and attach it to the store. Returns the file id.
    #[instrument(skip(self))]
    pub async fn add_file(&self, store_id: &str, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let form = Form::new()
            .text("purpose", "assistants")
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(format!("{}/files", API_BASE))
            .bearer_auth(api_key()?)
            .multipart(form)
            .send()
            .await?;
        let file_id = id_of(&read_payload(response).await?)?;
        debug!("Uploaded {} as {}", path.display(), file_id);

        self.post_json(
            &format!("vector_stores/{}/files", store_id),
            &json!({ "file_id": file_id }),
        )
        .await?;

        Ok(file_id)
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(format!("{}/{}", API_BASE, endpoint))
            .bearer_auth(api_key()?)
            .json(body)
            .send()
            .await?;
        read_payload(response).await
    }
}

impl Default for KnowledgeIndex {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_payload(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let payload: Value = response.json().await?;
    if !status.is_success() {
        let message = payload["error"]["message"].as_str().unwrap_or("unknown error");
        return Err(DocentError::OpenAI(format!("{} ({})", message, status)));
    }
    Ok(payload)
}

fn id_of(payload: &Value) -> Result<String> {
    payload["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DocentError::OpenAI("response had no id".to_string()))
}

/// Files directly inside `folder` with an indexable extension, sorted by name.
pub fn collect_documents(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(DocentError::InvalidInput(format!(
            "{} is not a directory",
            folder.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        let indexable = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| INDEXABLE_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if path.is_file() && indexable {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_documents() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.md", "a.PDF", "notes.txt", "deck.pptx", "brief.docx"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.md")).unwrap();

        let names: Vec<_> = collect_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.md", "brief.docx", "notes.txt"]);
    }

    #[test]
    fn test_collect_documents_requires_directory() {
        let err = collect_documents(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, DocentError::InvalidInput(_)));
    }

    #[test]
    fn test_id_of() {
        assert_eq!(id_of(&json!({"id": "vs_1"})).unwrap(), "vs_1");
        assert!(id_of(&json!({})).is_err());
    }
}
