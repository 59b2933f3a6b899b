//! Cloud storage for saved reports.

mod drive;

pub use drive::DriveStorage;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A file stored in the cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Provider file id.
    pub id: String,
    /// Link that can be shared with others.
    pub link: String,
}

/// Trait for cloud storage providers.
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Upload a local file, optionally into a folder, and return a shareable reference.
    async fn upload(&self, path: &Path, folder_id: Option<&str>) -> Result<UploadedFile>;
}
