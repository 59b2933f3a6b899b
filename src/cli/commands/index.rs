//! Index command - build the document index from a folder.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::search::{collect_documents, KnowledgeIndex, INDEXABLE_EXTENSIONS, KNOWLEDGE_STORE_NAME};
use anyhow::Result;
use tracing::warn;

/// Create a vector store and upload every indexable file in `folder`.
pub async fn run_index(folder: &str, _settings: &Settings) -> Result<()> {
    preflight::check(Operation::Index)?;

    let folder = Settings::expand_path(folder);
    let paths = collect_documents(&folder)?;
    if paths.is_empty() {
        Output::warning(&format!(
            "No files found to upload. Add {} files to {} and re-run.",
            INDEXABLE_EXTENSIONS.join("/").to_uppercase(),
            folder.display()
        ));
        return Ok(());
    }

    let index = KnowledgeIndex::new();
    let store_id = index.create_store(KNOWLEDGE_STORE_NAME).await?;
    Output::success(&format!("Vector store created: {}", store_id));

    let pb = Output::progress_bar(paths.len() as u64, "Uploading");
    let mut uploaded = 0;
    let mut failed = Vec::new();

    for path in &paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name.clone());

        match index.add_file(&store_id, path).await {
            Ok(_) => uploaded += 1,
            Err(e) => {
                warn!("Failed to upload {}: {}", path.display(), e);
                failed.push((name, e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Output::success(&format!("Uploaded {} of {} files.", uploaded, paths.len()));
    for (name, error) in &failed {
        Output::error(&format!("Failed: {} - {}", name, error));
    }

    println!("\nPut this in your .env:\nVECTOR_STORE_ID={}", store_id);
    Ok(())
}
