//! DOCX serialization.

use crate::error::{DocentError, Result};
use docx_rs::{Docx, Paragraph, Run};
use std::fs::File;
use std::path::Path;

/// Title size in half-points.
const TITLE_SIZE: usize = 36;

/// Write a report as a Word document: a bold title followed by one
/// paragraph per line of content.
pub fn write_docx(path: &Path, title: &str, content: &str) -> Result<()> {
    let mut doc = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(title).size(TITLE_SIZE).bold()),
    );

    for line in content.lines() {
        doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let file = File::create(path)?;
    doc.build()
        .pack(file)
        .map_err(|e| DocentError::ReportWrite(format!("Failed to write docx: {}", e)))?;
    Ok(())
}
