//! PDF serialization.

use crate::error::{DocentError, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// US Letter with one-inch margins.
const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN: f32 = 25.4;

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 5.0;
/// Characters per line at the body font size.
const WRAP_WIDTH: usize = 90;

/// Write a report as a PDF: title on the first page, wrapped body text
/// flowing across as many pages as needed.
pub fn write_pdf(path: &Path, title: &str, content: &str) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| DocentError::ReportWrite(format!("Failed to load font: {}", e)))?;
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| DocentError::ReportWrite(format!("Failed to load font: {}", e)))?;

    let top = PAGE_HEIGHT.0 - MARGIN;
    let first_body_line = top - 2.0 * LINE_HEIGHT;
    let lines = wrap_lines(content, WRAP_WIDTH);

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    layer_ref.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(top), &title_font);

    let mut y = first_body_line;
    for line in &lines {
        if y < MARGIN {
            let (next_page, next_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer_ref = doc.get_page(next_page).get_layer(next_layer);
            y = top;
        }
        layer_ref.use_text(line.as_str(), BODY_SIZE, Mm(MARGIN), Mm(y), &body_font);
        y -= LINE_HEIGHT;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer)
        .map_err(|e| DocentError::ReportWrite(format!("Failed to write pdf: {}", e)))?;
    Ok(())
}

/// Wrap text on whitespace so no line exceeds `width` characters.
/// Blank lines are kept; words longer than `width` are split.
pub fn wrap_lines(content: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();

    for raw in content.lines() {
        if raw.trim().is_empty() {
            out.push(String::new());
            continue;
        }

        let mut line = String::new();
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(width);
                out.push(word.into_iter().collect());
                word = rest;
            }

            let word: String = word.into_iter().collect();
            let line_len = line.chars().count();
            let word_len = word.chars().count();
            if !line.is_empty() && line_len + 1 + word_len > width {
                out.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }

        if !line.is_empty() {
            out.push(line);
        }
    }

    out
}
