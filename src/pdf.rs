use std::path::Path;

use lopdf::Document;

use crate::feedback::Feedback;

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.display().to_string())
}

/// Plain text of every page, in page order.
pub fn try_extract_text(path: &Path) -> Result<String, lopdf::Error> {
    let document = Document::load(path)?;
    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        text.push_str(&document.extract_text(&[*page_number])?);
    }
    Ok(text)
}

/// Extracts the text of `path`, reporting failures to `feedback` and
/// returning an empty string in their place.
pub fn extract_text(path: &Path, feedback: &mut Feedback) -> String {
    match try_extract_text(path) {
        Ok(text) => text,
        Err(err) => {
            feedback.error(format!("Error reading {}: {err}", display_name(path)));
            String::new()
        }
    }
}
