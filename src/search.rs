use serde::Serialize;

use crate::download::DownloadedDocument;
use crate::feedback::Feedback;
use crate::pdf;
use crate::utils;

pub const SNIPPET_RADIUS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
}

/// Window of `radius` characters either side of the first match of
/// `keyword` in `text`, or `None` when there is no match. Both inputs are
/// expected lowercased.
///
/// The start offset is not clamped before slicing: a match closer than
/// `radius` to the beginning yields a start that counts back from the end
/// of the text, so such snippets come out empty (or tail-anchored for short
/// texts).
pub fn snippet_around(text: &str, keyword: &str, radius: usize) -> Option<String> {
    let byte_pos = text.find(keyword)?;
    let char_pos = text[..byte_pos].chars().count() as isize;
    let chars: Vec<char> = text.chars().collect();
    let radius = radius as isize;
    Some(utils::wrapping_slice(&chars, char_pos - radius, char_pos + radius))
}

pub fn search_text(title: &str, text: &str, keyword: &str, radius: usize) -> Option<SearchResult> {
    let text = text.to_lowercase();
    let keyword = keyword.to_lowercase();
    snippet_around(&text, &keyword, radius).map(|snippet| SearchResult {
        title: title.to_string(),
        snippet,
    })
}

pub fn search_keyword_in_pdfs(
    documents: &[DownloadedDocument],
    keyword: &str,
    radius: usize,
    feedback: &mut Feedback,
) -> Vec<SearchResult> {
    documents
        .iter()
        .filter_map(|doc| {
            let text = pdf::extract_text(&doc.path, feedback);
            search_text(&doc.title, &text, keyword, radius)
        })
        .collect()
}
