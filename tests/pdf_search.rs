mod common;

use doc_analyzer::download::DownloadedDocument;
use doc_analyzer::feedback::{Feedback, NoticeLevel};
use doc_analyzer::pdf;
use doc_analyzer::search::{search_keyword_in_pdfs, SNIPPET_RADIUS};

#[test]
fn extracts_pages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc_0.pdf");
    common::write_text_pdf(&path, &["First page text", "Second page text"]);

    let mut feedback = Feedback::new();
    let text = pdf::extract_text(&path, &mut feedback);
    assert!(feedback.notices().is_empty());

    let first = text.find("First page").expect("first page text");
    let second = text.find("Second page").expect("second page text");
    assert!(first < second);
}

#[test]
fn page_without_text_extracts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc_1.pdf");
    common::write_text_pdf(&path, &[""]);

    let mut feedback = Feedback::new();
    let text = pdf::extract_text(&path, &mut feedback);
    assert!(text.trim().is_empty());
    assert_eq!(feedback.count(NoticeLevel::Error), 0);
}

#[test]
fn finds_keyword_and_builds_snippet() {
    let dir = tempfile::tempdir().unwrap();
    let hit = dir.path().join("doc_3.pdf");
    let miss = dir.path().join("doc_4.pdf");
    let prefix = "a".repeat(60);
    common::write_text_pdf(&hit, &[&format!("{prefix} Quantum error correction codes")]);
    common::write_text_pdf(&miss, &["Classical mechanics only"]);

    let docs = vec![
        DownloadedDocument {
            path: hit,
            title: "Codes".to_string(),
        },
        DownloadedDocument {
            path: miss,
            title: "Mechanics".to_string(),
        },
    ];
    let mut feedback = Feedback::new();
    let results = search_keyword_in_pdfs(&docs, "QUANTUM", SNIPPET_RADIUS, &mut feedback);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Codes");
    assert!(results[0].snippet.starts_with(&"a".repeat(49)));
    assert!(results[0].snippet.contains("quantum error correction"));
}

#[test]
fn early_match_keeps_defective_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc_5.pdf");
    let tail = "z".repeat(150);
    common::write_text_pdf(&path, &[&format!("Quantum {tail}")]);

    let docs = vec![DownloadedDocument {
        path,
        title: "Early".to_string(),
    }];
    let results = search_keyword_in_pdfs(&docs, "quantum", SNIPPET_RADIUS, &mut Feedback::new());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].snippet, "");
}
