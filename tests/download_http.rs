mod common;

use std::time::Duration;

use doc_analyzer::dataset::Dataset;
use doc_analyzer::download::{download_pdfs, DownloadSettings};
use doc_analyzer::feedback::{Feedback, NoticeLevel};

fn settings(dir: &std::path::Path) -> DownloadSettings {
    DownloadSettings {
        pdf_dir: dir.join("downloaded_pdfs"),
        timeout: Duration::from_secs(5),
        seed: 42,
        user_agent: "doc-analyzer-tests".to_string(),
    }
}

#[test]
fn saves_only_http_200_bodies() {
    let addr = common::spawn_pdf_server();
    let csv = common::csv_with_urls(&[
        ("Good", format!("http://{addr}/ok/a.pdf")),
        ("Gone", format!("http://{addr}/missing/b.pdf")),
        ("Created", format!("http://{addr}/created/c.pdf")),
    ]);
    let dataset = Dataset::from_csv_str(&csv).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());

    let mut feedback = Feedback::new();
    let saved = download_pdfs(&dataset, 20, &settings, &mut feedback).unwrap();

    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "Good");
    assert_eq!(saved[0].path, settings.pdf_dir.join("doc_0.pdf"));
    assert_eq!(std::fs::read(&saved[0].path).unwrap(), common::FAKE_PDF);

    assert_eq!(feedback.count(NoticeLevel::Success), 1);
    assert_eq!(feedback.count(NoticeLevel::Warning), 2);
    assert!(feedback
        .notices()
        .iter()
        .any(|n| n.message == format!("Failed to download: http://{addr}/missing/b.pdf")));
    assert!(!settings.pdf_dir.join("doc_1.pdf").exists());
    assert!(!settings.pdf_dir.join("doc_2.pdf").exists());
}

#[test]
fn returns_at_most_limit_documents() {
    let addr = common::spawn_pdf_server();
    let rows: Vec<(&str, String)> = (0..6)
        .map(|i| ("Paper", format!("http://{addr}/ok/{i}.pdf")))
        .collect();
    let dataset = Dataset::from_csv_str(&common::csv_with_urls(&rows)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut feedback = Feedback::new();
    let saved = download_pdfs(&dataset, 4, &settings(dir.path()), &mut feedback).unwrap();
    assert_eq!(saved.len(), 4);

    let mut feedback = Feedback::new();
    let saved = download_pdfs(&dataset, 20, &settings(dir.path()), &mut feedback).unwrap();
    assert_eq!(saved.len(), 6);
}

#[test]
fn same_seed_downloads_same_rows() {
    let addr = common::spawn_pdf_server();
    let rows: Vec<(&str, String)> = (0..12)
        .map(|i| ("Paper", format!("http://{addr}/ok/{i}.pdf")))
        .collect();
    let dataset = Dataset::from_csv_str(&common::csv_with_urls(&rows)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());

    let first = download_pdfs(&dataset, 5, &settings, &mut Feedback::new()).unwrap();
    let second = download_pdfs(&dataset, 5, &settings, &mut Feedback::new()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn transport_errors_become_warnings() {
    // Nothing listens on the discard port.
    let csv = common::csv_with_urls(&[("Unreachable", "http://127.0.0.1:9/x.pdf".to_string())]);
    let dataset = Dataset::from_csv_str(&csv).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut feedback = Feedback::new();
    let saved = download_pdfs(&dataset, 5, &settings(dir.path()), &mut feedback).unwrap();
    assert!(saved.is_empty());
    assert_eq!(feedback.count(NoticeLevel::Warning), 1);
    assert!(feedback.notices()[0].message.starts_with("Error: "));
}
