#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const FAKE_PDF: &[u8] = b"%PDF-1.4 test body";

/// Text of the PDF served at `/paper/*`.
pub fn paper_text() -> String {
    format!("{} Quantum error correction codes", "a".repeat(60))
}

/// Writes a PDF with one text line per page.
pub fn write_text_pdf(path: &Path, pages: &[&str]) {
    build_text_pdf(pages).save(path).unwrap();
}

pub fn text_pdf_bytes(pages: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    build_text_pdf(pages).save_to(&mut bytes).unwrap();
    bytes
}

fn build_text_pdf(pages: &[&str]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![20.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Serves fixed responses on an ephemeral port from a background runtime:
/// `/ok/*` -> 200 with a non-PDF body, `/paper/*` -> 200 with a readable PDF
/// of [`paper_text`], `/missing/*` -> 404, `/created/*` -> 201.
pub fn spawn_pdf_server() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let paper = text_pdf_bytes(&[&paper_text()]);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new()
                .route("/ok/:name", get(|| async { FAKE_PDF }))
                .route(
                    "/paper/:name",
                    get(move || {
                        let body = paper.clone();
                        async move { body }
                    }),
                )
                .route("/missing/:name", get(|| async { StatusCode::NOT_FOUND }))
                .route(
                    "/created/:name",
                    get(|| async { (StatusCode::CREATED, FAKE_PDF) }),
                );
            axum::serve(listener, app).await.unwrap();
        });
    });
    addr
}

pub fn csv_with_urls(rows: &[(&str, String)]) -> String {
    let mut csv = String::from("title,pdf_url\n");
    for (title, url) in rows {
        csv.push_str(&format!("{title},{url}\n"));
    }
    csv
}
