//! Shared helpers for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use bytes::Bytes;
use futures::stream;
use lopdf::{dictionary, Document, Object};

/// Announced by `/huge`; far beyond any test limit
pub const HUGE_CONTENT_LENGTH: u64 = 1_000_000_000;

/// Build an in-memory PDF with `num_pages` blank pages
pub fn sample_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..num_pages)
        .map(|_| {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save sample pdf");
    buffer
}

async fn serve_pdf() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/pdf")], sample_pdf(3))
}

async fn serve_html() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html")],
        "<!DOCTYPE html><html><body>Sign in</body></html>",
    )
}

async fn serve_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Endless 64 KiB chunks of filler
fn endless_body() -> Body {
    Body::from_stream(stream::repeat_with(|| {
        Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; 64 * 1024]))
    }))
}

async fn serve_huge() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, HUGE_CONTENT_LENGTH.to_string()),
        ],
        endless_body(),
    )
}

async fn serve_stream() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/pdf")], endless_body())
}

async fn serve_slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(3)).await;
    ([(header::CONTENT_TYPE, "application/pdf")], sample_pdf(1))
}

/// Start a local server on an ephemeral port and return its base URL
///
/// Routes: `/doc.pdf` (3-page PDF), `/login.html` (HTML with 200),
/// `/error` (500), `/huge` (announces a 1 GB body and streams filler),
/// `/stream` (chunked filler with no length), `/slow` (answers after 3s).
/// Anything else is a 404.
pub async fn spawn_server() -> String {
    let app = Router::new()
        .route("/doc.pdf", get(serve_pdf))
        .route("/login.html", get(serve_html))
        .route("/error", get(serve_error))
        .route("/huge", get(serve_huge))
        .route("/stream", get(serve_stream))
        .route("/slow", get(serve_slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr: SocketAddr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{}", addr)
}

/// A URL on a port nothing is listening on
#[allow(dead_code)]
pub async fn unused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/doc.pdf", addr)
}
