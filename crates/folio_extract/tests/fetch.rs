use std::time::Duration;

use encoding_rs::GBK;
use folio_extract::{FailureKind, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

fn small_limit(max_bytes: u64) -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings {
        max_bytes,
        ..FetchSettings::default()
    })
}

#[tokio::test]
async fn fetcher_returns_decoded_html_and_metadata() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/doc",
        ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
    )
    .await;

    let doc = ReqwestFetcher::new(FetchSettings::default())
        .fetch(&url)
        .await
        .expect("fetch ok");
    assert_eq!(doc.html, "<html>ok</html>");
    assert_eq!(doc.encoding_label, "UTF-8");
    assert_eq!(doc.metadata.original_url, url);
    assert_eq!(doc.metadata.final_url, url);
    assert_eq!(doc.metadata.redirect_count, 0);
    assert_eq!(doc.metadata.byte_len, 15);
    assert!(doc.metadata.content_type.unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn body_of_exactly_max_bytes_is_accepted() {
    let server = MockServer::start().await;
    let body = "x".repeat(64);
    let url = serve(&server, "/exact", ResponseTemplate::new(200).set_body_raw(body.clone(), "text/html")).await;

    let doc = small_limit(64).fetch(&url).await.expect("exactly max is fine");
    assert_eq!(doc.html, body);
    assert_eq!(doc.metadata.byte_len, 64);
}

#[tokio::test]
async fn body_one_byte_over_max_is_too_large() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/large",
        ResponseTemplate::new(200).set_body_raw("x".repeat(65), "text/html"),
    )
    .await;

    let err = small_limit(64).fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 64,
            actual: Some(65)
        }
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn json_content_type_is_rejected() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/api",
        ResponseTemplate::new(200).set_body_raw("{\"a\":1}", "application/json"),
    )
    .await;

    let err = ReqwestFetcher::new(FetchSettings::default()).fetch(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::InvalidContentType {
            content_type: "application/json".to_string()
        }
    );
}

#[tokio::test]
async fn xhtml_content_type_is_accepted() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/x",
        ResponseTemplate::new(200).set_body_raw("<html/>", "application/xhtml+xml"),
    )
    .await;

    assert!(ReqwestFetcher::new(FetchSettings::default()).fetch(&url).await.is_ok());
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let server = MockServer::start().await;
    let url = serve(&server, "/missing", ResponseTemplate::new(404)).await;

    let err = ReqwestFetcher::new(FetchSettings::default()).fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn header_charset_beats_meta_declaration() {
    let server = MockServer::start().await;
    let body = r#"<html><head><meta charset="gbk"></head><body>中文内容</body></html>"#;
    let url = serve(
        &server,
        "/utf8",
        ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
    )
    .await;

    let doc = ReqwestFetcher::new(FetchSettings::default()).fetch(&url).await.unwrap();
    assert_eq!(doc.encoding_label, "UTF-8");
    assert!(doc.html.contains("中文内容"));
}

#[tokio::test]
async fn meta_charset_decodes_gbk_body() {
    let server = MockServer::start().await;
    let (encoded, _, _) = GBK.encode(r#"<html><head><meta charset="gbk"></head><body>中文内容</body></html>"#);
    let url = serve(
        &server,
        "/gbk",
        ResponseTemplate::new(200).set_body_raw(encoded.into_owned(), "text/html"),
    )
    .await;

    let doc = ReqwestFetcher::new(FetchSettings::default()).fetch(&url).await.unwrap();
    assert_eq!(doc.encoding_label, "GBK");
    assert!(doc.html.contains("中文内容"));
}

#[tokio::test]
async fn redirects_are_followed_and_counted() {
    let server = MockServer::start().await;
    let target = serve(
        &server,
        "/new",
        ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html"),
    )
    .await;
    let start = serve(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("Location", target.as_str()),
    )
    .await;

    let doc = ReqwestFetcher::new(FetchSettings::default()).fetch(&start).await.unwrap();
    assert_eq!(doc.metadata.original_url, start);
    assert_eq!(doc.metadata.final_url, target);
    assert_eq!(doc.metadata.redirect_count, 1);
}

#[tokio::test]
async fn slow_response_is_a_network_failure() {
    let server = MockServer::start().await;
    let url = serve(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(250))
            .set_body_raw("slow", "text/html"),
    )
    .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    });
    let err = fetcher.fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(err.is_retryable());
}
