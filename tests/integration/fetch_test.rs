// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{gzip, krawler, mount};
use krawlrs::{FetchConfig, KrawlError, Krawler, ParserMode};
use reqwest::header::HeaderValue;
use serde_json::json;
use wiremock::matchers::{header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOTE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<note>
  <to>Tove</to>
  <from>Jani</from>
  <body>Don't forget me this weekend!</body>
</note>"#;

#[tokio::test]
async fn test_fetch_json() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/data.json",
        ResponseTemplate::new(200).set_body_raw(r#"{"a":1}"#, "application/json"),
    )
    .await;

    let page = krawler(ParserMode::Json, 1)
        .fetch_url(&format!("{}/data.json", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.data.as_json(), Some(&json!({"a": 1})));
    assert_eq!(page.response.status, 200);
    assert_eq!(
        page.response.header("Content-Type"),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_fetch_html_is_queryable() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Krawl me</title></head><body><ul><li>one</li><li>two</li></ul>",
            "text/html",
        ),
    )
    .await;

    let page = krawler(ParserMode::Html, 1)
        .fetch_url(&format!("{}/", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.data.select_text("title").as_deref(), Some("Krawl me"));
    assert_eq!(page.data.select_text("li").as_deref(), Some("one"));
}

#[tokio::test]
async fn test_fetch_xml_tree() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/note.xml",
        ResponseTemplate::new(200).set_body_raw(NOTE, "application/xml"),
    )
    .await;

    let page = krawler(ParserMode::Xml, 1)
        .fetch_url(&format!("{}/note.xml", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        page.data.as_json(),
        Some(&json!({
            "note": {
                "to": ["Tove"],
                "from": ["Jani"],
                "body": ["Don't forget me this weekend!"]
            }
        }))
    );
}

#[tokio::test]
async fn test_fetch_raw_passthrough() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/plain",
        ResponseTemplate::new(200).set_body_string("not <b>parsed</b>"),
    )
    .await;

    let page = krawler(ParserMode::Raw, 1)
        .fetch_url(&format!("{}/plain", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.data.as_text(), Some("not <b>parsed</b>"));
}

#[tokio::test]
async fn test_force_utf8_transcodes_latin1_and_sends_charset() {
    let server = MockServer::start().await;
    let (latin1, _, _) = encoding_rs::WINDOWS_1252.encode(
        "<html><body><p>Servus, ich bin der Jörg aus München und wohne in Köln.</p></body></html>",
    );
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .and(headers("accept-charset", vec!["utf-8;q=0.7", "*;q=0.3"]))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(latin1.into_owned()))
        .expect(1)
        .mount(&server)
        .await;

    let config = FetchConfig::default()
        .with_parser(ParserMode::Html)
        .with_force_utf8(true);
    let page = Krawler::new(config)
        .unwrap()
        .fetch_url(&format!("{}/latin1", server.uri()))
        .await
        .unwrap();

    let text = page.data.select_text("p").unwrap();
    assert!(text.contains("Jörg"));
    assert!(text.contains("München"));
}

#[tokio::test]
async fn test_gzip_body_is_identical_to_plain() {
    let server = MockServer::start().await;
    let body = r#"{"items":[{"id":1,"name":"Jörg"},{"id":2,"name":"Ada"}]}"#.as_bytes();
    mount(
        &server,
        "/plain",
        ResponseTemplate::new(200).set_body_bytes(body.to_vec()),
    )
    .await;
    mount(
        &server,
        "/gzip",
        ResponseTemplate::new(200)
            .insert_header("content-encoding", "gzip")
            .set_body_bytes(gzip(body)),
    )
    .await;

    let krawler = krawler(ParserMode::Json, 2);
    let plain = krawler
        .fetch_url(&format!("{}/plain", server.uri()))
        .await
        .unwrap();
    let compressed = krawler
        .fetch_url(&format!("{}/gzip", server.uri()))
        .await
        .unwrap();

    assert!(plain.data.as_json().is_some());
    assert_eq!(plain.data.as_json(), compressed.data.as_json());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    mount(&server, "/missing", ResponseTemplate::new(404)).await;

    let err = krawler(ParserMode::Html, 1)
        .fetch_url(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, KrawlError::HttpStatus { status: 404, .. }));
    assert_eq!(err.to_string(), "Wrong response code: 404");
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("x-api-key", "secret"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = FetchConfig::default().with_parser(ParserMode::Raw);
    config
        .headers
        .insert("x-api-key", HeaderValue::from_static("secret"));

    let page = Krawler::new(config)
        .unwrap()
        .fetch_url(&format!("{}/", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.data.as_text(), Some("ok"));
}
