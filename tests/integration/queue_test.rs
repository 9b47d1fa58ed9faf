// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{drain, krawler, mount, mount_pages};
use krawlrs::{CrawlEvent, KrawlError, ParserMode, QueueOptions, Target};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_duplicate_urls_are_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dup"))
        .respond_with(ResponseTemplate::new(200).set_body_string("dup"))
        .expect(1)
        .mount(&server)
        .await;
    let urls = mount_pages(&server, 2, None).await;
    let dup = format!("{}/dup", server.uri());

    let batch = krawler(ParserMode::Raw, 4)
        .queue(
            vec![dup.clone(), urls[0].clone(), dup.clone(), urls[1].clone(), dup],
            QueueOptions::default(),
        )
        .unwrap();
    assert_eq!(batch.target_count(), 3);

    let events = drain(batch).await;
    assert_eq!(events.len(), 4);
    assert!(matches!(events.last(), Some(CrawlEvent::End)));
}

#[tokio::test]
async fn test_structured_targets_from_json_keep_metadata() {
    let server = MockServer::start().await;
    let urls = mount_pages(&server, 1, None).await;

    let targets: Vec<Target> = serde_json::from_value(serde_json::json!([
        { "url": urls[0], "label": "first" },
        { "url": urls[0], "label": "second" }
    ]))
    .unwrap();

    let batch = krawler(ParserMode::Raw, 2)
        .queue(targets, QueueOptions::default())
        .unwrap();
    assert_eq!(batch.target_count(), 2);

    let mut labels: Vec<String> = drain(batch)
        .await
        .iter()
        .filter_map(|event| match event {
            CrawlEvent::Data { target, .. } => target
                .metadata()
                .and_then(|m| m.get("label"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        })
        .collect();
    labels.sort();
    assert_eq!(labels, vec!["first", "second"]);
}

#[tokio::test]
async fn test_http_failures_do_not_stop_the_batch() {
    let server = MockServer::start().await;
    let urls = mount_pages(&server, 2, None).await;
    mount(&server, "/not-found", ResponseTemplate::new(404)).await;
    mount(&server, "/broken", ResponseTemplate::new(500)).await;

    let batch = krawler(ParserMode::Raw, 2)
        .queue(
            vec![
                format!("{}/not-found", server.uri()),
                urls[0].clone(),
                format!("{}/broken", server.uri()),
                urls[1].clone(),
            ],
            QueueOptions::default(),
        )
        .unwrap();

    let events = drain(batch).await;
    let mut codes: Vec<u16> = events
        .iter()
        .filter_map(|event| match event {
            CrawlEvent::Error {
                error: KrawlError::HttpStatus { status, .. },
                ..
            } => Some(*status),
            _ => None,
        })
        .collect();
    codes.sort();
    assert_eq!(codes, vec![404, 500]);

    let succeeded = events
        .iter()
        .filter(|e| matches!(e, CrawlEvent::Data { .. }))
        .count();
    assert_eq!(succeeded, 2);
    assert!(matches!(events.last(), Some(CrawlEvent::End)));
}

#[tokio::test]
async fn test_unreachable_host_is_an_error_event() {
    let batch = krawler(ParserMode::Raw, 1)
        .queue("http://127.0.0.1:9/unreachable", QueueOptions::default())
        .unwrap();

    let events = drain(batch).await;
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[0],
        CrawlEvent::Error {
            error: KrawlError::Transport(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_limit_serialises_slow_responses() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(100);
    let urls = mount_pages(&server, 6, Some(delay)).await;

    let started = Instant::now();
    let summary = krawler(ParserMode::Raw, 2)
        .queue(urls, QueueOptions::default())
        .unwrap()
        .collect_all()
        .await;

    assert_eq!(summary.succeeded, 6);
    // Six slow responses through two slots need at least three rounds
    assert!(started.elapsed() >= delay * 3);
}

#[tokio::test]
async fn test_unacknowledged_result_blocks_admission() {
    let server = MockServer::start().await;
    let urls = mount_pages(&server, 3, None).await;

    let mut batch = krawler(ParserMode::Raw, 1)
        .queue(urls, QueueOptions::acknowledged())
        .unwrap();

    let ack = match batch.recv().await {
        Some(CrawlEvent::Data { ack, .. }) => ack.unwrap(),
        other => panic!("unexpected event: {other:?}"),
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    ack.done();

    let mut remaining = 0;
    while let Some(event) = batch.recv().await {
        match event {
            CrawlEvent::Data { .. } => remaining += 1,
            CrawlEvent::End => break,
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(remaining, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let err = krawler(ParserMode::Raw, 1)
        .queue(Vec::<String>::new(), QueueOptions::default())
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Invalid input: At least one URL must be specified."
    );
}
