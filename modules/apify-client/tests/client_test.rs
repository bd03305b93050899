//! Wiremock tests for ApifyClient.
//!
//! Covers the start → poll → fetch sequence and the error mapping for
//! non-2xx responses and failed runs.

use apify_client::{ApifyClient, ApifyError, Tweet};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run(id: &str, status: &str) -> serde_json::Value {
    json!({
        "data": {
            "id": id,
            "status": status,
            "defaultDatasetId": "ds-1",
            "startedAt": "2025-10-14T12:00:00Z",
            "finishedAt": null
        }
    })
}

#[tokio::test]
async fn scrape_replies_runs_actor_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acts/kaitoeasyapi~twitter-reply/runs"))
        .and(header("Authorization", "Bearer apify_test"))
        .and(body_json(json!({ "conversation_ids": ["1790"], "maxItems": 50 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(run("run-1", "READY")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/run-1"))
        .and(query_param("waitForFinish", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run("run-1", "SUCCEEDED")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "1791",
                "text": "great thread",
                "url": "https://x.com/a/status/1791",
                "viewCount": 10,
                "author": { "userName": "a", "followers": 5 }
            },
            { "id": "1792", "text": "nope", "viewCount": "n/a" }
        ])))
        .mount(&server)
        .await;

    let client = ApifyClient::new("apify_test").with_base_url(server.uri());
    let tweets = client.scrape_replies("1790", 50).await.expect("scrape should succeed");

    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets[0].id.as_deref(), Some("1791"));
    assert_eq!(tweets[0].view_count, Some(10));
    assert_eq!(
        tweets[0].author.as_ref().and_then(|a| a.followers),
        Some(5)
    );
    assert_eq!(tweets[1].view_count, None);
}

#[tokio::test]
async fn scrape_quotes_sends_quote_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(
            "/acts/kaitoeasyapi~twitter-x-data-tweet-scraper-pay-per-result-cheapest/runs",
        ))
        .and(body_json(json!({
            "filter:quote": true,
            "quoted_tweet_id": "1790",
            "maxItems": 3000
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(run("run-q", "RUNNING")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/run-q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run("run-q", "SUCCEEDED")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds-1/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = ApifyClient::new("apify_test").with_base_url(server.uri());
    let tweets = client.scrape_quotes("1790", 3000).await.unwrap();
    assert!(tweets.is_empty());
}

#[tokio::test]
async fn failed_run_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acts/kaitoeasyapi~twitter-reply/runs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(run("run-2", "READY")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/actor-runs/run-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run("run-2", "TIMED-OUT")))
        .mount(&server)
        .await;

    let client = ApifyClient::new("apify_test").with_base_url(server.uri());
    let err = client.scrape_replies("1790", 10).await.unwrap_err();

    match err {
        ApifyError::RunFailed { run_id, status } => {
            assert_eq!(run_id, "run-2");
            assert_eq!(status, "TIMED-OUT");
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/acts/kaitoeasyapi~twitter-reply/runs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let client = ApifyClient::new("bad").with_base_url(server.uri());
    let err = client.scrape_replies("1790", 10).await.unwrap_err();

    match err {
        ApifyError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid token");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn dataset_items_decode_into_caller_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/ds-9/items"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
        .mount(&server)
        .await;

    let client = ApifyClient::new("t").with_base_url(server.uri());
    let items: Vec<Tweet> = client.get_dataset_items("ds-9").await.unwrap();
    assert_eq!(items[0].id.as_deref(), Some("7"));
}
