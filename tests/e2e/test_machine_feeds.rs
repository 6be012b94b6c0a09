use crate::e2e::helpers;

use helpers::assertions::{assert_feed_page, feed_details};
use helpers::fixtures::{self, MACHINE_ID, MACHINE_NAME};
use helpers::mock_upstream::MockResponse;
use helpers::{TestContext, Upstreams};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_newest_item_on_first_page(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/machine-feeds/123?page=1&size=1")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    assert_eq!(
        response.body.as_ref().unwrap(),
        &json!({
            "machineId": "123",
            "machineName": "Machine ABC",
            "feeds": [
                {"type": "session", "details": "Session 1", "timestamp": "2023-12-25T11:00:00Z"}
            ],
            "page": 1,
            "size": 1,
            "totalPages": 2,
            "totalItems": 2
        })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_older_item_on_second_page(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/machine-feeds/123?page=2&size=1")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_feed_page(body, MACHINE_ID, MACHINE_NAME, 2, 1, 2);
    assert_eq!(feed_details(body), vec!["Repair 1"]);
    assert_eq!(body["feeds"][0]["type"], "repair");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_apply_default_pagination(ctx: &TestContext) {
    let response = ctx.client.get("/machine-feeds/123").await.unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_feed_page(body, MACHINE_ID, MACHINE_NAME, 1, 10, 2);
    assert_eq!(feed_details(body), vec!["Session 1", "Repair 1"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_empty_page_beyond_data(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/machine-feeds/123?page=5&size=10")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_feed_page(body, MACHINE_ID, MACHINE_NAME, 5, 10, 2);
    assert_eq!(body["feeds"], json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_pass_machine_id_to_every_upstream(ctx: &TestContext) {
    let response = ctx.client.get("/machine-feeds/press%2007").await.unwrap();

    response.assert_status(StatusCode::OK);

    let expected = vec![Some("press 07".to_string())];
    assert_eq!(ctx.upstreams.machine_name.machine_ids(), expected);
    assert_eq!(ctx.upstreams.repairs.machine_ids(), expected);
    assert_eq!(ctx.upstreams.sessions.machine_ids(), expected);
    assert_eq!(
        response.body.as_ref().unwrap()["machineId"],
        json!("press 07")
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_page(ctx: &TestContext) {
    for query in ["page=0", "page=-1", "page=abc", "page="] {
        let response = ctx
            .client
            .get(&format!("/machine-feeds/123?{query}"))
            .await
            .unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error("Invalid page parameter");
        assert!(response.body.as_ref().unwrap().get("details").is_none());
    }

    assert_eq!(ctx.upstreams.total_hits(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_size(ctx: &TestContext) {
    for query in ["size=0", "size=-3", "size=ten", "size=", "page=1&size=0"] {
        let response = ctx
            .client
            .get(&format!("/machine-feeds/123?{query}"))
            .await
            .unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error("Invalid size parameter");
    }

    assert_eq!(ctx.upstreams.total_hits(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_machine_id(ctx: &TestContext) {
    for path in ["/machine-feeds", "/machine-feeds/"] {
        let response = ctx.client.get(path).await.unwrap();

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error("machineId path parameter is required");
    }

    assert_eq!(ctx.upstreams.total_hits(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_use_first_value_of_repeated_query_params(ctx: &TestContext) {
    let response = ctx
        .client
        .get("/machine-feeds/123?page=1&page=2&size=1&size=5")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_feed_page(body, MACHINE_ID, MACHINE_NAME, 1, 1, 2);
    assert_eq!(feed_details(body), vec!["Session 1"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_undecodable_machine_id_with_json_error(ctx: &TestContext) {
    let response = ctx.client.get("/machine-feeds/%FF").await.unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.header("content-type").map(String::as_str),
        Some("application/json")
    );

    let error = response.body.as_ref().unwrap()["error"].as_str().unwrap();
    assert!(error.contains("machineId"), "{error}");

    assert_eq!(ctx.upstreams.total_hits(), 0);
}

#[tokio::test]
async fn it_should_fail_fast_when_machine_name_lookup_fails() {
    let upstreams = Upstreams::new(
        MockResponse::status(StatusCode::NOT_FOUND),
        MockResponse::json(fixtures::sample_repairs()),
        MockResponse::json(fixtures::sample_sessions()),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx.client.get("/machine-feeds/123").await.unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error("Failed to fetch machine name")
        .assert_details_contain("404 Not Found");

    assert_eq!(ctx.upstreams.machine_name.hits(), 1);
    assert_eq!(ctx.upstreams.repairs.hits(), 0);
    assert_eq!(ctx.upstreams.sessions.hits(), 0);
}

#[tokio::test]
async fn it_should_not_fetch_sessions_when_repairs_fail() {
    let upstreams = Upstreams::new(
        MockResponse::json(fixtures::machine_name(MACHINE_NAME)),
        MockResponse::status(StatusCode::BAD_REQUEST),
        MockResponse::json(fixtures::sample_sessions()),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx.client.get("/machine-feeds/123").await.unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error("Failed to fetch repairs")
        .assert_details_contain("failed to fetch repairs: 400 Bad Request");

    assert_eq!(ctx.upstreams.machine_name.hits(), 1);
    assert_eq!(ctx.upstreams.repairs.hits(), 1);
    assert_eq!(ctx.upstreams.sessions.hits(), 0);
}

#[tokio::test]
async fn it_should_report_malformed_sessions_body() {
    let upstreams = Upstreams::new(
        MockResponse::json(fixtures::machine_name(MACHINE_NAME)),
        MockResponse::json(fixtures::sample_repairs()),
        MockResponse::raw(r#"{"sessions": "not a list"}"#),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx.client.get("/machine-feeds/123").await.unwrap();

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error("Failed to fetch sessions")
        .assert_details_contain("failed to decode sessions response");

    // Decode failures are not retried
    assert_eq!(ctx.upstreams.sessions.hits(), 1);
}

#[tokio::test]
async fn it_should_return_empty_feed_when_machine_has_no_activity() {
    let upstreams = Upstreams::new(
        MockResponse::json(fixtures::machine_name("Idle press")),
        MockResponse::json(json!([])),
        MockResponse::json(json!([])),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx.client.get("/machine-feeds/m-9").await.unwrap();

    response.assert_status(StatusCode::OK);

    assert_eq!(
        response.body.as_ref().unwrap(),
        &json!({
            "machineId": "m-9",
            "machineName": "Idle press",
            "feeds": [],
            "page": 1,
            "size": 10,
            "totalPages": 0,
            "totalItems": 0
        })
    );
}

#[tokio::test]
async fn it_should_interleave_repairs_and_sessions_across_pages() {
    // Repairs at 00:00, 02:00, 04:00; sessions at 01:00, 03:00
    let repairs = json!([
        fixtures::record("repair", "r0", "2024-03-01T00:00:00Z"),
        fixtures::record("repair", "r2", "2024-03-01T02:00:00Z"),
        fixtures::record("repair", "r4", "2024-03-01T04:00:00Z"),
    ]);
    let sessions = json!([
        fixtures::record("session", "s1", "2024-03-01T01:00:00Z"),
        fixtures::record("session", "s3", "2024-03-01T03:00:00Z"),
    ]);
    let upstreams = Upstreams::new(
        MockResponse::json(fixtures::machine_name(MACHINE_NAME)),
        MockResponse::json(repairs),
        MockResponse::json(sessions),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let mut pages = Vec::new();
    for page in 1..=3 {
        let response = ctx
            .client
            .get(&format!("/machine-feeds/123?page={page}&size=2"))
            .await
            .unwrap();
        response.assert_status(StatusCode::OK);

        let body = response.body.as_ref().unwrap();
        assert_feed_page(body, MACHINE_ID, MACHINE_NAME, page, 2, 5);
        pages.push(feed_details(body));
    }

    assert_eq!(
        pages,
        vec![
            vec!["r4".to_string(), "s3".to_string()],
            vec!["r2".to_string(), "s1".to_string()],
            vec!["r0".to_string()],
        ]
    );
}

#[tokio::test]
async fn it_should_keep_repairs_first_on_equal_timestamps_and_sink_bad_ones() {
    let ts = "2024-03-01T12:00:00Z";
    let repairs = json!([
        fixtures::record("repair", "broken clock", "not-a-timestamp"),
        fixtures::record("repair", "r-a", ts),
    ]);
    let sessions = json!([
        fixtures::record("session", "s-a", ts),
        fixtures::record("session", "s-newer", "2024-03-01T13:00:00Z"),
    ]);
    let upstreams = Upstreams::new(
        MockResponse::json(fixtures::machine_name(MACHINE_NAME)),
        MockResponse::json(repairs),
        MockResponse::json(sessions),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx.client.get("/machine-feeds/123").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_eq!(
        feed_details(body),
        vec!["s-newer", "r-a", "s-a", "broken clock"]
    );
    // Timestamps are echoed exactly as received
    assert_eq!(body["feeds"][3]["timestamp"], "not-a-timestamp");
}

#[tokio::test]
async fn it_should_handle_larger_feeds() {
    let upstreams = Upstreams::new(
        MockResponse::json(fixtures::machine_name(MACHINE_NAME)),
        MockResponse::json(fixtures::hourly_records("repair", 12, 0)),
        MockResponse::json(fixtures::hourly_records("session", 11, 12)),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx
        .client
        .get("/machine-feeds/123?page=3&size=10")
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_feed_page(body, MACHINE_ID, MACHINE_NAME, 3, 10, 23);
    assert_eq!(feed_details(body), vec!["repair 2", "repair 1", "repair 0"]);
}

#[tokio::test]
async fn it_should_accept_records_with_missing_fields() {
    let repairs = json!([
        {"type": "repair", "details": "no timestamp"},
        fixtures::record("repair", "r-dated", "2024-03-01T09:00:00Z"),
    ]);
    let sessions = json!([
        {"details": "untyped", "timestamp": "2024-03-01T10:00:00Z"},
    ]);
    let upstreams = Upstreams::new(
        MockResponse::json(json!({})),
        MockResponse::json(repairs),
        MockResponse::json(sessions),
    )
    .await;
    let ctx = TestContext::new(upstreams).await.unwrap();

    let response = ctx.client.get("/machine-feeds/123").await.unwrap();
    response.assert_status(StatusCode::OK);

    let body = response.body.as_ref().unwrap();
    assert_feed_page(body, MACHINE_ID, "", 1, 10, 3);
    assert_eq!(feed_details(body), vec!["untyped", "r-dated", "no timestamp"]);
    assert_eq!(
        body["feeds"][2],
        json!({"type": "repair", "details": "no timestamp", "timestamp": ""})
    );
    assert_eq!(body["feeds"][0]["type"], "");
}
