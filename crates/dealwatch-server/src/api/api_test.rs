use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use dealwatch_core::JobPhase;
use dealwatch_pipeline::DealStore;
use dealwatch_scraper::{
    validate, BackoffPolicy, CandidateRecord, FetchPolicy, PageFetcher, ThrottleRange,
};
use rust_decimal::Decimal;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const ONE_CARD: &str = r#"<html><body>
<div data-testid="product-card">
  <span data-testid="product-card-title">Earbuds</span>
  <span class="a-price" data-a-strike="true"><span class="a-offscreen">AED 100.00</span></span>
  <span class="a-price"><span class="a-offscreen">AED 60.00</span></span>
</div>
</body></html>"#;

fn test_state() -> AppState {
    let fetcher = PageFetcher::new(FetchPolicy {
        timeout: Duration::from_secs(5),
        backoff: BackoffPolicy::none(),
        throttle: ThrottleRange::fixed(0),
        user_agents: Vec::new(),
    })
    .expect("fetcher");
    AppState {
        orchestrator: Orchestrator::new(fetcher, Arc::new(DealStore::new())),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

async fn wait_for_terminal(state: &AppState, platform: Platform) {
    for _ in 0..100 {
        let phase = state.orchestrator.status(platform).phase;
        if matches!(phase, JobPhase::Completed | JobPhase::Failed) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job for {platform} did not finish");
}

#[test]
fn api_error_serializes_success_false() {
    let err = ApiError::bad_request("URL is required");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({ "success": false, "error": "URL is required" })
    );
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[test]
fn platform_query_defaults_to_amazon() {
    let query = PlatformQuery { platform: None };
    assert_eq!(query.resolve().unwrap(), Platform::Amazon);
    let query = PlatformQuery {
        platform: Some("NOON".to_owned()),
    };
    assert_eq!(query.resolve().unwrap(), Platform::Noon);
}

#[tokio::test]
async fn health_returns_ok_with_generated_request_id() {
    let response = build_app(test_state())
        .oneshot(get("/api/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap()
        .to_owned();
    assert_eq!(id.len(), 36, "expected a UUID, got {id}");
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn request_id_is_propagated() {
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = build_app(test_state()).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/api/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = build_app(test_state()).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn status_of_untouched_platform_is_idle() {
    let response = build_app(test_state())
        .oneshot(get("/api/status"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["platform"], "amazon");
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["scraped_count"], 0);
    assert_eq!(json["valid_count"], 0);
    assert!(json.get("last_error").is_none());
}

#[tokio::test]
async fn unknown_platform_is_bad_request() {
    for uri in ["/api/status?platform=ebay", "/api/deals?platform=ebay"] {
        let response = build_app(test_state()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "unsupported platform: ebay");
    }
}

#[tokio::test]
async fn deals_lists_store_contents() {
    let state = test_state();
    let mut candidate = CandidateRecord::new(Platform::Noon, "https://www.noon.com/uae-en/deals/");
    candidate.title = Some("Air Fryer".to_owned());
    candidate.original_price = Some(Decimal::from(300));
    candidate.discounted_price = Some(Decimal::from(200));
    let deal = validate(candidate).unwrap();
    state.orchestrator.store().replace(Platform::Noon, vec![deal]);

    let response = build_app(state)
        .oneshot(get("/api/deals?platform=noon"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["platform"], "noon");
    assert_eq!(json["count"], 1);
    assert_eq!(json["deals"][0]["title"], "Air Fryer");
    assert_eq!(json["deals"][0]["discounted_price"], "200.00");
    assert_eq!(json["deals"][0]["discount_percent"], "33.33");
}

#[tokio::test]
async fn deals_of_empty_store_is_empty_list() {
    let response = build_app(test_state())
        .oneshot(get("/api/deals"))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["deals"], serde_json::json!([]));
}

#[tokio::test]
async fn scrape_requires_url() {
    let response = build_app(test_state())
        .oneshot(post_json("/api/scrape", &serde_json::json!({ "platform": "amazon" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "invalid target: URL is required");
}

#[tokio::test]
async fn scrape_rejects_unknown_platform_and_bad_url() {
    for body in [
        serde_json::json!({ "url": "https://www.amazon.ae/deals", "platform": "ebay" }),
        serde_json::json!({ "url": "not a url" }),
    ] {
        let response = build_app(test_state())
            .oneshot(post_json("/api/scrape", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn scrape_rejects_unknown_host_without_platform() {
    let body = serde_json::json!({ "url": "https://www.ebay.com/deals" });
    let state = test_state();

    let response = build_app(state.clone())
        .oneshot(post_json("/api/scrape", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "invalid target: unsupported host \"www.ebay.com\"; expected an Amazon or noon URL"
    );
    assert_eq!(
        state.orchestrator.status(Platform::Amazon).phase,
        JobPhase::Idle
    );
}

#[tokio::test]
async fn scrape_with_zero_max_deals_reads_every_card() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_CARD))
        .mount(&server)
        .await;
    let state = test_state();
    let body = serde_json::json!({
        "url": format!("{}/deals", server.uri()),
        "platform": "amazon",
        "max_deals": 0,
    });

    let response = build_app(state.clone())
        .oneshot(post_json("/api/scrape", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_terminal(&state, Platform::Amazon).await;
    let status = state.orchestrator.status(Platform::Amazon);
    assert_eq!(status.requested_count, None);
    assert_eq!(status.valid_count, 1);
}

#[tokio::test]
async fn scrape_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/scrape")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = build_app(test_state()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn scrape_is_accepted_then_completes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_CARD))
        .mount(&server)
        .await;
    let state = test_state();
    let body = serde_json::json!({
        "url": format!("{}/deals", server.uri()),
        "platform": "amazon",
        "max_deals": 5,
    });

    let response = build_app(state.clone())
        .oneshot(post_json("/api/scrape", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["platform"], "amazon");

    wait_for_terminal(&state, Platform::Amazon).await;
    let status = state.orchestrator.status(Platform::Amazon);
    assert_eq!(status.phase, JobPhase::Completed);
    assert_eq!(status.requested_count, Some(5));
    assert_eq!(status.valid_count, 1);
    assert_eq!(state.orchestrator.store().read(Platform::Amazon).len(), 1);
}

#[tokio::test]
async fn scrape_while_running_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ONE_CARD)
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let state = test_state();
    let body = serde_json::json!({ "url": format!("{}/slow", server.uri()), "platform": "amazon" });

    let first = build_app(state.clone())
        .oneshot(post_json("/api/scrape", &body))
        .await
        .unwrap();
    let second = build_app(state.clone())
        .oneshot(post_json("/api/scrape", &body))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::ACCEPTED);
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = json_body(second).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "scrape already running for amazon");

    wait_for_terminal(&state, Platform::Amazon).await;
}
