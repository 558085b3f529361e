use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::subscription::{repository::mock::InMemorySubscriptionRepository, SubscriptionService};
use tower::Service;
use uuid::Uuid;

use server::routes::{self, ServerState};

fn build_app() -> Router {
    let repo = Arc::new(InMemorySubscriptionRepository::default());
    let state = ServerState { subscriptions: SubscriptionService::new(repo) };
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

fn netflix(user_id: Uuid, price: i32, start: &str) -> Value {
    json!({"service_name": "Netflix", "price": price, "user_id": user_id, "start_date": start})
}

#[tokio::test]
async fn create_then_read_returns_normalized_record() -> anyhow::Result<()> {
    let app = build_app();
    let user = Uuid::new_v4();

    let (status, body) = send(&app, "POST", "/subscriptions", Some(json!({
        "service_name": "Yandex Plus", "price": 400, "user_id": user,
        "start_date": "07-2025", "end_date": "02-2026"
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "created new sub with id: 1"}));

    let (status, body) = send(&app, "GET", "/subscriptions/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], json!({
        "id": 1, "service_name": "Yandex Plus", "price": 400, "user_id": user,
        "start_date": "7-2025", "end_date": "2-2026"
    }));
    Ok(())
}

#[tokio::test]
async fn missing_end_date_reads_back_as_empty_string() -> anyhow::Result<()> {
    let app = build_app();
    send(&app, "POST", "/subscriptions", Some(netflix(Uuid::new_v4(), 100, "01-2025"))).await?;
    let (_, body) = send(&app, "GET", "/subscriptions/1", None).await?;
    assert_eq!(body["message"]["end_date"], "");
    Ok(())
}

#[tokio::test]
async fn create_with_bad_body_is_400() -> anyhow::Result<()> {
    let app = build_app();
    let cases = vec![
        (json!({"service_name": "Netflix", "price": "ten", "user_id": Uuid::new_v4()}), "price not a number"),
        (json!({"service_name": "Netflix", "price": 1, "user_id": "not-a-uuid"}), "bad uuid"),
        (json!({"price": 1, "user_id": Uuid::new_v4()}), "missing service_name"),
    ];
    for (body, case) in cases {
        let (status, body) = send(&app, "POST", "/subscriptions", Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
        assert_eq!(body, json!({"success": false, "message": "reading request body error"}), "{case}");
    }
    Ok(())
}

#[tokio::test]
async fn create_with_empty_service_name_is_400() -> anyhow::Result<()> {
    let app = build_app();
    let mut body = netflix(Uuid::new_v4(), 1, "01-2025");
    body["service_name"] = json!("");
    let (status, body) = send(&app, "POST", "/subscriptions", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "creating sub error");
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_404_on_every_route() -> anyhow::Result<()> {
    let app = build_app();
    let body = Some(netflix(Uuid::new_v4(), 1, "01-2025"));
    for (method, payload) in [("GET", None), ("PATCH", body.clone()), ("DELETE", None)] {
        for id in ["abc", "-3", "cost"] {
            if method == "GET" && id == "cost" {
                continue;
            }
            let (status, resp) = send(&app, method, &format!("/subscriptions/{id}"), payload.clone()).await?;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {id}");
            assert_eq!(resp, json!({"success": false, "message": "incorrect sub id"}));
        }
    }
    Ok(())
}

#[tokio::test]
async fn read_missing_is_404() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "GET", "/subscriptions/9", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "read error, sub not found");
    Ok(())
}

#[tokio::test]
async fn update_replaces_record_keyed_by_path_id() -> anyhow::Result<()> {
    let app = build_app();
    let user = Uuid::new_v4();
    send(&app, "POST", "/subscriptions", Some(netflix(user, 100, "01-2025"))).await?;

    let mut patch = netflix(user, 150, "03-2025");
    patch["id"] = json!(999);
    let (status, body) = send(&app, "PATCH", "/subscriptions/1", Some(patch)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "sub updated"}));

    let (_, body) = send(&app, "GET", "/subscriptions/1", None).await?;
    assert_eq!(body["message"]["id"], 1);
    assert_eq!(body["message"]["price"], 150);
    assert_eq!(body["message"]["start_date"], "3-2025");
    Ok(())
}

#[tokio::test]
async fn update_and_delete_missing_fail_with_envelope() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "PATCH", "/subscriptions/5", Some(netflix(Uuid::new_v4(), 1, "01-2025"))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "update failed, sub not found"}));

    let (status, body) = send(&app, "DELETE", "/subscriptions/5", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "delete failed, sub not found"}));
    Ok(())
}

#[tokio::test]
async fn delete_then_read_is_404() -> anyhow::Result<()> {
    let app = build_app();
    send(&app, "POST", "/subscriptions", Some(netflix(Uuid::new_v4(), 1, "01-2025"))).await?;
    let (status, body) = send(&app, "DELETE", "/subscriptions/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "sub deleted");
    let (status, _) = send(&app, "GET", "/subscriptions/1", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_empty_is_error_then_lists_rows() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "GET", "/subscriptions", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "sub list is empty"}));

    let user = Uuid::new_v4();
    send(&app, "POST", "/subscriptions", Some(netflix(user, 1, "01-2025"))).await?;
    send(&app, "POST", "/subscriptions", Some(netflix(user, 2, "02-2025"))).await?;
    let (status, body) = send(&app, "GET", "/subscriptions", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn cost_sums_matching_rows() -> anyhow::Result<()> {
    let app = build_app();
    let user = Uuid::new_v4();
    send(&app, "POST", "/subscriptions", Some(netflix(user, 100, "01-2025"))).await?;
    send(&app, "POST", "/subscriptions", Some(netflix(user, 200, "02-2025"))).await?;

    let uri = format!("/subscriptions/cost?user_id={user}&service_name=Netflix&start=01-2025&end=03-2025");
    let (status, body) = send(&app, "GET", &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": 300}));
    Ok(())
}

#[tokio::test]
async fn cost_with_no_rows_in_range_is_404() -> anyhow::Result<()> {
    let app = build_app();
    let user = Uuid::new_v4();
    send(&app, "POST", "/subscriptions", Some(netflix(user, 100, "01-2025"))).await?;
    let uri = format!("/subscriptions/cost?user_id={user}&service_name=Netflix&start=05-2025&end=06-2025");
    let (status, body) = send(&app, "GET", &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap_or_default().starts_with("cost request error"));
    Ok(())
}

#[tokio::test]
async fn cost_validates_query_parameters() -> anyhow::Result<()> {
    let app = build_app();
    let user = Uuid::new_v4();
    let cases = [
        (format!("/subscriptions/cost?user_id={user}&service_name=Netflix&start=01-2025"), StatusCode::BAD_REQUEST, "both dates are required"),
        (format!("/subscriptions/cost?user_id={user}&start=01-2025&end=02-2025"), StatusCode::BAD_REQUEST, "service name is required"),
        ("/subscriptions/cost?user_id=xyz&service_name=Netflix&start=01-2025&end=02-2025".to_string(), StatusCode::BAD_REQUEST, "wrong uuid"),
    ];
    for (uri, expected, message) in cases {
        let (status, body) = send(&app, "GET", &uri, None).await?;
        assert_eq!(status, expected, "{uri}");
        assert_eq!(body, json!({"success": false, "message": message}), "{uri}");
    }

    // Dates that do not parse to a month are a bad request, not a missing result.
    for (start, end) in [("01-1999", "02-2025"), ("13-2025", "03-2025"), ("01-2025", "march")] {
        let uri = format!("/subscriptions/cost?user_id={user}&service_name=Netflix&start={start}&end={end}");
        let (status, body) = send(&app, "GET", &uri, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{start} {end}");
        assert_eq!(body["success"], false);
        let message = body["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("cost request error"), "{message}");
        assert!(message.contains("MM-YYYY"), "{message}");
    }
    Ok(())
}

#[tokio::test]
async fn health_and_openapi_are_served() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/subscriptions/cost"].is_object());

    let req = Request::builder().uri("/swagger/").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert!(String::from_utf8_lossy(&bytes).contains("swagger-ui"));

    let req = Request::builder().uri("/swagger").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert!(resp.status().is_redirection() || resp.status() == StatusCode::OK);
    Ok(())
}
