use super::*;
use axum::{body, body::Body, http::Request, response::Response};
use shared::domain::MatterStatus;
use storage::NewMatter;
use tower::ServiceExt;

const TEST_BODY_LIMIT: usize = 4 * 1024;

async fn test_app() -> (Router, Storage, MatterId) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let matter_id = storage
        .create_matter(&NewMatter {
            name: "Acme v. Widget".into(),
            number: Some("2024-001".into()),
            client_name: Some("Acme".into()),
            status: Some(MatterStatus::Collection),
        })
        .await
        .expect("matter");

    let api = ApiContext {
        storage: storage.clone(),
    };
    let app = build_router(Arc::new(AppState { api }), TEST_BODY_LIMIT);
    (app, storage, matter_id)
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn put_status(matter_id: i64, body: serde_json::Value) -> Request<Body> {
    Request::put(format!("/api/matters/{matter_id}/status"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage, _matter_id) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn lists_matters_with_wire_status() {
    let (app, _storage, matter_id) = test_app().await;
    let request = Request::get("/api/matters")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let matters: Vec<serde_json::Value> = read_json(response).await;
    assert_eq!(matters.len(), 1);
    assert_eq!(matters[0]["id"], matter_id.0);
    assert_eq!(matters[0]["status"], "COLLECTION");
}

#[tokio::test]
async fn put_status_persists_only_the_status() {
    let (app, storage, matter_id) = test_app().await;
    let response = app
        .oneshot(put_status(
            matter_id.0,
            serde_json::json!({ "status": "REVIEW" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let returned: Matter = read_json(response).await;
    assert_eq!(returned.status, MatterStatus::Review);

    let stored = storage
        .get_matter(matter_id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.status, MatterStatus::Review);
    assert_eq!(stored.name, "Acme v. Widget");
    assert_eq!(stored.number.as_deref(), Some("2024-001"));
}

#[tokio::test]
async fn put_status_for_missing_matter_is_404() {
    let (app, _storage, _matter_id) = test_app().await;
    let response = app
        .oneshot(put_status(999, serde_json::json!({ "status": "REVIEW" })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn put_status_rejects_values_outside_the_enum() {
    let (app, storage, matter_id) = test_app().await;
    let response = app
        .oneshot(put_status(
            matter_id.0,
            serde_json::json!({ "status": "ARCHIVED" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let stored = storage
        .get_matter(matter_id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.status, MatterStatus::Collection);
}

#[tokio::test]
async fn create_then_fetch_matter() {
    let (app, _storage, _matter_id) = test_app().await;
    let create = Request::post("/api/matters")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "name": "Globex merger", "status": "CULLING" }).to_string(),
        ))
        .expect("request");
    let response = app.clone().oneshot(create).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Matter = read_json(response).await;
    assert_eq!(created.status, MatterStatus::Culling);

    let fetch = Request::get(format!("/api/matters/{}", created.id.0))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(fetch).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Matter = read_json(response).await;
    assert_eq!(fetched.name, "Globex merger");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, _storage, _matter_id) = test_app().await;
    let name = "x".repeat(TEST_BODY_LIMIT * 2);
    let create = Request::post("/api/matters")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "name": name }).to_string()))
        .expect("request");
    let response = app.oneshot(create).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
