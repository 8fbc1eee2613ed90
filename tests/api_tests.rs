// tests/api_tests.rs

use std::sync::Arc;

use quiz_answers::{
    config::Config,
    routes,
    services::{StoreSettings, SubmissionStore},
    state::AppState,
    store::MemoryKv,
};

/// Spawns the app on a random port backed by an in-memory store.
/// Returns the base URL and the store so tests can inspect it.
async fn spawn_app(config: Config) -> (String, Arc<MemoryKv>) {
    let kv = Arc::new(MemoryKv::new());
    let store = SubmissionStore::new(kv.clone(), StoreSettings::from(&config));
    let app = routes::create_router(AppState { store, config });

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, kv)
}

#[tokio::test]
async fn health_check_works() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_path_404() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn submit_and_list_recent() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/answers", address))
        .json(&serde_json::json!({
            "userId": "u1",
            "userName": "Aziz",
            "testInfo": {"closedQuestions": 30, "title": "Mock 1"},
            "answers": {"1": "A", "2": "C", "31": "essay text"}
        }))
        .send()
        .await
        .expect("Submit failed");

    assert_eq!(response.status().as_u16(), 200);
    let saved: serde_json::Value = response.json().await.unwrap();
    assert_eq!(saved["success"], true);
    assert_eq!(saved["stats"]["total"], 3);
    assert_eq!(saved["stats"]["closed"], 2);
    assert_eq!(saved["stats"]["open"], 1);
    assert_eq!(saved["stats"]["openAnswers"]["31"], "essay text");
    let saved_id = saved["savedId"].as_str().expect("savedId missing").to_string();
    assert!(saved_id.starts_with("u1_"));

    // Root path lists the same data as /api/answers.
    for path in ["/", "/api/answers"] {
        let recent: serde_json::Value = client
            .get(format!("{}{}?userId=u1", address, path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(recent["success"], true);
        let list = recent["recent"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], saved_id.as_str());
        assert_eq!(list[0]["userName"], "Aziz");
        assert_eq!(list[0]["openAnswers"]["31"], "essay text");
    }

    let record: serde_json::Value = client
        .get(format!("{}/api/answers/{}", address, saved_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(record["closedAnswers"], serde_json::json!({"1": "A", "2": "C"}));
    assert_eq!(record["testInfo"]["title"], "Mock 1");
}

#[tokio::test]
async fn recent_respects_limit_and_capacity() {
    let config = Config {
        recent_capacity: 3,
        ..Config::default()
    };
    let (address, _) = spawn_app(config).await;
    let client = reqwest::Client::new();

    for i in 0..5 {
        let response = client
            .post(format!("{}/", address))
            .json(&serde_json::json!({"userId": 77, "answers": {"1": format!("{}", i)}}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    let all: serde_json::Value = client
        .get(format!("{}/api/answers?userId=77", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["recent"].as_array().unwrap().len(), 3);

    let two: serde_json::Value = client
        .get(format!("{}/api/answers?userId=77&limit=2", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(two["recent"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn recent_for_unknown_user_is_empty() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(format!("{}/api/answers?userId=ghost&limit=5", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["recent"], serde_json::json!([]));
}

#[tokio::test]
async fn recent_requires_user_id() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/answers", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn submit_fails_validation_without_writes() {
    let (address, kv) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let bodies = [
        serde_json::json!({"answers": {"1": "A"}}),
        serde_json::json!({"userId": "u1"}),
        serde_json::json!({"userId": "u1", "answers": "A,B,C"}),
        serde_json::json!({"userId": "u1", "answers": {}, "testInfo": {"closedQuestions": -1}}),
        serde_json::json!(["not", "an", "object"]),
    ];

    for body in bodies {
        let response = client
            .post(format!("{}/api/answers", address))
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400, "body: {}", body);
        let error: serde_json::Value = response.json().await.unwrap();
        assert_eq!(error["success"], false);
    }

    assert_eq!(kv.put_calls(), 0);
}

#[tokio::test]
async fn missing_submission_404() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/answers/u1_0_deadbeef", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn index_failure_reports_saved_id() {
    let (address, kv) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();
    kv.fail_puts_with_prefix("recent:");

    let response = client
        .post(format!("{}/api/answers", address))
        .json(&serde_json::json!({"userId": "u1", "answers": {"1": "A"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["indexUpdated"], false);
    let saved_id = body["savedId"].as_str().unwrap();

    // The record itself is reachable by id even though the list missed it.
    let record = client
        .get(format!("{}/api/answers/{}", address, saved_id))
        .send()
        .await
        .unwrap();
    assert_eq!(record.status().as_u16(), 200);
}

#[tokio::test]
async fn responses_carry_cors_header() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/answers", address))
        .header("Origin", "https://quiz.example")
        .json(&serde_json::json!({"userId": "u1", "answers": {"1": "A"}}))
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn malformed_json_gets_error_envelope() {
    let (address, kv) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/answers", address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert_eq!(kv.put_calls(), 0);
}

#[tokio::test]
async fn content_type_is_not_required() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    // Valid JSON under text/plain is accepted.
    let accepted = client
        .post(format!("{}/api/answers", address))
        .header("Content-Type", "text/plain")
        .body(r#"{"userId": "u1", "answers": {"1": "A"}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status().as_u16(), 200);

    // Plain text that is not JSON is a 400 in the usual envelope.
    let rejected = client
        .post(format!("{}/api/answers", address))
        .header("Content-Type", "text/plain")
        .body("userId=u1")
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status().as_u16(), 400);
    let body: serde_json::Value = rejected.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn bad_limit_gets_error_envelope() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/answers?userId=u1&limit=abc", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn zero_limit_lists_nothing() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/answers", address))
        .json(&serde_json::json!({"userId": "u1", "answers": {"1": "A"}}))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = client
        .get(format!("{}/api/answers?userId=u1&limit=0", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["recent"], serde_json::json!([]));
}

#[tokio::test]
async fn submission_with_slash_in_user_id_is_fetchable() {
    let (address, _) = spawn_app(Config::default()).await;
    let client = reqwest::Client::new();

    let saved: serde_json::Value = client
        .post(format!("{}/api/answers", address))
        .json(&serde_json::json!({"userId": "class-7/aziz", "answers": {"1": "A"}}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let saved_id = saved["savedId"].as_str().unwrap();
    assert!(saved_id.starts_with("class-7/aziz_"));

    let response = client
        .get(format!("{}/api/answers/{}", address, saved_id))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let record: serde_json::Value = response.json().await.unwrap();
    assert_eq!(record["id"], saved_id);
    assert_eq!(record["userId"], "class-7/aziz");
}
