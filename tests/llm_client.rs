//! `OpenAiCompatClient` against a local fake chat-completions server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use docchat::answer::answer_question;
use docchat::config::LlmConfig;
use docchat::llm::{ChatModel, OpenAiCompatClient};
use docchat_core::{ChunkConfig, Retriever, StaticSource};

/// Fails the first `failures` calls with `fail_status`, then answers.
struct FakeApi {
    calls: AtomicUsize,
    failures: usize,
    fail_status: StatusCode,
    bodies: Mutex<Vec<Value>>,
    auth: Mutex<Vec<String>>,
}

async fn completions(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let n = api.calls.fetch_add(1, Ordering::SeqCst);
    api.bodies.lock().unwrap().push(body);
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        api.auth.lock().unwrap().push(auth.to_string());
    }

    if n < api.failures {
        return (api.fail_status, Json(json!({ "error": { "message": "try later" } })))
            .into_response();
    }

    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "\n  El gato se sentó.  \n" },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn spawn_fake(failures: usize, fail_status: StatusCode) -> (Arc<FakeApi>, String) {
    let api = Arc::new(FakeApi {
        calls: AtomicUsize::new(0),
        failures,
        fail_status,
        bodies: Mutex::new(Vec::new()),
        auth: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/openai/v1/chat/completions", post(completions))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (api, format!("http://{}/openai/v1", addr))
}

fn client_for(base_url: &str, max_retries: u32) -> OpenAiCompatClient {
    let config = LlmConfig {
        base_url: base_url.to_string(),
        max_retries,
        timeout_secs: 5,
        ..LlmConfig::default()
    };
    OpenAiCompatClient::new(&config, "test-key")
        .unwrap()
        .with_backoff_base(Duration::from_millis(5))
}

#[tokio::test]
async fn test_sends_single_user_message_with_low_temperature() {
    let (api, base) = spawn_fake(0, StatusCode::OK).await;
    let client = client_for(&base, 0);

    let reply = client.complete("¿Quién se sentó?").await.unwrap();
    assert_eq!(reply, "\n  El gato se sentó.  \n");

    let bodies = api.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "llama-3.1-8b-instant");
    assert!((bodies[0]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    assert_eq!(bodies[0]["messages"][0]["role"], "user");
    assert_eq!(bodies[0]["messages"][0]["content"], "¿Quién se sentó?");
    assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 1);
    assert_eq!(api.auth.lock().unwrap()[0], "Bearer test-key");
}

#[tokio::test]
async fn test_retries_server_errors() {
    let (api, base) = spawn_fake(2, StatusCode::SERVICE_UNAVAILABLE).await;
    let client = client_for(&base, 3);

    client.complete("hola").await.unwrap();
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_rate_limit_until_exhausted() {
    let (api, base) = spawn_fake(usize::MAX, StatusCode::TOO_MANY_REQUESTS).await;
    let client = client_for(&base, 2);

    let err = client.complete("hola").await.unwrap_err();
    assert!(err.to_string().contains("429"), "{}", err);
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (api, base) = spawn_fake(usize::MAX, StatusCode::UNAUTHORIZED).await;
    let client = client_for(&base, 5);

    let err = client.complete("hola").await.unwrap_err();
    assert!(err.to_string().contains("401"), "{}", err);
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_answer_pipeline_end_to_end() {
    let (api, base) = spawn_fake(0, StatusCode::OK).await;
    let client = client_for(&base, 0);
    let retriever = Retriever::new(
        StaticSource::new("t", "The cat sat. The dog ran. The cat ran."),
        ChunkConfig::new(20, 5).unwrap(),
    );

    let answer = answer_question(&retriever, &client, "sat", &[], 1)
        .await
        .unwrap();
    assert_eq!(answer, "El gato se sentó.");

    let bodies = api.bodies.lock().unwrap();
    let prompt = bodies[0]["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("=== CONTEXTO ===\nThe cat sat. The dog\n=== FIN CONTEXTO ==="));
    assert!(prompt.contains("Pregunta del usuario: sat\n"));
}
