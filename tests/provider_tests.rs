// tests/provider_tests.rs
//
// Drives the remote generation path against a local stub of the
// chat-completions endpoint.

mod common;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use common::sample_catalog;
use giftcard_site::content::openai::OpenAiClient;
use giftcard_site::content::{
    fallback_content, ContentGenerator, FallbackReason, GeneratedContent, Generation,
    LlmContentGenerator,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Stub {
    base_url: String,
    handle: ServerHandle,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

/// Serve `body` with `status` from POST /chat/completions after `delay`.
fn spawn_stub(status: StatusCode, body: String, delay: Duration) -> Stub {
    let seen: Arc<Mutex<Vec<(Option<String>, Value)>>> = Arc::default();
    let recorded = seen.clone();

    let server = HttpServer::new(move || {
        let body = body.clone();
        let recorded = recorded.clone();
        App::new().route(
            "/chat/completions",
            web::post().to(move |req: HttpRequest, payload: web::Json<Value>| {
                let body = body.clone();
                let recorded = recorded.clone();
                async move {
                    let auth = req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    recorded.lock().unwrap().push((auth, payload.into_inner()));
                    actix_rt::time::sleep(delay).await;
                    HttpResponse::build(status)
                        .content_type("application/json")
                        .body(body)
                }
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind stub");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);

    Stub {
        base_url: format!("http://{addr}"),
        handle,
        seen,
    }
}

fn completion(content: &str) -> String {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn generator(base_url: &str, timeout: Duration) -> LlmContentGenerator {
    let client = OpenAiClient::new("sk-test", base_url, timeout).unwrap();
    LlmContentGenerator::new(client, "gpt-test")
}

fn provider_copy(entry_id: &str) -> GeneratedContent {
    let catalog = sample_catalog();
    let mut content = fallback_content(catalog.get(entry_id).unwrap());
    content.hero_headline = "Send Daraz Credit Home to Pakistan".into();
    for (d, v) in content.denominations.iter_mut().zip([500.0, 1000.0, 2000.0, 5000.0, 10000.0]) {
        d.value = v;
        d.currency = "PKR".into();
        d.label = format!("₨{v}");
    }
    content
}

#[actix_web::test]
async fn valid_provider_answer_is_used() {
    let expected = provider_copy("daraz-pk");
    let stub = spawn_stub(
        StatusCode::OK,
        completion(&serde_json::to_string(&expected).unwrap()),
        Duration::ZERO,
    );
    let catalog = sample_catalog();

    let generation = generator(&stub.base_url, Duration::from_secs(5))
        .generate(catalog.get("daraz-pk").unwrap())
        .await
        .unwrap();

    assert_eq!(generation, Generation::Generated(expected));

    let seen = stub.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1, "exactly one provider call");
    let (auth, request) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(request["model"], "gpt-test");
    assert_eq!(request["response_format"]["type"], "json_object");
    let prompt = request["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Pakistan (PK)"));

    stub.handle.stop(true).await;
}

#[actix_web::test]
async fn structurally_invalid_answer_falls_back() {
    let mut broken = provider_copy("daraz-pk");
    broken.faqs.truncate(3);
    let stub = spawn_stub(
        StatusCode::OK,
        completion(&serde_json::to_string(&broken).unwrap()),
        Duration::ZERO,
    );
    let catalog = sample_catalog();
    let entry = catalog.get("daraz-pk").unwrap();

    let generation = generator(&stub.base_url, Duration::from_secs(5))
        .generate(entry)
        .await
        .unwrap();

    match generation {
        Generation::Fallback {
            content,
            reason: FallbackReason::InvalidContent(_),
        } => assert_eq!(content, fallback_content(entry)),
        other => panic!("expected invalid-content fallback, got {other:?}"),
    }
    stub.handle.stop(true).await;
}

#[actix_web::test]
async fn unparseable_or_empty_answer_falls_back() {
    let catalog = sample_catalog();
    let entry = catalog.get("amazon-com").unwrap();

    let stub = spawn_stub(StatusCode::OK, completion("Sure! Here is your copy:"), Duration::ZERO);
    let generation = generator(&stub.base_url, Duration::from_secs(5))
        .generate(entry)
        .await
        .unwrap();
    assert!(matches!(
        generation,
        Generation::Fallback { reason: FallbackReason::InvalidContent(_), .. }
    ));
    stub.handle.stop(true).await;

    let stub = spawn_stub(StatusCode::OK, json!({ "choices": [] }).to_string(), Duration::ZERO);
    let generation = generator(&stub.base_url, Duration::from_secs(5))
        .generate(entry)
        .await
        .unwrap();
    assert!(matches!(
        generation,
        Generation::Fallback { reason: FallbackReason::Provider(ref msg), .. } if msg.contains("empty")
    ));
    stub.handle.stop(true).await;
}

#[actix_web::test]
async fn provider_errors_fall_back() {
    let catalog = sample_catalog();
    let entry = catalog.get("google-play-us").unwrap();

    let stub = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": { "message": "model overloaded", "type": "server_error" } }).to_string(),
        Duration::ZERO,
    );
    let generation = generator(&stub.base_url, Duration::from_secs(5))
        .generate(entry)
        .await
        .unwrap();
    assert!(matches!(
        generation,
        Generation::Fallback { reason: FallbackReason::Provider(ref msg), .. }
            if msg.contains("500") && msg.contains("model overloaded")
    ));
    stub.handle.stop(true).await;

    let stub = spawn_stub(StatusCode::TOO_MANY_REQUESTS, "{}".into(), Duration::ZERO);
    let generation = generator(&stub.base_url, Duration::from_secs(5))
        .generate(entry)
        .await
        .unwrap();
    assert!(matches!(
        generation,
        Generation::Fallback { reason: FallbackReason::Provider(ref msg), .. } if msg.contains("rate limited")
    ));
    stub.handle.stop(true).await;
}

#[actix_web::test]
async fn slow_provider_times_out_into_fallback() {
    let catalog = sample_catalog();
    let entry = catalog.get("amazon-com").unwrap();
    let stub = spawn_stub(
        StatusCode::OK,
        completion(&serde_json::to_string(&fallback_content(entry)).unwrap()),
        Duration::from_secs(3),
    );

    let generation = generator(&stub.base_url, Duration::from_millis(200))
        .generate(entry)
        .await
        .unwrap();

    assert!(matches!(
        generation,
        Generation::Fallback { reason: FallbackReason::Provider(ref msg), .. } if msg.contains("timed out")
    ));
    stub.handle.stop(false).await;
}

#[actix_web::test]
async fn unreachable_provider_falls_back() {
    let catalog = sample_catalog();
    let entry = catalog.get("talabat-qatar").unwrap();

    // Grab a free port and release it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let generation = generator(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2))
        .generate(entry)
        .await
        .unwrap();

    assert!(generation.is_fallback());
    assert_eq!(generation.into_content(), fallback_content(entry));
}
