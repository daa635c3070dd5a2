//! Orchestrator against a real gateway served in-process.

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, Router, routing::post};
use cadet_cli::{
    AdvisoryChannel, Availability, AvailabilityState, ChannelError, GatewayClient, Orchestrator,
    Presenter, Role,
};
use cadet_core::{AdvisoryRequest, LimitSettings, SourceChannel};
use cadet_gateway::{AdvisoryService, AppState, OpenAiResponsesClient, create_router};
use cadet_knowledge::{KnowledgeSource, KnowledgeStore, VERIFICATION_RULE};
use serde_json::{Value, json};

#[derive(Default)]
struct Transcript {
    messages: Vec<(Role, String)>,
    hints: Vec<String>,
}

impl Presenter for Transcript {
    fn on_message(&mut self, role: Role, text: &str) {
        self.messages.push((role, text.to_string()));
    }

    fn on_availability_changed(&mut self, state: &AvailabilityState) {
        self.hints.push(state.hint.clone());
    }

    fn on_continuation_available(&mut self, _available: bool) {}
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Gateway with or without a backend at `backend_url`; returns the chat URL.
async fn spawn_gateway(backend_url: Option<String>) -> String {
    let provider = backend_url.map(|url| {
        Arc::new(
            OpenAiResponsesClient::new(url, "sk-test", "gpt-5-mini", Duration::from_secs(5))
                .unwrap(),
        ) as Arc<dyn cadet_gateway::Provider>
    });
    let state = AppState::new(AdvisoryService::new(provider, LimitSettings::default()));
    format!("{}/api/chat", serve(create_router(state)).await)
}

fn knowledge_file() -> (tempfile::TempDir, Arc<KnowledgeStore>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.json");
    std::fs::write(
        &path,
        json!({
            "items": [
                { "topic": "rotc", "keywords": ["rotc", "scholarship"], "answer": "Compare 5 ROTC programs." },
                { "topic": "academy", "keywords": ["academy", "nomination"], "answer": "Start nomination paperwork early." }
            ]
        })
        .to_string(),
    )
    .unwrap();
    let store = KnowledgeStore::new(vec![
        KnowledgeSource::parse(dir.path().join("missing.json").to_str().unwrap()),
        KnowledgeSource::parse(path.to_str().unwrap()),
    ]);
    (dir, Arc::new(store))
}

fn client(url: &str) -> Arc<GatewayClient> {
    Arc::new(GatewayClient::new(url, Duration::from_secs(5)).unwrap())
}

#[tokio::test]
async fn test_probe_sees_route_as_online() {
    let url = spawn_gateway(None).await;
    let (_dir, knowledge) = knowledge_file();
    let mut orch = Orchestrator::new(
        client(&url),
        knowledge,
        LimitSettings::default(),
        Transcript::default(),
    );

    orch.start().await;
    assert!(orch.availability().is_online());
    assert_eq!(orch.presenter().hints, vec!["checking…", "AI available"]);
}

#[tokio::test]
async fn test_unconfigured_gateway_falls_back_and_latches() {
    let url = spawn_gateway(None).await;
    let channel = client(&url);

    let err = channel
        .advise(&AdvisoryRequest::answer("hi"))
        .await
        .unwrap_err();
    assert_eq!(err, ChannelError::Configuration);

    let (_dir, knowledge) = knowledge_file();
    let mut orch = Orchestrator::new(
        channel,
        knowledge,
        LimitSettings::default(),
        Transcript::default(),
    );

    let reply = orch
        .submit_question("Tell me about rotc scholarships")
        .await
        .unwrap();
    assert_eq!(reply.source_channel, SourceChannel::Local);
    assert!(reply.text.contains("Compare 5 ROTC programs."));
    assert!(reply.text.ends_with(VERIFICATION_RULE));
    assert!(!reply.text.contains("Start nomination paperwork early."));
    assert!(orch.is_not_configured());
    assert_eq!(orch.availability().status, Availability::Offline);
}

#[tokio::test]
async fn test_unreachable_gateway_falls_back() {
    let (_dir, knowledge) = knowledge_file();
    let mut orch = Orchestrator::new(
        client("http://127.0.0.1:1/api/chat"),
        knowledge,
        LimitSettings::default(),
        Transcript::default(),
    );

    orch.start().await;
    assert_eq!(orch.availability().status, Availability::Offline);

    let reply = orch.submit_question("academy nomination").await.unwrap();
    assert_eq!(reply.source_channel, SourceChannel::Local);
    assert!(reply.text.contains("Start nomination paperwork early."));
    assert!(!orch.is_not_configured());
}

#[tokio::test]
async fn test_remote_answer_and_continuation_through_gateway() {
    let backend = Router::new().route(
        "/v1/responses",
        post(|Json(request): Json<Value>| async move {
            let user = request["input"][1]["content"].as_str().unwrap_or_default();
            if user.contains("<<<") {
                Json(json!({ "status": "completed", "output_text": "3. Visit a campus." }))
            } else {
                Json(json!({
                    "status": "incomplete",
                    "incomplete_details": { "reason": "max_output_tokens" },
                    "output": [ { "type": "message", "content": [
                        { "type": "output_text", "text": "1. Keep grades up.\n2. Join JROTC." }
                    ] } ]
                }))
            }
        }),
    );
    let backend_url = format!("{}/v1", serve(backend).await);
    let url = spawn_gateway(Some(backend_url)).await;

    let (_dir, knowledge) = knowledge_file();
    let mut orch = Orchestrator::new(
        client(&url),
        knowledge,
        LimitSettings::default(),
        Transcript::default(),
    );

    let reply = orch.submit_question("Plan for a 9th grader").await.unwrap();
    assert_eq!(reply.source_channel, SourceChannel::Remote);
    assert!(reply.truncated);
    assert!(orch.continuation_available());

    let more = orch.request_continuation().await.unwrap();
    assert_eq!(more.text, "3. Visit a campus.");
    assert!(!orch.continuation_available());

    let assistant: Vec<_> = orch
        .presenter()
        .messages
        .iter()
        .filter(|(role, _)| *role == Role::Assistant)
        .map(|(_, text)| text.as_str())
        .collect();
    assert_eq!(
        assistant,
        vec!["1. Keep grades up.\n2. Join JROTC.", "3. Visit a campus."]
    );
}
