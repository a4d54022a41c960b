// End-to-end job flow: prompt resolution, session start, greeting order,
// and event observation, exercised against a mocked prompt endpoint and a
// scripted realtime model.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voxbot::agent::{run_job, JobContext};
use voxbot::config::Config;
use voxbot::errors::PromptError;
use voxbot::prompt::GREETING_INSTRUCTIONS;
use voxbot::realtime::events::{ContentPart, ConversationItem, Role, SessionEvent};
use voxbot::realtime::room::Room;
use voxbot::realtime::testing::{RecordedCall, ScriptedModel, StaticTransport};

fn job_for_room(name: &str) -> JobContext {
    JobContext::new(Room::new(name, Arc::new(StaticTransport)))
}

fn config_with_prompt_service(base_url: String) -> Config {
    let mut cfg = Config::default();
    cfg.prompt.base_url = Some(base_url);
    cfg.prompt.retry_attempts = 0;
    cfg
}

#[tokio::test]
async fn fetched_prompt_becomes_persona_instructions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/product-conversations/room-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"systemPrompt": "You are a tester."}
        })))
        .mount(&server)
        .await;

    let cfg = config_with_prompt_service(server.uri());
    let model = Arc::new(ScriptedModel::default());

    run_job(job_for_room("room-42"), &cfg, model.clone())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(
        calls[0],
        RecordedCall::Start("You are a tester.".to_string())
    );
}

#[tokio::test]
async fn greeting_is_requested_exactly_once_after_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"systemPrompt": "Interview."}
        })))
        .mount(&server)
        .await;

    let cfg = config_with_prompt_service(server.uri());
    let model = Arc::new(ScriptedModel::default());

    // A user turn is already queued before the session starts; the greeting
    // request must still come first.
    let mut item = ConversationItem::new(Role::User, "hello?");
    item.content.push(ContentPart::Text {
        text: "hello?".into(),
    });
    model.push_event(SessionEvent::ConversationItemAdded(item));

    run_job(job_for_room("room-7"), &cfg, model.clone())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(
        calls,
        vec![
            RecordedCall::Start("Interview.".to_string()),
            RecordedCall::GenerateReply(GREETING_INSTRUCTIONS.to_string()),
            RecordedCall::Close,
        ]
    );
    let greetings = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::GenerateReply(_)))
        .count();
    assert_eq!(greetings, 1);
}

#[tokio::test]
async fn prompt_fetch_failure_aborts_before_session_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cfg = config_with_prompt_service(server.uri());
    let model = Arc::new(ScriptedModel::default());

    let err = run_job(job_for_room("room-42"), &cfg, model.clone())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PromptError>(),
        Some(PromptError::BadStatus { status: 500 })
    ));
    // The model session was never started.
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn missing_prompt_field_aborts_before_session_start() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {}
        })))
        .mount(&server)
        .await;

    let cfg = config_with_prompt_service(server.uri());
    let model = Arc::new(ScriptedModel::default());

    let err = run_job(job_for_room("room-42"), &cfg, model.clone())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PromptError>(),
        Some(PromptError::MissingField { .. })
    ));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn builtin_script_used_without_prompt_service() {
    let cfg = Config::default();
    let model = Arc::new(ScriptedModel::default());

    run_job(job_for_room("room-42"), &cfg, model.clone())
        .await
        .unwrap();

    match &model.calls()[0] {
        RecordedCall::Start(instructions) => {
            assert!(instructions.contains("product manager"));
            assert!(instructions.contains("Questions to cover"));
        }
        other => panic!("unexpected first call: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_failure_with_fallback_runs_builtin_interview() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut cfg = config_with_prompt_service(server.uri());
    cfg.prompt.fallback_to_builtin = true;
    let model = Arc::new(ScriptedModel::default());

    run_job(job_for_room("room-42"), &cfg, model.clone())
        .await
        .unwrap();

    match &model.calls()[0] {
        RecordedCall::Start(instructions) => {
            assert!(instructions.contains("product manager"));
        }
        other => panic!("unexpected first call: {other:?}"),
    }
}
