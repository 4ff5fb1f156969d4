//! Integration tests for the streaming adapter and wire mapping

mod common;

use std::time::Duration;

use futures::StreamExt;
use kodegen_headless_cli::{
    HeadlessEngine, SessionId, SessionMode, SessionParams, StreamEvent, SubscriptionKey, ToolKind,
    WireMessage,
};
use kodegen_headless_cli::manager::COMPLETED_MESSAGE;
use serde_json::json;

fn id(text: &str) -> SessionId {
    SessionId::parse(text).unwrap()
}

#[tokio::test]
async fn test_plain_text_identity_latches_once() {
    let sandbox = common::Sandbox::new();
    let body = format!(
        "echo starting\necho 'session {}'\necho 'also {}'",
        common::SESSION_A,
        common::SESSION_B
    );
    let engine = sandbox.engine(ToolKind::Claude, &body);

    let events: Vec<StreamEvent> = engine
        .subscribe(SessionMode::Create, SessionParams::new(ToolKind::Claude, "go"))
        .await
        .unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(
        events,
        [
            StreamEvent::Output("starting".into()),
            StreamEvent::SessionIdentified(id(common::SESSION_A)),
            StreamEvent::Output(format!("session {}", common::SESSION_A)),
            StreamEvent::Output(format!("also {}", common::SESSION_B)),
            StreamEvent::Completed(COMPLETED_MESSAGE.into()),
        ]
    );
}

#[tokio::test]
async fn test_json_identity_from_codex() {
    let sandbox = common::Sandbox::new();
    let line = format!(r#"{{"session_id":"{}","msg":"ok"}}"#, common::SESSION_B);
    let engine = sandbox.engine(ToolKind::Codex, &format!("echo '{line}'"));

    let mut subscription = engine
        .subscribe(SessionMode::Create, SessionParams::new(ToolKind::Codex, "go"))
        .await
        .unwrap();
    assert_eq!(
        subscription.key(),
        SubscriptionKey::new(ToolKind::Codex, SessionMode::Create)
    );

    assert_eq!(
        subscription.next_event().await,
        Some(StreamEvent::SessionIdentified(id(common::SESSION_B)))
    );
    assert_eq!(subscription.next_event().await, Some(StreamEvent::Output(line)));
    assert!(matches!(subscription.next_event().await, Some(StreamEvent::Completed(_))));
    assert!(subscription.is_closed());
    assert_eq!(subscription.next_event().await, None);
}

#[tokio::test]
async fn test_exactly_one_terminal_event() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, "echo out\necho err >&2\nexit 9");

    let events: Vec<StreamEvent> = engine
        .subscribe(SessionMode::Create, SessionParams::new(ToolKind::Claude, "go"))
        .await
        .unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert_eq!(
        events.last(),
        Some(&StreamEvent::Failed("claude exited with code 9".into()))
    );
    assert!(events.contains(&StreamEvent::Output("out".into())));
    assert!(events.contains(&StreamEvent::ErrorOutput("err".into())));
}

#[tokio::test]
async fn test_resume_announces_supplied_identity_first() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, &format!("echo 'other {}'", common::SESSION_A));

    let events: Vec<StreamEvent> = engine
        .subscribe(
            SessionMode::Resume,
            SessionParams::new(ToolKind::Claude, "more").session_id(common::SESSION_C),
        )
        .await
        .unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(
        events,
        [
            StreamEvent::SessionIdentified(id(common::SESSION_C)),
            StreamEvent::Output(format!("other {}", common::SESSION_A)),
            StreamEvent::Completed(COMPLETED_MESSAGE.into()),
        ]
    );
}

#[tokio::test]
async fn test_wire_messages() {
    let sandbox = common::Sandbox::new();
    let body = format!("echo 'id {}'\necho note >&2", common::SESSION_A);
    let engine = sandbox.engine(ToolKind::Claude, &body);

    let messages: Vec<WireMessage> = engine
        .stream_payload(
            SubscriptionKey::new(ToolKind::Claude, SessionMode::Create),
            json!({ "prompt": "hi", "cli": "claude" }),
        )
        .collect()
        .await;

    assert_eq!(
        messages.first(),
        Some(&WireMessage {
            event: "claude:session:started".into(),
            payload: json!({ "message": "claude session starting..." }),
        })
    );
    assert_eq!(
        messages.last(),
        Some(&WireMessage {
            event: "claude:session:complete".into(),
            payload: json!({ "message": COMPLETED_MESSAGE }),
        })
    );
    assert!(messages.last().is_some_and(WireMessage::is_terminal));

    let expected = [
        WireMessage {
            event: "claude:session:id".into(),
            payload: json!({ "sessionId": common::SESSION_A }),
        },
        WireMessage {
            event: "claude:session:output".into(),
            payload: json!({ "data": format!("id {}", common::SESSION_A) }),
        },
        WireMessage {
            event: "claude:session:error:output".into(),
            payload: json!({ "data": "note" }),
        },
    ];
    for message in &expected {
        assert!(messages.contains(message), "missing {message:?}");
    }
    assert_eq!(messages.len(), 5);
}

#[tokio::test]
async fn test_wire_resume_and_failure() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Codex, "exit 4");

    let messages: Vec<WireMessage> = engine
        .stream_payload(
            SubscriptionKey::new(ToolKind::Codex, SessionMode::Resume),
            json!({ "prompt": "hi", "cli": "codex", "sessionId": common::SESSION_C }),
        )
        .collect()
        .await;

    let events: Vec<&str> = messages.iter().map(|m| m.event.as_str()).collect();
    assert_eq!(
        events,
        ["codex:session:started", "codex:session:id", "codex:session:error"]
    );
    assert_eq!(messages[0].payload, json!({ "message": "Resuming codex session..." }));
    assert_eq!(messages[2].payload, json!({ "error": "codex exited with code 4" }));
}

#[tokio::test]
async fn test_wire_rejection_before_spawn() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Codex, "echo never");

    let messages: Vec<WireMessage> = engine
        .stream_payload(
            SubscriptionKey::new(ToolKind::Codex, SessionMode::Resume),
            json!({ "prompt": "hi", "cli": "codex", "sessionId": "12345" }),
        )
        .collect()
        .await;

    assert_eq!(
        messages,
        [WireMessage {
            event: "codex:session:error".into(),
            payload: json!({ "error": "Invalid session ID format (must be a valid UUID)" }),
        }]
    );
    assert_eq!(engine.availability().preflight_runs(), 0);
}

#[tokio::test]
async fn test_wire_prefix_follows_channel_not_payload_cli() {
    let sandbox = common::Sandbox::new();
    let codex = sandbox.fake_cli("codex", &format!("echo 'thread {}'", common::SESSION_B));
    let engine = HeadlessEngine::new(
        sandbox.options().program(ToolKind::Codex, codex).build(),
    );
    let channel = SubscriptionKey::new(ToolKind::Claude, SessionMode::Create);

    // Rejected while decoding
    let messages: Vec<WireMessage> = engine
        .stream_payload(channel, json!({ "cli": "codex" }))
        .collect()
        .await;
    let events: Vec<&str> = messages.iter().map(|m| m.event.as_str()).collect();
    assert_eq!(events, ["claude:session:error"]);

    // Rejected by validation, after the payload picked codex
    let messages: Vec<WireMessage> = engine
        .stream_payload(
            channel,
            json!({ "cli": "codex", "prompt": "hi", "workingDir": "/nonexistent-dir" }),
        )
        .collect()
        .await;
    let events: Vec<&str> = messages.iter().map(|m| m.event.as_str()).collect();
    assert_eq!(events, ["claude:session:error"]);
    assert_eq!(engine.availability().preflight_runs(), 0);

    // Accepted: codex runs, the channel keeps its name
    let messages: Vec<WireMessage> = engine
        .stream_payload(channel, json!({ "cli": "codex", "prompt": "hi" }))
        .collect()
        .await;
    assert!(
        messages.iter().all(|m| m.event.starts_with("claude:session:")),
        "{messages:?}"
    );
    assert_eq!(messages[0].payload, json!({ "message": "codex session starting..." }));
    assert!(messages.contains(&WireMessage {
        event: "claude:session:id".into(),
        payload: json!({ "sessionId": common::SESSION_B }),
    }));
    assert_eq!(
        messages.last().map(|m| m.event.as_str()),
        Some("claude:session:complete")
    );
}

#[tokio::test]
async fn test_dropped_subscriber_does_not_stop_child() {
    let sandbox = common::Sandbox::new();
    let body = format!("sleep 1\ntouch '{}'", sandbox.path("finished").display());
    let engine = sandbox.engine(ToolKind::Claude, &body);

    let subscription = engine
        .subscribe(SessionMode::Create, SessionParams::new(ToolKind::Claude, "go"))
        .await
        .unwrap();
    drop(subscription);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(sandbox.exists("finished"));
}

#[test]
fn test_subscription_key_names() {
    let key = SubscriptionKey::new(ToolKind::Codex, SessionMode::Resume);
    assert_eq!(key.prefix(), "codex:session");
    assert_eq!(key.request_event(), "codex:session:resume");
    assert_eq!(key.started_message(), "Resuming codex session...");

    let key = SubscriptionKey::new(ToolKind::Claude, SessionMode::Create);
    assert_eq!(key.request_event(), "claude:session:create");
    assert_eq!(
        WireMessage::from_event(key, &StreamEvent::ErrorOutput("x".into())).event,
        "claude:session:error:output"
    );
}
