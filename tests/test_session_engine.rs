//! Integration tests for `HeadlessEngine` blocking sessions
//!
//! Every session runs a fake CLI script; no real `claude` or `codex` is needed.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use kodegen_headless_cli::{
    AvailabilityCache, CliProgram, ErrorKind, HeadlessEngine, HeadlessError, SessionMode,
    SessionParams, SessionStatus, ToolKind,
};
use kodegen_headless_cli::manager::COMPLETED_MESSAGE;
use serde_json::json;

const PRINT_ARGS: &str = r#"for arg in "$@"; do printf '%s\n' "$arg"; done"#;

#[tokio::test]
async fn test_create_session_collects_output() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, "echo hello");

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, "say hello"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert!(snapshot.is_success());
    assert_eq!(snapshot.output, ["hello"]);
    assert!(snapshot.errors.is_empty());
    assert_eq!(snapshot.message.as_deref(), Some(COMPLETED_MESSAGE));
    assert!(snapshot.finished_at.is_some());
    assert_eq!(engine.availability().preflight_runs(), 1);
}

#[tokio::test]
async fn test_child_receives_dialect_argv() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, PRINT_ARGS);
    let prompt = "hello $(touch pwned); touch pwned2 && echo `id`";

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, prompt).model("haiku"))
        .await
        .unwrap();

    assert_eq!(
        snapshot.output,
        [
            "-p",
            "--verbose",
            "--model",
            "haiku",
            "--permission-mode",
            "acceptEdits",
            "--output-format",
            "stream-json",
            "--",
            prompt,
        ]
    );
    assert!(!sandbox.exists("pwned"));
    assert!(!sandbox.exists("pwned2"));
}

#[tokio::test]
async fn test_resume_passes_session_id() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Codex, PRINT_ARGS);

    let snapshot = engine
        .resume_session(SessionParams::new(ToolKind::Codex, "next step").session_id(common::SESSION_C))
        .await
        .unwrap();

    assert_eq!(
        snapshot.output,
        ["exec", "resume", "--json", "--skip-git-repo-check", common::SESSION_C, "next step"]
    );
    assert_eq!(snapshot.session_id.as_ref().map(|id| id.as_str()), Some(common::SESSION_C));
}

#[tokio::test]
async fn test_runs_in_working_dir() {
    let sandbox = common::Sandbox::new();
    std::fs::create_dir(sandbox.path("project")).unwrap();
    let engine = sandbox.engine(ToolKind::Codex, "pwd");

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Codex, "where am i").working_dir(sandbox.path("project")))
        .await
        .unwrap();

    assert_eq!(snapshot.output, [sandbox.path("project").display().to_string()]);
}

#[tokio::test]
async fn test_nonzero_exit_keeps_partial_output() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, "echo partial\necho oops >&2\nexit 3");

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, "fail"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, SessionStatus::Error);
    assert_eq!(snapshot.output, ["partial"]);
    assert_eq!(snapshot.errors, ["oops"]);
    assert_eq!(snapshot.message.as_deref(), Some("claude exited with code 3"));
}

#[tokio::test]
async fn test_trailing_fragment_and_blank_lines() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, r"echo; echo '   '; printf 'a\nb'");

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, "fragments"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, SessionStatus::Completed);
    assert_eq!(snapshot.output, ["a", "b"]);
}

#[tokio::test]
async fn test_timeout_kills_process_group() {
    let sandbox = common::Sandbox::new();
    let body = format!(
        "echo started\nsleep 2\ntouch '{}'",
        sandbox.path("survived").display()
    );
    let program = sandbox.fake_cli("claude", &body);
    let engine = HeadlessEngine::new(
        sandbox
            .options()
            .session_timeout(Duration::from_millis(500))
            .program(ToolKind::Claude, program)
            .build(),
    );

    let started = Instant::now();
    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, "hang"))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert_eq!(snapshot.output, ["started"]);
    assert_eq!(snapshot.message.as_deref(), Some("Session timed out after 500ms"));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!sandbox.exists("survived"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timeout_keeps_output_read_before_deadline() {
    let sandbox = common::Sandbox::new();
    let program = sandbox.fake_cli("claude", "seq 1 200000\nexec sleep 30");
    let engine = HeadlessEngine::new(
        sandbox
            .options()
            .session_timeout(Duration::from_secs(3))
            .program(ToolKind::Claude, program)
            .build(),
    );

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, "flood"))
        .await
        .unwrap();

    assert_eq!(snapshot.status, SessionStatus::Error);
    assert_eq!(snapshot.message.as_deref(), Some("Session timed out after 3s"));
    assert_eq!(snapshot.output.len(), 200_000);
    for (expected, line) in (1..).zip(&snapshot.output) {
        assert_eq!(line, &expected.to_string());
    }
    assert_eq!(snapshot.output.last().map(String::as_str), Some("200000"));
}

#[tokio::test]
async fn test_spawn_failure_is_reported_as_event() {
    let sandbox = common::Sandbox::new();
    let availability = Arc::new(AvailabilityCache::new());
    availability.mark_available(ToolKind::Claude);
    let options = sandbox
        .options()
        .program(ToolKind::Claude, CliProgram::new("/nonexistent/claude-bin"))
        .build();
    let engine = HeadlessEngine::with_availability(options, availability);

    let snapshot = engine
        .create_session(SessionParams::new(ToolKind::Claude, "hi"))
        .await
        .unwrap();
    assert_eq!(snapshot.status, SessionStatus::Error);
    assert!(snapshot.output.is_empty());
    let message = snapshot.message.unwrap_or_default();
    assert!(message.starts_with("Failed to start claude: "), "{message}");

    let snapshot = engine
        .resume_session(SessionParams::new(ToolKind::Claude, "hi").session_id(common::SESSION_C))
        .await
        .unwrap();
    let message = snapshot.message.unwrap_or_default();
    assert!(message.starts_with("Failed to resume claude session: "), "{message}");
}

#[tokio::test]
async fn test_invalid_input_spawns_nothing() {
    let sandbox = common::Sandbox::new();
    std::fs::create_dir_all(sandbox.path("bin")).unwrap();
    let script = sandbox.path("bin/codex");
    std::fs::write(&script, format!("touch '{}'\n", sandbox.path("ran").display())).unwrap();
    let options = sandbox
        .options()
        .program(ToolKind::Codex, CliProgram::new("sh").arg(script.display().to_string()))
        .build();
    let engine = HeadlessEngine::new(options);

    let err = engine
        .resume_session(SessionParams::new(ToolKind::Codex, "hi").session_id("not-a-uuid"))
        .await
        .unwrap_err();
    assert!(matches!(err, HeadlessError::InvalidSessionId(_)));
    assert!(err.is_pre_spawn());

    let err = engine
        .create_session(SessionParams::new(ToolKind::Codex, "hi").working_dir("/"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert_eq!(engine.availability().preflight_runs(), 0);
    assert!(!sandbox.exists("ran"));
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let sandbox = common::Sandbox::new();
    let count_to = |label: &str| {
        format!(r#"i=1; while [ $i -le 200 ]; do echo "{label} $i"; i=$((i+1)); done"#)
    };
    let claude = sandbox.fake_cli("claude", &count_to("claude"));
    let codex = sandbox.fake_cli("codex", &format!("{}\nexit 1", count_to("codex")));
    let engine = HeadlessEngine::new(
        sandbox
            .options()
            .program(ToolKind::Claude, claude)
            .program(ToolKind::Codex, codex)
            .build(),
    );

    let (first, second, third) = tokio::join!(
        engine.create_session(SessionParams::new(ToolKind::Claude, "a")),
        engine.create_session(SessionParams::new(ToolKind::Codex, "b")),
        engine.create_session(SessionParams::new(ToolKind::Claude, "c")),
    );

    for (snapshot, label) in [(first.unwrap(), "claude"), (third.unwrap(), "claude")] {
        let expected: Vec<String> = (1..=200).map(|i| format!("{label} {i}")).collect();
        assert_eq!(snapshot.output, expected);
        assert_eq!(snapshot.status, SessionStatus::Completed);
    }

    let codex = second.unwrap();
    let expected: Vec<String> = (1..=200).map(|i| format!("codex {i}")).collect();
    assert_eq!(codex.output, expected);
    assert_eq!(codex.status, SessionStatus::Error);
    assert_eq!(codex.message.as_deref(), Some("codex exited with code 1"));
}

#[tokio::test]
async fn test_run_payload_response_shape() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, &format!("echo 'session {}'", common::SESSION_A));

    let response = engine
        .run_payload(SessionMode::Create, &json!({ "prompt": "hi", "cli": "claude" }))
        .await
        .unwrap();
    assert!(response.success);

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value,
        json!({
            "success": true,
            "cli": "claude",
            "sessionId": common::SESSION_A,
            "status": "completed",
            "output": [format!("session {}", common::SESSION_A)],
            "message": COMPLETED_MESSAGE,
        })
    );
}

#[tokio::test]
async fn test_run_payload_keeps_stderr_and_rejects_bad_input() {
    let sandbox = common::Sandbox::new();
    let engine = sandbox.engine(ToolKind::Claude, "echo warning >&2\nexit 5");

    let response = engine
        .run_payload(SessionMode::Create, &json!({ "prompt": "hi" }))
        .await
        .unwrap();
    assert!(!response.success);
    assert_eq!(response.status, SessionStatus::Error);
    assert_eq!(response.error, ["warning"]);
    assert_eq!(response.message, "claude exited with code 5");

    let rejected = engine
        .run_payload(SessionMode::Create, &json!({ "prompt": "hi", "cli": "gemini" }))
        .await
        .unwrap_err();
    assert_eq!(
        serde_json::to_value(&rejected).unwrap(),
        json!({ "error": "Unsupported cli 'gemini'. Supported values are: claude, codex" })
    );
}
