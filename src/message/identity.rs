//! Session identity extraction
//!
//! The external CLIs never report their session id through a dedicated channel;
//! it shows up somewhere in their output. `claude` is scanned as plain text.
//! `codex` emits JSON lines, which are walked breadth-first, preferring fields
//! whose name says they hold the session identity.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::identifiers::SessionId;

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("UUID pattern is a valid regex")
});

static CANONICAL_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\z")
        .expect("canonical UUID pattern is a valid regex")
});

/// Field names that carry the session identity in known CLI event schemas
const IDENTITY_FIELDS: &[&str] = &[
    "session_id",
    "sessionId",
    "thread_id",
    "threadId",
    "conversation_id",
    "conversationId",
];

/// Whether `text` is exactly one canonical 8-4-4-4-12 UUID
#[must_use]
pub fn is_canonical_uuid(text: &str) -> bool {
    CANONICAL_UUID.is_match(text)
}

/// First UUID-shaped substring of `text`
#[must_use]
pub fn scan_plain(text: &str) -> Option<SessionId> {
    UUID_PATTERN
        .find(text)
        .map(|m| SessionId::from_match(m.as_str()))
}

/// Identity lookup in a parsed JSON document
///
/// A UUID under one of the known identity field names wins, searched breadth
/// first. Otherwise the first UUID in any string leaf, also breadth first.
#[must_use]
pub fn scan_json(value: &Value) -> Option<SessionId> {
    // A known field anywhere in the document beats an earlier unrelated UUID
    // leaf, so this is not a single breadth-first pass over every leaf.
    find_identity_field(value).or_else(|| find_any_leaf(value))
}

fn find_identity_field(root: &Value) -> Option<SessionId> {
    let mut queue = VecDeque::from([root]);

    while let Some(item) = queue.pop_front() {
        match item {
            Value::Object(map) => {
                for (key, value) in map {
                    if IDENTITY_FIELDS.contains(&key.as_str())
                        && let Value::String(text) = value
                        && is_canonical_uuid(text)
                    {
                        return Some(SessionId::from_match(text));
                    }
                }
                queue.extend(map.values());
            }
            Value::Array(items) => queue.extend(items),
            _ => {}
        }
    }

    None
}

fn find_any_leaf(root: &Value) -> Option<SessionId> {
    let mut queue = VecDeque::from([root]);

    while let Some(item) = queue.pop_front() {
        match item {
            Value::String(text) => {
                if let Some(id) = scan_plain(text) {
                    return Some(id);
                }
            }
            Value::Array(items) => queue.extend(items),
            Value::Object(map) => queue.extend(map.values()),
            _ => {}
        }
    }

    None
}

/// How a tool's output lines are searched for the session identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityStrategy {
    /// Scan the raw line for the UUID pattern
    PlainText,
    /// Parse the line as JSON and walk it; fall back to the plain scan
    JsonAware,
}

impl IdentityStrategy {
    /// Try to recover a session identity from one output line
    #[must_use]
    pub fn extract(self, line: &str) -> Option<SessionId> {
        match self {
            Self::PlainText => scan_plain(line),
            Self::JsonAware => serde_json::from_str::<Value>(line)
                .ok()
                .and_then(|value| scan_json(&value))
                .or_else(|| scan_plain(line)),
        }
    }
}
