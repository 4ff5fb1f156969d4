//! Input validation
//!
//! Every check here runs before any process (preflight included) is spawned,
//! so a rejected request has no subprocess side effects.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{HeadlessError, Result};
use crate::types::identifiers::SessionId;
use crate::types::options::EngineOptions;
use crate::types::request::{SessionMode, SessionParams, SessionRequest};

/// Reject an empty prompt
///
/// # Errors
/// Returns `HeadlessError::InvalidPrompt` if `prompt` is empty
pub fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.is_empty() {
        return Err(HeadlessError::invalid_prompt(
            "Prompt is required and must be a non-empty string",
        ));
    }
    Ok(())
}

/// Require a canonical UUID session id
///
/// # Errors
/// Returns `HeadlessError::InvalidSessionId` unless `text` is exactly a UUID
pub fn validate_session_id(text: &str) -> Result<SessionId> {
    if text.is_empty() {
        return Err(HeadlessError::invalid_session_id(
            "Session ID is required and must be a string",
        ));
    }
    SessionId::parse(text)
}

/// Accept an absent model or a string model
///
/// An empty string is treated as absent.
///
/// # Errors
/// Returns `HeadlessError::InvalidModel` if `value` is present but not a string
pub fn validate_model(value: Option<&Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(model)) => Ok(normalize_model(Some(model.clone()))),
        Some(_) => Err(HeadlessError::invalid_model("Model must be a string")),
    }
}

pub(crate) fn normalize_model(model: Option<String>) -> Option<String> {
    model.filter(|m| !m.is_empty())
}

/// Resolve and check a working directory
///
/// The path is made absolute and canonical (symlinks resolved), must be an
/// existing directory, and must sit under one of `allowed_roots`. Containment
/// is compared per path component, so `/home/al` does not admit `/home/alice`.
///
/// # Errors
/// Returns `HeadlessError::InvalidWorkingDir` on any failed check
pub async fn validate_working_dir(path: &Path, allowed_roots: &[PathBuf]) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(HeadlessError::invalid_working_dir(
            "Working directory must be a non-empty string",
        ));
    }

    let resolved = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| HeadlessError::invalid_working_dir(format!("Invalid working directory: {e}")))?;

    let metadata = tokio::fs::metadata(&resolved)
        .await
        .map_err(|e| HeadlessError::invalid_working_dir(format!("Invalid working directory: {e}")))?;
    if !metadata.is_dir() {
        return Err(HeadlessError::invalid_working_dir(
            "Invalid working directory: Working directory must be a valid directory",
        ));
    }

    for root in allowed_roots {
        // Roots that do not exist cannot contain anything
        let Ok(root) = tokio::fs::canonicalize(root).await else {
            continue;
        };
        if resolved.starts_with(&root) {
            return Ok(resolved);
        }
    }

    Err(HeadlessError::invalid_working_dir(
        "Working directory must be within current working directory or home directory",
    ))
}

/// Validate raw parameters into an immutable [`SessionRequest`]
///
/// Order: prompt, session id (resume only), model, working directory. A
/// session id supplied with `SessionMode::Create` is ignored.
///
/// # Errors
/// Returns the first failing `InvalidInput` error
pub async fn accept(
    params: SessionParams,
    mode: SessionMode,
    options: &EngineOptions,
) -> Result<SessionRequest> {
    validate_prompt(&params.prompt)?;

    let session_id = match mode {
        SessionMode::Resume => Some(validate_session_id(
            params.session_id.as_deref().unwrap_or_default(),
        )?),
        SessionMode::Create => {
            if params.session_id.is_some() {
                log::debug!("Ignoring session id on a create request");
            }
            None
        }
    };

    let model = normalize_model(params.model);

    let working_dir = params
        .working_dir
        .unwrap_or_else(|| options.resolved_default_working_dir());
    let working_dir = validate_working_dir(&working_dir, &options.resolved_allowed_roots()).await?;

    Ok(SessionRequest::new(
        params.tool,
        params.prompt,
        working_dir,
        session_id,
        model,
    ))
}
