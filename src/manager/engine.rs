//! Engine root
//!
//! [`HeadlessEngine`] owns the configuration and the availability cache and is
//! the only place sessions are started. Both delivery adapters receive the same
//! [`SessionHandle`] from [`HeadlessEngine::start`], so the spawn path exists once.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::availability::AvailabilityCache;
use crate::delivery::wire::{SessionPayload, SessionResponse, SubscriptionKey, WireMessage};
use crate::delivery::{SessionHandle, Subscription};
use crate::error::{ErrorPayload, Result};
use crate::manager::session::SessionSnapshot;
use crate::transport::subprocess::command::CommandBuilder;
use crate::transport::subprocess::supervisor::{SessionSupervisor, SupervisorSettings};
use crate::types::options::EngineOptions;
use crate::types::request::{SessionMode, SessionParams, SessionRequest};
use crate::validation;

/// Runs headless CLI sessions
///
/// Cheap to clone; clones share the availability cache.
///
/// # Example
///
/// ```no_run
/// use kodegen_headless_cli::{HeadlessEngine, SessionParams, ToolKind};
///
/// # async fn example() -> kodegen_headless_cli::Result<()> {
/// let engine = HeadlessEngine::default();
/// let snapshot = engine
///     .create_session(SessionParams::new(ToolKind::Claude, "Summarize README.md"))
///     .await?;
/// for line in &snapshot.output {
///     println!("{line}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeadlessEngine {
    options: Arc<EngineOptions>,
    availability: Arc<AvailabilityCache>,
}

impl HeadlessEngine {
    /// Create an engine with a fresh availability cache
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Self::with_availability(options, Arc::new(AvailabilityCache::new()))
    }

    /// Create an engine sharing an existing availability cache
    #[must_use]
    pub fn with_availability(options: EngineOptions, availability: Arc<AvailabilityCache>) -> Self {
        Self {
            options: Arc::new(options),
            availability,
        }
    }

    /// Engine configuration
    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Availability cache
    #[must_use]
    pub fn availability(&self) -> &Arc<AvailabilityCache> {
        &self.availability
    }

    /// Validate `params` and make sure the tool can run
    ///
    /// Validation finishes before the preflight, so invalid input never spawns
    /// anything.
    ///
    /// # Errors
    /// Returns an `InvalidInput` or `CliUnavailable` error
    pub async fn prepare(&self, params: SessionParams, mode: SessionMode) -> Result<SessionRequest> {
        let request = validation::accept(params, mode, &self.options).await?;
        self.availability
            .ensure_available(request.tool(), request.working_dir(), &self.options)
            .await?;
        Ok(request)
    }

    /// Validate, preflight and launch a session
    ///
    /// # Errors
    /// Returns an `InvalidInput` or `CliUnavailable` error; failures after
    /// that point arrive as a `Failed` event
    pub async fn start(&self, params: SessionParams, mode: SessionMode) -> Result<SessionHandle> {
        let request = self.prepare(params, mode).await?;
        Ok(self.launch(request))
    }

    /// Launch an already accepted request
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn launch(&self, request: SessionRequest) -> SessionHandle {
        let run_id = Uuid::new_v4();
        let tool = request.tool();
        let mode = request.mode();

        let command = CommandBuilder::for_request(&request)
            .build()
            .with_program(&self.options.program_for(tool));

        log::info!(
            "[{run_id}] {mode} {tool} session in {} (model: {})",
            request.working_dir().display(),
            request.model().unwrap_or("default")
        );
        log::debug!("[{run_id}] program: {}", command.program.display());

        let settings = SupervisorSettings {
            timeout: self.options.session_timeout,
            kill_grace: self.options.kill_grace,
            max_line_bytes: self.options.max_line_bytes,
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        SessionSupervisor::new(run_id, request, command, settings, events_tx).spawn();

        SessionHandle::new(tool, mode, events_rx)
    }

    // ========================================================================
    // Blocking interface
    // ========================================================================

    /// Run a new session to completion
    ///
    /// A `session_id` in `params` is ignored.
    ///
    /// # Errors
    /// Returns an error only when the request is rejected before spawn;
    /// runtime failures come back as a snapshot with status `Error`
    pub async fn create_session(&self, params: SessionParams) -> Result<SessionSnapshot> {
        Ok(self.start(params, SessionMode::Create).await?.wait().await)
    }

    /// Resume a session and run it to completion
    ///
    /// # Errors
    /// Same as [`create_session`](Self::create_session); additionally rejects a
    /// missing or non-UUID `session_id`
    pub async fn resume_session(&self, params: SessionParams) -> Result<SessionSnapshot> {
        Ok(self.start(params, SessionMode::Resume).await?.wait().await)
    }

    // ========================================================================
    // Streaming interface
    // ========================================================================

    /// Start a session and subscribe to its events
    ///
    /// # Errors
    /// Returns an error when the request is rejected before spawn
    pub async fn subscribe(&self, operation: SessionMode, params: SessionParams) -> Result<Subscription> {
        Ok(self.start(params, operation).await?.into_subscription())
    }

    // ========================================================================
    // JSON payload interface
    // ========================================================================

    /// Decode a JSON payload into parameters
    ///
    /// # Errors
    /// Returns an `InvalidInput` error for a malformed payload
    pub fn decode_payload(&self, payload: &Value) -> Result<SessionParams> {
        SessionPayload::from_value(payload, self.options.default_tool).map(SessionPayload::into_params)
    }

    /// Run a JSON payload as a blocking call
    ///
    /// # Errors
    /// Returns `{error}` when the payload is rejected before spawn
    pub async fn run_payload(
        &self,
        operation: SessionMode,
        payload: &Value,
    ) -> std::result::Result<SessionResponse, ErrorPayload> {
        let params = self.decode_payload(payload)?;
        let snapshot = self.start(params, operation).await?.wait().await;
        Ok(SessionResponse::from_snapshot(snapshot))
    }

    /// Run a JSON payload received on `channel` as a stream of wire messages
    ///
    /// The payload's `cli` defaults to the channel's tool and picks which tool
    /// runs; every message is named after `channel` regardless. Yields `started`
    /// once the request is accepted, then one message per event. A rejected
    /// request yields a single `error` message.
    pub fn stream_payload(
        &self,
        channel: SubscriptionKey,
        payload: Value,
    ) -> impl Stream<Item = WireMessage> + Send + 'static {
        let engine = self.clone();
        async_stream::stream! {
            let accepted = match SessionPayload::from_value(&payload, channel.tool) {
                Ok(payload) => engine.subscribe(channel.operation, payload.into_params()).await,
                Err(e) => Err(e),
            };

            match accepted {
                Ok(subscription) => {
                    let mut messages = std::pin::pin!(subscription.into_wire_stream(channel));
                    while let Some(message) = messages.next().await {
                        yield message;
                    }
                }
                Err(e) => {
                    log::warn!("{} rejected: {e}", channel.request_event());
                    yield WireMessage::rejected(channel, &e);
                }
            }
        }
    }
}
