//! Delivery adapters
//!
//! Every session produces one ordered event channel. Two adapters consume it:
//!
//! - [`blocking`] - waits for the terminal event and returns a [`SessionSnapshot`]
//! - [`streaming`] - forwards each event as it arrives to one [`Subscription`]
//!
//! [`wire`] maps events and snapshots onto the front-end message shapes.

pub mod blocking;
pub mod streaming;
pub mod wire;

use tokio::sync::mpsc;

use crate::manager::session::SessionSnapshot;
use crate::types::events::StreamEvent;
use crate::types::request::SessionMode;
use crate::types::tool::ToolKind;

pub use streaming::Subscription;
pub use wire::{SessionPayload, SessionResponse, SubscriptionKey, WireMessage};

/// Receiving end of a running session's event channel
#[derive(Debug)]
pub struct SessionHandle {
    tool: ToolKind,
    mode: SessionMode,
    events: mpsc::UnboundedReceiver<StreamEvent>,
}

impl SessionHandle {
    pub(crate) fn new(
        tool: ToolKind,
        mode: SessionMode,
        events: mpsc::UnboundedReceiver<StreamEvent>,
    ) -> Self {
        Self { tool, mode, events }
    }

    /// Tool running the session
    #[must_use]
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Whether the session was created or resumed
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Wait for the terminal event and return the accumulated snapshot
    pub async fn wait(self) -> SessionSnapshot {
        blocking::collect(self).await
    }

    /// Convert into a streaming subscription
    #[must_use]
    pub fn into_subscription(self) -> Subscription {
        Subscription::new(SubscriptionKey::new(self.tool, self.mode), self.events)
    }

    pub(crate) fn into_parts(self) -> (ToolKind, mpsc::UnboundedReceiver<StreamEvent>) {
        (self.tool, self.events)
    }
}
