//! Blocking adapter: buffer every event until the session ends

use crate::manager::session::SessionSnapshot;
use crate::types::events::StreamEvent;

use super::SessionHandle;

/// Message used if the producer vanishes without a terminal event
const PRODUCER_LOST: &str = "Session ended without a final status";

/// Drain `handle` and fold its events into a snapshot
///
/// Resolves only after `Completed` or `Failed`. Output received before a
/// failure is kept in the snapshot.
pub async fn collect(handle: SessionHandle) -> SessionSnapshot {
    let (tool, mut events) = handle.into_parts();
    let mut snapshot = SessionSnapshot::new(tool);

    while let Some(event) = events.recv().await {
        if snapshot.apply(&event) {
            return snapshot;
        }
    }

    log::warn!("{tool} event channel closed before a terminal event");
    snapshot.apply(&StreamEvent::Failed(PRODUCER_LOST.to_string()));
    snapshot
}
