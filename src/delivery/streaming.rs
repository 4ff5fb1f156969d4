//! Streaming adapter: forward each event as soon as it is produced
//!
//! A [`Subscription`] yields at most one `SessionIdentified`, any number of
//! output events and exactly one terminal event, after which it is closed.
//! Dropping a subscription does not stop the session.

use futures::Stream;
use tokio::sync::mpsc;

use crate::types::events::StreamEvent;

use super::wire::{SubscriptionKey, WireMessage};

/// One subscriber's view of a session
#[derive(Debug)]
pub struct Subscription {
    key: SubscriptionKey,
    events: Option<mpsc::UnboundedReceiver<StreamEvent>>,
    identified: bool,
}

impl Subscription {
    pub(crate) fn new(key: SubscriptionKey, events: mpsc::UnboundedReceiver<StreamEvent>) -> Self {
        Self {
            key,
            events: Some(events),
            identified: false,
        }
    }

    /// Channel this subscription is keyed by
    #[must_use]
    pub fn key(&self) -> SubscriptionKey {
        self.key
    }

    /// Whether the terminal event has been delivered
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.events.is_none()
    }

    /// Next event in production order; `None` once closed
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            let events = self.events.as_mut()?;
            let Some(event) = events.recv().await else {
                self.events = None;
                log::warn!("{} closed before a terminal event", self.key.prefix());
                return None;
            };

            match &event {
                StreamEvent::SessionIdentified(_) if self.identified => continue,
                StreamEvent::SessionIdentified(_) => self.identified = true,
                event if event.is_terminal() => self.events = None,
                _ => {}
            }
            return Some(event);
        }
    }

    /// Turn the subscription into a stream of events
    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send {
        let mut subscription = self;
        async_stream::stream! {
            while let Some(event) = subscription.next_event().await {
                yield event;
            }
        }
    }

    /// Turn the subscription into wire messages on `channel`, starting with the
    /// `started` announcement
    pub fn into_wire_stream(self, channel: SubscriptionKey) -> impl Stream<Item = WireMessage> + Send {
        let tool = self.key.tool;
        let mut subscription = self;
        async_stream::stream! {
            yield WireMessage::started(channel, tool);
            while let Some(event) = subscription.next_event().await {
                yield WireMessage::from_event(channel, &event);
            }
        }
    }
}
