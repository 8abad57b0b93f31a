//! Event bridge between the engine and the orchestrator
//!
//! Engine-originated events are published once and fanned out to long-lived
//! topic subscriptions.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use crate::domain::capture::{KeyCaptureComplete, KeyCaptureUpdate};
use crate::domain::pipeline::{PipelineProgress, PipelineResult};

/// Default number of events buffered per subscriber
pub const DEFAULT_CAPACITY: usize = 64;

/// Event pushed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum EngineEvent {
    PipelineProgress(PipelineProgress),
    PipelineComplete(PipelineResult),
    PipelineCancelled,
    ShortcutTriggered { id: String },
    KeyCaptureUpdate(KeyCaptureUpdate),
    KeyCaptureComplete(KeyCaptureComplete),
}

/// Subscription topic, one per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Progress,
    Complete,
    Cancelled,
    ShortcutTriggered,
    CaptureUpdate,
    CaptureComplete,
}

impl Topic {
    pub const PIPELINE: &'static [Topic] = &[Topic::Progress, Topic::Complete, Topic::Cancelled];
    pub const CAPTURE: &'static [Topic] = &[Topic::CaptureUpdate, Topic::CaptureComplete];
    pub const ALL: &'static [Topic] = &[
        Topic::Progress,
        Topic::Complete,
        Topic::Cancelled,
        Topic::ShortcutTriggered,
        Topic::CaptureUpdate,
        Topic::CaptureComplete,
    ];
}

impl EngineEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::PipelineProgress(_) => Topic::Progress,
            Self::PipelineComplete(_) => Topic::Complete,
            Self::PipelineCancelled => Topic::Cancelled,
            Self::ShortcutTriggered { .. } => Topic::ShortcutTriggered,
            Self::KeyCaptureUpdate(_) => Topic::CaptureUpdate,
            Self::KeyCaptureComplete(_) => Topic::CaptureComplete,
        }
    }
}

/// Typed publish/subscribe channel
#[derive(Debug, Clone)]
pub struct EventBridge {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBridge {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Returns how many subscriptions will see it.
    pub fn publish(&self, event: EngineEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to a set of topics
    pub fn subscribe(&self, topics: &[Topic]) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            topics: topics.to_vec(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// One item read from a subscription
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Event(EngineEvent),
    /// The subscriber fell behind and this many events were overwritten
    Lagged(u64),
}

/// Receiving end of a topic subscription
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<EngineEvent>,
    topics: Vec<Topic>,
}

impl Subscription {
    /// Wait for the next event on a subscribed topic, logging and skipping
    /// over any gap.
    ///
    /// Returns `None` once every publisher is gone.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        loop {
            match self.next().await? {
                Delivery::Event(event) => return Some(event),
                Delivery::Lagged(skipped) => {
                    warn!(skipped, "Event subscriber lagged, events dropped");
                }
            }
        }
    }

    /// Like [`Subscription::recv`], but reports a gap to the caller so
    /// state that depended on a dropped event can be recovered.
    pub async fn next(&mut self) -> Option<Delivery> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.topics.contains(&event.topic()) => {
                    return Some(Delivery::Event(event))
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    return Some(Delivery::Lagged(skipped))
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::recv`]
    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.topics.contains(&event.topic()) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscriber lagged, events dropped");
                }
                Err(_) => return None,
            }
        }
    }
}
