//! Store change notifications.
//!
//! Every effective mutation emits exactly one [`StoreEvent`] to each
//! subscriber over a bounded crossbeam channel. Emission never blocks: a
//! full buffer drops the event for that subscriber and bumps a counter, and
//! a disconnected subscriber is pruned.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use oracle_types::EntityKind;
use serde::{Deserialize, Serialize};

/// Per-subscriber buffer size
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// What changed in the store.
///
/// Tagged enum for clean JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A model was added and became current
    ModelAdded { model_id: String },

    ModelUpdated { model_id: String },

    /// A model was removed; carries the current model after the fallback
    ModelDeleted {
        model_id: String,
        current_model_id: Option<String>,
    },

    CurrentModelChanged { model_id: Option<String> },

    EntityAdded {
        model_id: String,
        kind: EntityKind,
        entity_id: String,
    },

    EntityUpdated {
        model_id: String,
        kind: EntityKind,
        entity_id: String,
    },

    EntityDeleted {
        model_id: String,
        kind: EntityKind,
        entity_id: String,
    },
}

impl StoreEvent {
    pub fn event_type_str(&self) -> &'static str {
        match self {
            StoreEvent::ModelAdded { .. } => "model_added",
            StoreEvent::ModelUpdated { .. } => "model_updated",
            StoreEvent::ModelDeleted { .. } => "model_deleted",
            StoreEvent::CurrentModelChanged { .. } => "current_model_changed",
            StoreEvent::EntityAdded { .. } => "entity_added",
            StoreEvent::EntityUpdated { .. } => "entity_updated",
            StoreEvent::EntityDeleted { .. } => "entity_deleted",
        }
    }
}

/// Emitter statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Deliveries that reached a subscriber buffer
    pub delivered: u64,
    /// Deliveries dropped because a buffer was full
    pub dropped: u64,
}

/// Fan-out of store events to any number of subscribers
#[derive(Debug)]
pub struct StoreEmitter {
    subscribers: Vec<Sender<StoreEvent>>,
    buffer_size: usize,
    stats: EmitterStats,
}

impl StoreEmitter {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            buffer_size: buffer_size.max(1),
            stats: EmitterStats::default(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (sender, receiver) = bounded(self.buffer_size);
        self.subscribers.push(sender);
        receiver
    }

    /// Deliver to every live subscriber - never blocks
    pub fn emit(&mut self, event: StoreEvent) {
        tracing::trace!(event = event.event_type_str(), "store event");
        let stats = &mut self.stats;
        self.subscribers
            .retain(|sender| match sender.try_send(event.clone()) {
                Ok(()) => {
                    stats.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    stats.dropped += 1;
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }
}

impl Default for StoreEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}
