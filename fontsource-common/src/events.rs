//! Event types for the fontsource event system
//!
//! Settings mutations are announced on an [`EventBus`] so that whatever
//! renders the settings (a panel, the CLI, a style writer) can refresh
//! without the pipeline knowing about it.

use crate::types::FontSlot;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Settings change notifications
///
/// Emitted after the change has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FontsourceEvent {
    /// Font imported (or re-imported, replacing the previous record)
    FontImported {
        id: String,
        family: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Font deleted along with its stylesheet
    FontRemoved {
        id: String,
        family: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active flag flipped
    ///
    /// Turning a font off also purges it from every slot, so a
    /// `FontToggled { active: false }` implies the CSS variables changed.
    FontToggled {
        id: String,
        active: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A slot's precedence list changed (add, remove, re-prioritize)
    SlotChanged {
        slot: FontSlot,
        /// Projected `font-family` value after the change
        font_family: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active styles were written out to a stylesheet
    StylesApplied {
        path: String,
        blocks: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Broadcast bus for [`FontsourceEvent`]
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FontsourceEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<FontsourceEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: FontsourceEvent,
    ) -> Result<usize, broadcast::error::SendError<FontsourceEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: FontsourceEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit_lossy(FontsourceEvent::FontToggled {
            id: "inter".to_string(),
            active: true,
            timestamp: chrono::Utc::now(),
        });

        match rx.recv().await.unwrap() {
            FontsourceEvent::FontToggled { id, active, .. } => {
                assert_eq!(id, "inter");
                assert!(active);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let result = bus.emit(FontsourceEvent::FontRemoved {
            id: "inter".to_string(),
            family: "Inter".to_string(),
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err());
        assert_eq!(bus.capacity(), 10);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = FontsourceEvent::SlotChanged {
            slot: FontSlot::Monospace,
            font_family: "'Fira Code'".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SlotChanged");
        assert_eq!(json["slot"], "monospace");
    }
}
