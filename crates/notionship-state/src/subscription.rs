//! Document change subscriptions.

use chrono::{DateTime, Utc};
use notionship_core::{Document, Row, RowId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// An event published by an editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutlineEvent {
    /// The document changed.
    Changed {
        revision: u64,
        rows: Vec<Row>,
        timestamp: DateTime<Utc>,
    },
    /// Input focus should move to a row.
    Focus {
        row_id: RowId,
        timestamp: DateTime<Utc>,
    },
}

impl OutlineEvent {
    /// A change event carrying the full document.
    pub fn changed(revision: u64, document: &Document) -> Self {
        OutlineEvent::Changed {
            revision,
            rows: document.rows().to_vec(),
            timestamp: Utc::now(),
        }
    }

    /// A focus event.
    pub fn focus(row_id: RowId) -> Self {
        OutlineEvent::Focus {
            row_id,
            timestamp: Utc::now(),
        }
    }
}

/// Fan-out of session events to any number of subscribers.
pub struct SubscriptionManager {
    sender: broadcast::Sender<OutlineEvent>,
}

impl SubscriptionManager {
    /// Create a manager buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<OutlineEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Without subscribers the event is dropped.
    pub fn publish(&self, event: OutlineEvent) {
        let _ = self.sender.send(event);
    }

    /// Get the number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new(256)
    }
}
