//! Analytics sink seam. Every user action produces an event name and a small
//! attribute map; where those records go is up to the host.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use shared::{domain::SessionId, protocol::AnalyticsEvent};
use tracing::info;

pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: &AnalyticsEvent);
}

/// Writes each event as a structured `tracing` record.
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn track(&self, event: &AnalyticsEvent) {
        let payload = Value::Object(event.payload.clone());
        info!(
            target: "ether::analytics",
            event = %event.name,
            session = %event.session_id.0,
            payload = %payload,
            "event tracked"
        );
    }
}

/// Keeps every event in memory; cheap to clone, all clones share the log.
#[derive(Clone, Default)]
pub struct MemoryAnalyticsSink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl MemoryAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.name.clone()).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name == name).count()
    }

    pub fn last(&self, name: &str) -> Option<AnalyticsEvent> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|e| e.name == name)
            .cloned()
    }
}

impl AnalyticsSink for MemoryAnalyticsSink {
    fn track(&self, event: &AnalyticsEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Stamps events with the owning session before handing them to the sink.
#[derive(Clone)]
pub struct Tracker {
    session_id: SessionId,
    sink: Arc<dyn AnalyticsSink>,
}

impl Tracker {
    pub fn new(session_id: SessionId, sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { session_id, sink }
    }

    pub fn track(&self, name: &str, payload: Value) {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };

        self.sink.track(&AnalyticsEvent {
            name: name.to_string(),
            payload,
            session_id: self.session_id,
            recorded_at: Utc::now(),
        });
    }
}
