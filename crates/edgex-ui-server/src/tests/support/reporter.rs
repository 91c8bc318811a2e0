//! In-memory [`HealthReporter`] for lifecycle assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use crate::health::{HealthReporter, Lifecycle};

/// Owned copy of a [`Lifecycle`] milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    Starting,
    Ready { listen: String },
    Failed(String),
    Listening(SocketAddr),
    Stopping,
}

impl From<Lifecycle<'_>> for HealthEvent {
    fn from(event: Lifecycle<'_>) -> Self {
        match event {
            Lifecycle::Starting => Self::Starting,
            Lifecycle::Ready(config) => Self::Ready {
                listen: config.listen_address(),
            },
            Lifecycle::Failed(error) => Self::Failed(error.to_string()),
            Lifecycle::Listening(address) => Self::Listening(address),
            Lifecycle::Stopping => Self::Stopping,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Milestones seen so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events.lock().expect("events lock").clone()
    }

    /// Failure message, if bootstrap reported one.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        self.events().into_iter().find_map(|event| match event {
            HealthEvent::Failed(message) => Some(message),
            _ => None,
        })
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn record(&self, event: Lifecycle<'_>) {
        self.events.lock().expect("events lock").push(event.into());
    }
}
