pub mod client;

use async_trait::async_trait;
use thiserror::Error;

/// Binary door state as reported to ThingSpeak: 1 = unlocked, 0 = locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Locked,
    Unlocked,
}

impl DoorState {
    pub fn field_value(self) -> u8 {
        match self {
            DoorState::Locked => 0,
            DoorState::Unlocked => 1,
        }
    }
}

/// Keyword patterns checked in priority order. "Locked" is a substring of
/// "Unlocked", so the unlocked pattern must come first for a line matching
/// both to classify as unlocked.
const STATE_PATTERNS: &[(&str, DoorState)] = &[
    ("Unlocked", DoorState::Unlocked),
    ("Locked", DoorState::Locked),
];

/// Classify a sensor line by substring containment. Lines matching no
/// pattern are noise and yield `None`.
pub fn classify(line: &str) -> Option<DoorState> {
    STATE_PATTERNS
        .iter()
        .find(|(keyword, _)| line.contains(keyword))
        .map(|&(_, state)| state)
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Sink for classified door states.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateSink: Send + Sync {
    /// Report one door state. Exactly one payload is sent per call; failures
    /// are returned to the caller, never retried here.
    async fn report(&self, state: DoorState) -> Result<(), TelemetryError>;
}
