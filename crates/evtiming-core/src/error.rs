//! Error types for event timing

use thiserror::Error;

use crate::EventTag;

/// Event timing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimingError {
    // Tracking refused
    #[error("Performance entry reporter is unavailable")]
    ReporterUnavailable,

    #[error("Unsupported event type: {0}")]
    UnsupportedEvent(String),

    // Contract violations
    #[error("Processing end set before processing start for event {0}")]
    ProcessingEndBeforeStart(EventTag),

    #[error("Event {0} reported without processing timestamps")]
    MissingProcessingTime(EventTag),
}

/// Result type for event timing operations
pub type TimingResult<T> = Result<T, TimingError>;
