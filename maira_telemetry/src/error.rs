//! Error types for telemetry ingestion

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding a region byte image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Region reports a protocol version this build cannot interpret
    #[error("telemetry version mismatch: region reports {found}, this build expects {expected}")]
    VersionMismatch {
        /// Version this build was compiled for
        expected: i32,
        /// Version found in the region bytes
        found: i32,
    },

    /// Region bytes are shorter than the declared layout requires
    #[error("telemetry region truncated: need {needed} bytes, have {got}")]
    Truncated {
        /// Bytes the layout requires
        needed: usize,
        /// Bytes actually supplied
        got: usize,
    },

    /// Slot selector does not name any declared slot
    #[error("slot selector {index} is outside the {slots} declared slots")]
    SlotOutOfRange {
        /// Selector value read from the region
        index: i32,
        /// Number of slots the layout declares
        slots: usize,
    },
}

/// Errors that can occur during a telemetry session
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Attaching to the region failed for a reason other than "not found"
    #[error("failed to attach telemetry region {}: {source}", .path.display())]
    Attach {
        /// Region path that failed to open
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// A read was requested before the region was attached
    #[error("telemetry region is not attached")]
    NotAttached,

    /// Decoding the region bytes failed
    #[error("telemetry decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// IO error outside the attach path (settings persistence)
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Settings record could not be serialized
    #[error("settings serialization error: {source}")]
    Json {
        /// Source JSON error
        #[from]
        source: serde_json::Error,
    },
}

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;
