//! # MAIRA Telemetry Ingestion
//!
//! Reader for the shared memory region published by the MAIRA
//! force-feedback producer. The producer updates the region on its own
//! cycle; this crate attaches to it read-only, extracts torn-free
//! snapshots, and republishes the decoded fields to a host dashboard as
//! named values.
//!
//! ## Ingestion pipeline
//!
//! ```text
//! ┌──────────────┐   bulk copy   ┌────────────────┐   decode    ┌───────────────────┐
//! │ RegionHandle ├──────────────►│ SnapshotReader ├────────────►│ TelemetrySnapshot │
//! │ (mmap, ro)   │               │ (SnapshotLayout│             │ + LivenessTracker │
//! └──────────────┘               │  + StringCodec)│             └───────────────────┘
//!                                └────────────────┘
//! ```
//!
//! On every polling tick, [`TelemetrySession::poll`] attaches the region
//! if needed (with a 5 s backoff when the producer is not running yet),
//! copies the entire region into a local buffer in one operation, decodes
//! the live slot into an immutable snapshot, and derives the connection
//! state from the heartbeat tick counter. The single-bulk-copy discipline
//! is what keeps the slot selector and the selected slot's content in the
//! same transaction.
//!
//! ## Protocol versions
//!
//! The region format is versioned and versions are mutually incompatible.
//! A session is built for exactly one [`SnapshotLayout`]; a region
//! reporting any other version is a fatal fault. Two generations are
//! supported: version 5 (triple-buffered, fixed embedded strings) and
//! version 3 (flat record with trailing UTF-16LE strings).
//!
//! ## Fault model
//!
//! A missing region is benign and retried with backoff. Everything else —
//! attach failures, version mismatches, truncated regions — latches the
//! session-wide `faulted` flag: published values freeze at their last
//! decoded state and no further region access happens. Recovery is a new
//! session.
//!
//! ## Example
//!
//! ```rust,no_run
//! use maira_telemetry::{
//!     OverlaySettings, PropertyBag, SnapshotLayout, TelemetrySession, DEFAULT_REGION_PATH,
//! };
//! use std::time::Instant;
//!
//! # fn main() -> maira_telemetry::TelemetryResult<()> {
//! let mut session = TelemetrySession::new(
//!     SnapshotLayout::version_5(),
//!     DEFAULT_REGION_PATH,
//!     OverlaySettings::default(),
//! );
//!
//! session.poll(Instant::now())?;
//!
//! let mut properties = PropertyBag::new();
//! session.publish(&mut properties);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod layout;
pub mod liveness;
pub mod properties;
pub mod reader;
pub mod region;
pub mod session;
pub mod settings;
pub mod snapshot;

pub use error::{DecodeError, TelemetryError, TelemetryResult};
pub use layout::{FieldKind, FieldSpec, RegionArrangement, SnapshotLayout, MAX_STRING_BYTES};
pub use liveness::{LivenessState, LivenessTracker, CONNECTED_CHECK_INTERVAL};
pub use properties::{PropertyBag, PropertySink};
pub use reader::SnapshotReader;
pub use region::{RegionHandle, ATTACH_RETRY_DELAY, DEFAULT_REGION_PATH};
pub use session::TelemetrySession;
pub use settings::OverlaySettings;
pub use snapshot::{TelemetrySnapshot, TelemetryValue};

/// Initialize tracing for the embedding process
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
