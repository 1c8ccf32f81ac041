//! One reading session: region + reader + liveness + last snapshot

use crate::error::{TelemetryError, TelemetryResult};
use crate::layout::SnapshotLayout;
use crate::liveness::LivenessTracker;
use crate::properties::PropertySink;
use crate::reader::SnapshotReader;
use crate::region::RegionHandle;
use crate::settings::OverlaySettings;
use crate::snapshot::{TelemetrySnapshot, TelemetryValue};
use std::path::PathBuf;
use std::time::Instant;
use tracing::error;

/// Complete ingestion state for one session.
///
/// Single-owner, single-thread: the host invokes [`poll`](Self::poll) at
/// its own cadence and each poll is a complete synchronous unit of work.
/// Any fatal error latches the fault state; recovery requires a new
/// session.
#[derive(Debug)]
pub struct TelemetrySession {
    reader: SnapshotReader,
    region: RegionHandle,
    liveness: LivenessTracker,
    settings: OverlaySettings,
    snapshot: TelemetrySnapshot,
    observed_version: i32,
    region_buf: Vec<u8>,
}

impl TelemetrySession {
    /// Session reading the region at `region_path` with the given layout
    pub fn new(
        layout: SnapshotLayout,
        region_path: impl Into<PathBuf>,
        settings: OverlaySettings,
    ) -> Self {
        let snapshot = TelemetrySnapshot::defaults(&layout);
        let region = RegionHandle::new(region_path, layout.region_len());
        Self {
            reader: SnapshotReader::new(layout),
            region,
            liveness: LivenessTracker::new(),
            settings,
            snapshot,
            observed_version: 0,
            region_buf: Vec::new(),
        }
    }

    /// One ingestion tick: attach if needed, bulk-copy the region, decode
    /// it, and update the liveness state.
    ///
    /// Once faulted this is a no-op; the first fatal error is returned to
    /// the caller and every published value stays frozen afterwards.
    pub fn poll(&mut self, now: Instant) -> TelemetryResult<()> {
        if self.liveness.is_faulted() {
            return Ok(());
        }
        match self.poll_inner(now) {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "telemetry session faulted");
                self.liveness.latch_fault();
                Err(e)
            }
        }
    }

    fn poll_inner(&mut self, now: Instant) -> TelemetryResult<()> {
        if !self.region.try_ensure_attached(now)? {
            return Ok(());
        }
        self.region.read_snapshot_bytes(&mut self.region_buf)?;

        match self.reader.read(&self.region_buf) {
            Ok(snapshot) => {
                self.observed_version = snapshot.version();
                self.liveness.observe(now, snapshot.tick_count());
                self.snapshot = snapshot;
                Ok(())
            }
            Err(e) => {
                if let crate::error::DecodeError::VersionMismatch { found, .. } = e {
                    self.observed_version = found;
                }
                Err(TelemetryError::Decode(e))
            }
        }
    }

    /// Publish every named value of this session into `sink`: the last
    /// decoded snapshot (or its defaults), the connection signals, the
    /// version diagnostic, and the overlay preferences
    pub fn publish(&self, sink: &mut dyn PropertySink) {
        sink.set("version", TelemetryValue::Text(self.version_diagnostic()));
        sink.set("connected", TelemetryValue::Bool(self.is_connected()));
        sink.set("faulted", TelemetryValue::Bool(self.is_faulted()));

        for (name, value) in self.snapshot.fields() {
            sink.set(name, value.clone());
        }

        sink.set(
            "overlaysShowInPractice",
            TelemetryValue::Bool(self.settings.show_in_practice),
        );
        sink.set(
            "overlaysShowInQualifying",
            TelemetryValue::Bool(self.settings.show_in_qualifying),
        );
        sink.set(
            "overlaysShowInRace",
            TelemetryValue::Bool(self.settings.show_in_race),
        );
        sink.set(
            "overlaysShowInTestDrive",
            TelemetryValue::Bool(self.settings.show_in_test_drive),
        );
    }

    /// `"<expected>,<observed>"` — observed is 0 before any read and the
    /// rejected value after a version mismatch
    pub fn version_diagnostic(&self) -> String {
        format!("{},{}", self.reader.layout().version(), self.observed_version)
    }

    /// True while the producer's tick counter is advancing
    pub fn is_connected(&self) -> bool {
        self.liveness.is_connected()
    }

    /// True once a fatal error has latched; terminal for the session
    pub fn is_faulted(&self) -> bool {
        self.liveness.is_faulted()
    }

    /// True once the region mapping is held
    pub fn is_attached(&self) -> bool {
        self.region.is_attached()
    }

    /// Last successfully decoded snapshot, or layout defaults
    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    /// Overlay display preferences of this session
    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Mutable overlay preferences, for the settings UI boundary
    pub fn settings_mut(&mut self) -> &mut OverlaySettings {
        &mut self.settings
    }
}
