//! # MAIRA Telemetry Monitor
//!
//! Console tool that opens one telemetry session against the producer's
//! shared memory region, polls it at a fixed cadence, and prints every
//! property that changed since the previous poll. Useful for checking
//! what a dashboard would see without running one.

use clap::Parser;
use maira_telemetry::{
    DEFAULT_REGION_PATH, OverlaySettings, PropertySink, SnapshotLayout, TelemetrySession,
    TelemetryValue,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Monitor the MAIRA telemetry region")]
struct Args {
    /// Region file published by the producer
    #[arg(long, default_value = DEFAULT_REGION_PATH)]
    region: PathBuf,

    /// Protocol version to decode (3 or 5)
    #[arg(long, default_value_t = 5)]
    protocol: i32,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Overlay settings file, loaded at start and saved when the session
    /// ends on a fault. Interrupting the loop (Ctrl-C) skips the save;
    /// this monitor never edits the settings, so nothing is lost.
    #[arg(long)]
    settings: Option<PathBuf>,
}

/// Sink that prints a property only when its value changed
#[derive(Default)]
struct ChangePrinter {
    seen: BTreeMap<String, TelemetryValue>,
}

impl PropertySink for ChangePrinter {
    fn set(&mut self, name: &str, value: TelemetryValue) {
        if self.seen.get(name) != Some(&value) {
            println!("{name} = {value}");
            self.seen.insert(name.to_string(), value);
        }
    }
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt().compact().init();

    let args = Args::parse();
    let Some(layout) = SnapshotLayout::for_version(args.protocol) else {
        error!(protocol = args.protocol, "no layout for this protocol version");
        return std::process::ExitCode::FAILURE;
    };

    let settings = match &args.settings {
        Some(path) => OverlaySettings::load(path),
        None => OverlaySettings::default(),
    };

    info!(
        region = %args.region.display(),
        protocol = args.protocol,
        "monitoring telemetry region"
    );

    let mut session = TelemetrySession::new(layout, &args.region, settings);
    let mut printer = ChangePrinter::default();
    let interval = Duration::from_millis(args.interval_ms);

    loop {
        let result = session.poll(Instant::now());
        session.publish(&mut printer);

        if let Err(e) = result {
            error!(error = %e, "session faulted, stopping");
            if let Some(path) = &args.settings
                && let Err(e) = session.settings().save(path)
            {
                error!(error = %e, "failed to save settings");
            }
            return std::process::ExitCode::FAILURE;
        }

        std::thread::sleep(interval);
    }
}
