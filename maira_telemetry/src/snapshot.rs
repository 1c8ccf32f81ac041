//! Decoded telemetry values

use crate::layout::{FieldKind, SnapshotLayout};

/// One decoded telemetry value
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryValue {
    /// Signed integer field
    I32(i32),
    /// IEEE-754 single field
    F32(f32),
    /// Boolean flag
    Bool(bool),
    /// Text field; absent or zero-length sources decode to `""`
    Text(String),
}

impl TelemetryValue {
    /// Zero/false/empty default for a field of the given kind
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::I32 => TelemetryValue::I32(0),
            FieldKind::F32 => TelemetryValue::F32(0.0),
            FieldKind::Bool => TelemetryValue::Bool(false),
            FieldKind::FixedString { .. } | FieldKind::TrailingString => {
                TelemetryValue::Text(String::new())
            }
        }
    }
}

impl std::fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelemetryValue::I32(v) => write!(f, "{v}"),
            TelemetryValue::F32(v) => write!(f, "{v}"),
            TelemetryValue::Bool(v) => write!(f, "{v}"),
            TelemetryValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Immutable result of one successful region decode
///
/// Constructed fresh on every decode and never mutated afterwards; the
/// previous snapshot is only retained for the liveness tick comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    version: i32,
    tick_count: i32,
    fields: Vec<(&'static str, TelemetryValue)>,
}

impl TelemetrySnapshot {
    pub(crate) fn new(version: i32, fields: Vec<(&'static str, TelemetryValue)>) -> Self {
        let tick_count = fields
            .iter()
            .find_map(|(name, value)| match (*name, value) {
                ("tickCount", TelemetryValue::I32(tick)) => Some(*tick),
                _ => None,
            })
            .unwrap_or(0);
        Self {
            version,
            tick_count,
            fields,
        }
    }

    /// All-defaults snapshot for a layout, used before the first
    /// successful decode
    pub fn defaults(layout: &SnapshotLayout) -> Self {
        let fields = layout
            .record()
            .fields()
            .iter()
            .map(|field| (field.spec.name, TelemetryValue::default_for(field.spec.kind)))
            .collect();
        Self {
            version: 0,
            tick_count: 0,
            fields,
        }
    }

    /// Protocol version the region reported
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Heartbeat counter of the decoded record
    pub fn tick_count(&self) -> i32 {
        self.tick_count
    }

    /// Decoded fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &TelemetryValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Value of the named field, if the layout declares it
    pub fn get(&self, name: &str) -> Option<&TelemetryValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}
