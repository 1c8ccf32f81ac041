//! Versioned binary schema of the telemetry region
//!
//! A layout is a declarative table of typed, named fields. Byte offsets
//! are computed once at construction from the producer's packing rules
//! (4-byte packing: every field aligns to `min(natural_align, 4)`), and
//! the computed totals are asserted against the declared region sizes.
//!
//! Two layout families exist across the protocol generations:
//!
//! - version 5: a header (`version`, `bufferIndex`) followed by three
//!   identical slots, strings embedded as fixed 256-byte NUL-terminated
//!   UTF-8 fields;
//! - version 3: a header (`version` only) followed by a single flat
//!   record whose string fields are i32 byte lengths, the UTF-16LE text
//!   itself appended back-to-back after the fixed record.

/// Capacity of every fixed embedded string field, in bytes
pub const MAX_STRING_BYTES: usize = 256;

/// Producer packing: no field aligns wider than this
const PACK: usize = 4;

/// Declared slot size of the version 5 layout
const V5_SLOT_LEN: usize = 5084;
/// Declared region size of the version 5 layout
const V5_REGION_LEN: usize = 15260;
/// Declared fixed-record size of the version 3 layout
const V3_RECORD_LEN: usize = 32;
/// Trailing string table reserve of the version 3 layout
const V3_TRAILING_RESERVE: usize = 1024;
/// Declared region size of the version 3 layout
const V3_REGION_LEN: usize = 1060;

/// Type tag of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 4-byte little-endian IEEE-754 single
    F32,
    /// 4-byte little-endian signed integer
    I32,
    /// 1-byte boolean, any non-zero value is true
    Bool,
    /// Fixed-capacity NUL-terminated UTF-8 string embedded in the record
    FixedString {
        /// Field capacity in bytes
        capacity: usize,
    },
    /// 4-byte little-endian byte length; the UTF-16LE text lives in the
    /// trailing string table, consumed in field declaration order
    TrailingString,
}

impl FieldKind {
    /// Width of the field inside the fixed record, in bytes
    pub fn width(&self) -> usize {
        match self {
            FieldKind::F32 | FieldKind::I32 | FieldKind::TrailingString => 4,
            FieldKind::Bool => 1,
            FieldKind::FixedString { capacity } => *capacity,
        }
    }

    /// Alignment of the field under the producer's packing rules
    pub fn align(&self) -> usize {
        match self {
            FieldKind::F32 | FieldKind::I32 | FieldKind::TrailingString => PACK,
            FieldKind::Bool | FieldKind::FixedString { .. } => 1,
        }
    }
}

/// One named, typed field of the record table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Published property name of the field
    pub name: &'static str,
    /// Type tag
    pub kind: FieldKind,
}

const fn f32_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::F32,
    }
}

const fn i32_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::I32,
    }
}

const fn bool_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Bool,
    }
}

const fn str_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::FixedString {
            capacity: MAX_STRING_BYTES,
        },
    }
}

const fn trailing_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::TrailingString,
    }
}

/// A field with its computed record-relative byte offset
#[derive(Debug, Clone, Copy)]
pub struct RecordField {
    /// The declared field
    pub spec: FieldSpec,
    /// Byte offset from the start of the record
    pub offset: usize,
}

/// Ordered field table with computed offsets and total size
#[derive(Debug, Clone)]
pub struct RecordLayout {
    fields: Vec<RecordField>,
    len: usize,
}

impl RecordLayout {
    fn new(specs: &[FieldSpec]) -> Self {
        let mut cursor = 0usize;
        let mut fields = Vec::with_capacity(specs.len());
        for spec in specs {
            cursor = align_up(cursor, spec.kind.align());
            fields.push(RecordField {
                spec: *spec,
                offset: cursor,
            });
            cursor += spec.kind.width();
        }
        Self {
            fields,
            len: align_up(cursor, PACK),
        }
    }

    /// Total size of the fixed record in bytes, including tail padding
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the record declares no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Record-relative offset of the named field, if declared
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|field| field.spec.name == name)
            .map(|field| field.offset)
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

/// How records are arranged inside the region after the version field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionArrangement {
    /// Selector field picks one of several identical slots
    TripleBuffered {
        /// Absolute offset of the slot selector field
        selector_offset: usize,
        /// Absolute offset of slot 0
        slots_offset: usize,
        /// Number of slots
        slot_count: usize,
    },
    /// One flat record followed by the trailing string table
    FlatTrailing {
        /// Absolute offset of the record
        record_offset: usize,
        /// Bytes reserved for the trailing string table
        trailing_reserve: usize,
    },
}

/// Complete versioned description of the region
#[derive(Debug, Clone)]
pub struct SnapshotLayout {
    version: i32,
    arrangement: RegionArrangement,
    record: RecordLayout,
    region_len: usize,
}

impl SnapshotLayout {
    /// Layout for the given protocol version, if this build knows it
    pub fn for_version(version: i32) -> Option<Self> {
        match version {
            3 => Some(Self::version_3()),
            5 => Some(Self::version_5()),
            _ => None,
        }
    }

    /// Version 5: triple-buffered, fixed embedded strings
    pub fn version_5() -> Self {
        let record = RecordLayout::new(V5_SLOT_FIELDS);
        assert_eq!(record.len(), V5_SLOT_LEN);
        let arrangement = RegionArrangement::TripleBuffered {
            selector_offset: 4,
            slots_offset: 8,
            slot_count: 3,
        };
        let region_len = 8 + 3 * record.len();
        assert_eq!(region_len, V5_REGION_LEN);
        Self {
            version: 5,
            arrangement,
            record,
            region_len,
        }
    }

    /// Version 3: flat record with trailing UTF-16LE strings
    pub fn version_3() -> Self {
        let record = RecordLayout::new(V3_RECORD_FIELDS);
        assert_eq!(record.len(), V3_RECORD_LEN);
        let arrangement = RegionArrangement::FlatTrailing {
            record_offset: 4,
            trailing_reserve: V3_TRAILING_RESERVE,
        };
        let region_len = 4 + record.len() + V3_TRAILING_RESERVE;
        assert_eq!(region_len, V3_REGION_LEN);
        Self {
            version: 3,
            arrangement,
            record,
            region_len,
        }
    }

    /// Protocol version this layout describes
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Total region size in bytes
    pub fn region_len(&self) -> usize {
        self.region_len
    }

    /// Field table of one record/slot
    pub fn record(&self) -> &RecordLayout {
        &self.record
    }

    /// Arrangement of records inside the region
    pub fn arrangement(&self) -> &RegionArrangement {
        &self.arrangement
    }

    /// Absolute offset of the slot with the given index, if the
    /// arrangement has slots and the index names one
    pub fn slot_base(&self, index: usize) -> Option<usize> {
        match self.arrangement {
            RegionArrangement::TripleBuffered {
                slots_offset,
                slot_count,
                ..
            } if index < slot_count => Some(slots_offset + index * self.record.len()),
            _ => None,
        }
    }
}

/// Version 5 slot fields, in producer declaration order
const V5_SLOT_FIELDS: &[FieldSpec] = &[
    i32_field("tickCount"),
    f32_field("racingWheelStrength"),
    f32_field("racingWheelMaxForce"),
    f32_field("racingWheelAutoTorque"),
    i32_field("racingWheelAlgorithm"),
    str_field("racingWheelAlgorithmName"),
    bool_field("racingWheelAlgorithmSoftLimiterIsEnabled"),
    str_field("racingWheelAlgorithmSoftLimiterName"),
    str_field("racingWheelAlgorithmSoftLimiterValue"),
    f32_field("racingWheelAlgorithmSetting0"),
    f32_field("racingWheelAlgorithmSetting1"),
    f32_field("racingWheelAlgorithmSetting2"),
    f32_field("racingWheelAlgorithmSetting3"),
    str_field("racingWheelAlgorithmSettingName0"),
    str_field("racingWheelAlgorithmSettingName1"),
    str_field("racingWheelAlgorithmSettingName2"),
    str_field("racingWheelAlgorithmSettingName3"),
    str_field("racingWheelAlgorithmSettingValue0"),
    str_field("racingWheelAlgorithmSettingValue1"),
    str_field("racingWheelAlgorithmSettingValue2"),
    str_field("racingWheelAlgorithmSettingValue3"),
    f32_field("racingWheelOutputTorque"),
    bool_field("racingWheelOutputTorqueIsClipping"),
    bool_field("racingWheelCrashProtectionIsActive"),
    bool_field("racingWheelCurbProtectionIsActive"),
    bool_field("racingWheelFadingIsActive"),
    str_field("steeringEffectsCalibrationFileName"),
    f32_field("steeringEffectsUndersteerMinThreshold"),
    f32_field("steeringEffectsUndersteerMaxThreshold"),
    str_field("steeringEffectsUndersteerVibrationPattern"),
    f32_field("steeringEffectsUndersteerVibrationStrength"),
    f32_field("steeringEffectsUndersteerVibrationMinFrequency"),
    f32_field("steeringEffectsUndersteerVibrationMaxFrequency"),
    f32_field("steeringEffectsUndersteerVibrationCurve"),
    str_field("steeringEffectsUndersteerForceDirection"),
    f32_field("steeringEffectsUndersteerForceStrength"),
    f32_field("steeringEffectsUndersteerForceCurve"),
    f32_field("steeringEffectsUndersteerPedalVibrationMinFrequency"),
    f32_field("steeringEffectsUndersteerPedalVibrationMaxFrequency"),
    f32_field("steeringEffectsUndersteerPedalVibrationCurve"),
    f32_field("steeringEffectsUndersteerEffect"),
    f32_field("steeringEffectsOversteerMinThreshold"),
    f32_field("steeringEffectsOversteerMaxThreshold"),
    str_field("steeringEffectsOversteerVibrationPattern"),
    f32_field("steeringEffectsOversteerVibrationStrength"),
    f32_field("steeringEffectsOversteerVibrationMinFrequency"),
    f32_field("steeringEffectsOversteerVibrationMaxFrequency"),
    f32_field("steeringEffectsOversteerVibrationCurve"),
    str_field("steeringEffectsOversteerForceDirection"),
    f32_field("steeringEffectsOversteerForceStrength"),
    f32_field("steeringEffectsOversteerForceCurve"),
    f32_field("steeringEffectsOversteerPedalVibrationMinFrequency"),
    f32_field("steeringEffectsOversteerPedalVibrationMaxFrequency"),
    f32_field("steeringEffectsOversteerPedalVibrationCurve"),
    f32_field("steeringEffectsOversteerEffect"),
    f32_field("steeringEffectsSeatOfPantsMinThreshold"),
    f32_field("steeringEffectsSeatOfPantsMaxThreshold"),
    str_field("steeringEffectsSeatOfPantsAlgorithm"),
    str_field("steeringEffectsSeatOfPantsVibrationPattern"),
    f32_field("steeringEffectsSeatOfPantsVibrationStrength"),
    f32_field("steeringEffectsSeatOfPantsVibrationMinFrequency"),
    f32_field("steeringEffectsSeatOfPantsVibrationMaxFrequency"),
    f32_field("steeringEffectsSeatOfPantsVibrationCurve"),
    str_field("steeringEffectsSeatOfPantsForceDirection"),
    f32_field("steeringEffectsSeatOfPantsForceStrength"),
    f32_field("steeringEffectsSeatOfPantsForceCurve"),
    f32_field("steeringEffectsSeatOfPantsPedalVibrationMinFrequency"),
    f32_field("steeringEffectsSeatOfPantsPedalVibrationMaxFrequency"),
    f32_field("steeringEffectsSeatOfPantsPedalVibrationCurve"),
    f32_field("steeringEffectsSeatOfPantsEffect"),
    f32_field("steeringEffectsSkidSlip"),
    f32_field("pedalsClutchFrequency"),
    f32_field("pedalsClutchAmplitude"),
    f32_field("pedalsBrakeFrequency"),
    f32_field("pedalsBrakeAmplitude"),
    f32_field("pedalsThrottleFrequency"),
    f32_field("pedalsThrottleAmplitude"),
];

/// Version 3 fixed-record fields, in producer declaration order
const V3_RECORD_FIELDS: &[FieldSpec] = &[
    i32_field("tickCount"),
    f32_field("racingWheelStrength"),
    f32_field("racingWheelMaxForce"),
    f32_field("racingWheelOutputTorque"),
    bool_field("racingWheelOutputTorqueIsClipping"),
    i32_field("racingWheelAlgorithm"),
    trailing_field("racingWheelAlgorithmName"),
    trailing_field("steeringEffectsCalibrationFileName"),
];
