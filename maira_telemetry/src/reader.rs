//! Pure decode of a region byte image into a snapshot

use crate::codec::{decode_fixed_capacity, decode_trailing_utf16};
use crate::error::DecodeError;
use crate::layout::{FieldKind, RegionArrangement, SnapshotLayout};
use crate::snapshot::{TelemetrySnapshot, TelemetryValue};

/// Decodes region bytes into [`TelemetrySnapshot`]s for one layout
///
/// The decode is pure: identical input bytes always produce an identical
/// snapshot, and no state is carried between reads.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    layout: SnapshotLayout,
}

impl SnapshotReader {
    /// Reader for the given layout
    pub fn new(layout: SnapshotLayout) -> Self {
        Self { layout }
    }

    /// Layout this reader decodes
    pub fn layout(&self) -> &SnapshotLayout {
        &self.layout
    }

    /// Decode one region byte image.
    ///
    /// Validates the version field before anything else, dispatches the
    /// slot selector when the layout has one, then decodes every field of
    /// the chosen record in declaration order.
    pub fn read(&self, bytes: &[u8]) -> Result<TelemetrySnapshot, DecodeError> {
        if bytes.len() < self.layout.region_len() {
            return Err(DecodeError::Truncated {
                needed: self.layout.region_len(),
                got: bytes.len(),
            });
        }

        // Version field is always the leading i32
        let found = read_i32(bytes, 0)?;
        if found != self.layout.version() {
            return Err(DecodeError::VersionMismatch {
                expected: self.layout.version(),
                found,
            });
        }

        match *self.layout.arrangement() {
            RegionArrangement::TripleBuffered {
                selector_offset,
                slot_count,
                ..
            } => {
                let selector = read_i32(bytes, selector_offset)?;
                let base = usize::try_from(selector)
                    .ok()
                    .and_then(|index| self.layout.slot_base(index))
                    .ok_or(DecodeError::SlotOutOfRange {
                        index: selector,
                        slots: slot_count,
                    })?;
                self.decode_record(bytes, base, None)
            }
            RegionArrangement::FlatTrailing { record_offset, .. } => {
                let trailing_start = record_offset + self.layout.record().len();
                self.decode_record(bytes, record_offset, Some(trailing_start))
            }
        }
    }

    fn decode_record(
        &self,
        bytes: &[u8],
        base: usize,
        trailing_start: Option<usize>,
    ) -> Result<TelemetrySnapshot, DecodeError> {
        let record = self.layout.record();
        let mut trailing_cursor = trailing_start.unwrap_or(0);
        let mut fields = Vec::with_capacity(record.fields().len());

        for field in record.fields() {
            let offset = base + field.offset;
            let value = match field.spec.kind {
                FieldKind::I32 => TelemetryValue::I32(read_i32(bytes, offset)?),
                FieldKind::F32 => {
                    TelemetryValue::F32(f32::from_le_bytes(read_array(bytes, offset)?))
                }
                FieldKind::Bool => {
                    let raw = bytes.get(offset).ok_or(DecodeError::Truncated {
                        needed: offset + 1,
                        got: bytes.len(),
                    })?;
                    TelemetryValue::Bool(*raw != 0)
                }
                FieldKind::FixedString { capacity } => {
                    let raw =
                        bytes
                            .get(offset..offset + capacity)
                            .ok_or(DecodeError::Truncated {
                                needed: offset + capacity,
                                got: bytes.len(),
                            })?;
                    TelemetryValue::Text(decode_fixed_capacity(raw, capacity))
                }
                FieldKind::TrailingString => {
                    let declared = read_i32(bytes, offset)?;
                    // A negative declared length can never fit; it surfaces
                    // as an overrun of the supplied bytes.
                    let len = usize::try_from(declared).unwrap_or(usize::MAX);
                    if len == 0 {
                        TelemetryValue::Text(String::new())
                    } else {
                        let end = trailing_cursor.saturating_add(len);
                        let raw =
                            bytes
                                .get(trailing_cursor..end)
                                .ok_or(DecodeError::Truncated {
                                    needed: end,
                                    got: bytes.len(),
                                })?;
                        trailing_cursor = end;
                        TelemetryValue::Text(decode_trailing_utf16(raw))
                    }
                }
            };
            fields.push((field.spec.name, value));
        }

        Ok(TelemetrySnapshot::new(self.layout.version(), fields))
    }
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    let raw = bytes
        .get(offset..offset + N)
        .ok_or(DecodeError::Truncated {
            needed: offset + N,
            got: bytes.len(),
        })?;
    let mut out = [0u8; N];
    out.copy_from_slice(raw);
    Ok(out)
}

fn read_i32(bytes: &[u8], offset: usize) -> Result<i32, DecodeError> {
    Ok(i32::from_le_bytes(read_array(bytes, offset)?))
}
