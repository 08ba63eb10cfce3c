//! Versioned migration snapshots of guest-visible device state.
//!
//! A snapshot flattens the registers named by the device's documented field
//! order into an ordered list, tagged with the device type and a schema
//! version, so a snapshot taken from one instance repopulates a freshly
//! constructed instance of the same device type bit for bit.
//! Construction-time identifiers are not captured.

use thiserror::Error;

/// Stable snapshot wire-version identifiers.
///
/// Wire formats carrying an unknown version fail to decode, so a value of
/// this type always names a schema this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts a wire value to a known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }

    /// Wire value of this version.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// One named register value captured in device field order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SnapshotField {
    /// Register name as declared by the device.
    pub name: String,
    /// Captured 32-bit value.
    pub value: u32,
}

/// Ordered, versioned capture of one device's guest-visible registers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceSnapshot {
    /// Device-type tag the snapshot was taken from.
    pub device: String,
    /// Snapshot schema version.
    pub version: SnapshotVersion,
    /// Captured registers in the device's declared order.
    pub fields: Vec<SnapshotField>,
}

impl DeviceSnapshot {
    /// Captures `values` for `device` under the declared `names`, at the
    /// current schema version.
    #[must_use]
    pub fn capture<const N: usize>(
        device: &'static str,
        names: &[&'static str; N],
        values: [u32; N],
    ) -> Self {
        Self {
            device: device.to_owned(),
            version: SnapshotVersion::V1,
            fields: names
                .iter()
                .zip(values)
                .map(|(&name, value)| SnapshotField {
                    name: name.to_owned(),
                    value,
                })
                .collect(),
        }
    }

    /// Looks up a captured field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value)
    }

    /// Validates the header and unpacks values in the order given by
    /// `names`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the snapshot was taken from a
    /// different device type, carries the wrong number of fields, or a
    /// field name does not match the declared order.
    pub fn unpack<const N: usize>(
        &self,
        device: &'static str,
        names: &[&'static str; N],
    ) -> Result<[u32; N], SnapshotError> {
        if self.device != device {
            return Err(SnapshotError::DeviceMismatch {
                expected: device,
                found: self.device.clone(),
            });
        }
        if self.fields.len() != N {
            return Err(SnapshotError::FieldCount {
                device,
                expected: N,
                found: self.fields.len(),
            });
        }
        for (index, (field, &expected)) in self.fields.iter().zip(names).enumerate() {
            if field.name != expected {
                return Err(SnapshotError::FieldMismatch {
                    device,
                    index,
                    expected,
                    found: field.name.clone(),
                });
            }
        }
        Ok(std::array::from_fn(|index| self.fields[index].value))
    }
}

/// Snapshot restore failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot was captured from a different device type.
    #[error("snapshot from device {found:?} cannot restore a {expected:?} instance")]
    DeviceMismatch {
        /// Device tag of the restoring instance.
        expected: &'static str,
        /// Device tag recorded in the snapshot.
        found: String,
    },
    /// The snapshot carries the wrong number of fields.
    #[error("{device}: snapshot carries {found} fields, expected {expected}")]
    FieldCount {
        /// Device tag of the restoring instance.
        device: &'static str,
        /// Number of fields the device declares.
        expected: usize,
        /// Number of fields the snapshot carries.
        found: usize,
    },
    /// A field name does not match the declared order.
    #[error("{device}: snapshot field {index} is {found:?}, expected {expected:?}")]
    FieldMismatch {
        /// Device tag of the restoring instance.
        device: &'static str,
        /// Position of the mismatching field.
        index: usize,
        /// Name the device declares at this position.
        expected: &'static str,
        /// Name the snapshot carries at this position.
        found: String,
    },
}
