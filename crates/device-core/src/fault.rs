//! Unrecoverable guest-access fault taxonomy.

use thiserror::Error;

use crate::AccessDirection;

/// Faults surfaced to the bus dispatcher for accesses a device refuses to
/// complete.
///
/// A fault means the guest touched the window in a way that indicates
/// firmware misbehavior rather than routine address-space exploration. The
/// host decides whether to halt the emulated machine; the core itself never
/// terminates the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AccessFault {
    /// A load hit a register that only accepts stores.
    #[error("{device}: read from write-only register at offset {offset:#x}")]
    WriteOnlyRead {
        /// Device tag for host-side reporting.
        device: &'static str,
        /// Window-relative offset of the access.
        offset: u32,
    },
    /// A store hit a register that only accepts loads.
    #[error("{device}: write to read-only register at offset {offset:#x}")]
    ReadOnlyWrite {
        /// Device tag for host-side reporting.
        device: &'static str,
        /// Window-relative offset of the access.
        offset: u32,
    },
    /// The offset decodes to no register at all.
    #[error("{device}: {direction} at bad offset {offset:#x}")]
    BadOffset {
        /// Device tag for host-side reporting.
        device: &'static str,
        /// Direction of the refused access.
        direction: AccessDirection,
        /// Window-relative offset of the access.
        offset: u32,
    },
}

impl AccessFault {
    /// Tag of the device that refused the access.
    #[must_use]
    pub const fn device(self) -> &'static str {
        match self {
            Self::WriteOnlyRead { device, .. }
            | Self::ReadOnlyWrite { device, .. }
            | Self::BadOffset { device, .. } => device,
        }
    }

    /// Window-relative offset of the refused access.
    #[must_use]
    pub const fn offset(self) -> u32 {
        match self {
            Self::WriteOnlyRead { offset, .. }
            | Self::ReadOnlyWrite { offset, .. }
            | Self::BadOffset { offset, .. } => offset,
        }
    }

    /// Direction of the refused access.
    #[must_use]
    pub const fn direction(self) -> AccessDirection {
        match self {
            Self::WriteOnlyRead { .. } => AccessDirection::Read,
            Self::ReadOnlyWrite { .. } => AccessDirection::Write,
            Self::BadOffset { direction, .. } => direction,
        }
    }
}
