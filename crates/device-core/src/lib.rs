//! Register-level peripheral device models for system-bus emulation.
//!
//! Each device exposes a fixed-size register window; the owning emulator's
//! bus dispatcher routes every load and store inside that window here, and
//! the model computes the correct observable value or side effect without
//! executing any real hardware logic. Register semantics are what is
//! modeled: writable, read-only, clear-on-write, and derived bits, plus
//! state transitions such as a Go bit marking a transfer complete. Actual
//! data transfer, timing, and bus arbitration are not.
//!
//! Every access is a bounded synchronous computation over in-memory state.
//! Device instances are independent values with no shared state; each is
//! driven by at most one bus-dispatch context at a time.

/// Host-facing bus access and lifecycle contracts.
pub mod device;
pub use device::{AccessDirection, AccessWidth, DeviceLifecycle, MmioDevice};

/// Unrecoverable guest-access fault taxonomy.
pub mod fault;
pub use fault::AccessFault;

/// Soft diagnostic channel for tolerated decode problems.
pub mod diag;
pub use diag::{AccessDiagnostic, DiagnosticLog, DiagnosticSink};

/// Declarative register decode tables and bit-level write policies.
pub mod regmap;
pub use regmap::{BitPolicy, ReadOp, RegisterDef, RegisterMap, UnmappedPolicy, WriteOp};

/// Versioned migration snapshots of guest-visible device state.
pub mod snapshot;
pub use snapshot::{DeviceSnapshot, SnapshotError, SnapshotField, SnapshotVersion};

/// Register-level models of the individual peripheral devices.
pub mod devices;
pub use devices::cache::{
    CacheController, CacheControllerConfig, AUX_CTRL_RESET, CACHE_DEVICE, CACHE_ID,
    CACHE_WINDOW_BYTES, DEFAULT_CACHE_TYPE,
};
pub use devices::sflash::{
    FlashController, COMMAND_GO, COMMAND_RESET, COMMAND_WRITE_MASK, FLASH_DEVICE,
    FLASH_WINDOW_BYTES, RX_COMPARE_FORCED, RX_COMPARE_WRITE_MASK, STATUS_CLEAR_ON_WRITE,
    STATUS_READ_ONLY, STATUS_READY, STATUS_RESET,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
