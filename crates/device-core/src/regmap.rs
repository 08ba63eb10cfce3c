//! Declarative register decode tables.
//!
//! Each device type owns one static [`RegisterMap`]: a table of offset
//! ranges paired with read and write behavior over the device state `S`,
//! built once per device type. Resolving an offset is a pure lookup; all
//! access policy lives in table data rather than in control flow.

use crate::{AccessDiagnostic, AccessDirection, AccessFault, DiagnosticSink};

/// Read behavior of one decoded register range.
pub enum ReadOp<S> {
    /// Returns a fixed identification constant.
    Const(u32),
    /// Returns a stored value without side effects.
    Value(fn(&S) -> u32),
    /// Computes the value and may cache derived state back into the device.
    Effect(fn(&mut S) -> u32),
    /// Accepts the read and returns zero.
    Zero,
    /// Reading this range is a guest programming error.
    Fault,
}

/// Write behavior of one decoded register range.
pub enum WriteOp<S> {
    /// Applies the incoming value to device state.
    Store(fn(&mut S, u32)),
    /// Accepts the store and discards the value.
    Discard,
    /// Writing this range is a guest programming error.
    Fault,
}

/// One row of a device's decode table.
///
/// A `None` behavior means the direction is not decoded at all and the
/// access falls through to the map's [`UnmappedPolicy`].
pub struct RegisterDef<S> {
    /// Logical register or range name.
    pub name: &'static str,
    /// First offset (inclusive) this row decodes.
    pub start: u32,
    /// Last offset (inclusive) this row decodes.
    pub end: u32,
    /// Read behavior for the range.
    pub read: Option<ReadOp<S>>,
    /// Write behavior for the range.
    pub write: Option<WriteOp<S>>,
}

impl<S> RegisterDef<S> {
    /// Row decoding exactly one offset.
    #[must_use]
    pub const fn at(
        name: &'static str,
        offset: u32,
        read: Option<ReadOp<S>>,
        write: Option<WriteOp<S>>,
    ) -> Self {
        Self {
            name,
            start: offset,
            end: offset,
            read,
            write,
        }
    }

    /// Row decoding an inclusive offset range.
    #[must_use]
    pub const fn span(
        name: &'static str,
        start: u32,
        end: u32,
        read: Option<ReadOp<S>>,
        write: Option<WriteOp<S>>,
    ) -> Self {
        Self {
            name,
            start,
            end,
            read,
            write,
        }
    }

    /// Returns `true` when `offset` falls inside this row's range.
    #[must_use]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset <= self.end
    }
}

/// Treatment of offsets no table row decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnmappedPolicy {
    /// The access completes (reads return zero, stores vanish) and one
    /// diagnostic is reported to the sink.
    Tolerated,
    /// The access is refused with [`AccessFault::BadOffset`].
    Fatal,
}

/// Bit-level store semantics for registers mixing read-only, writable, and
/// clear-on-write bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitPolicy {
    /// Bits that keep their stored value regardless of the incoming write.
    pub read_only: u32,
    /// Bits cleared by an incoming one and held by an incoming zero.
    pub clear_on_write: u32,
}

impl BitPolicy {
    /// Merges `incoming` into `stored` under the policy masks.
    ///
    /// Bits outside both masks take the incoming value; read-only bits hold
    /// their stored value; clear-on-write bits only ever transition 1 -> 0,
    /// and only when the incoming bit is 1.
    #[must_use]
    pub const fn apply(self, stored: u32, incoming: u32) -> u32 {
        let held = self.read_only | self.clear_on_write;
        let merged = (stored & held) | (incoming & !held);
        merged & !(incoming & self.clear_on_write)
    }
}

/// Register decode table for one device type.
///
/// Rows must not overlap; lookup returns the first row whose range contains
/// the offset. Tables are small enough that a linear scan stays cheap on the
/// bus dispatch path.
pub struct RegisterMap<S: 'static> {
    device: &'static str,
    rows: &'static [RegisterDef<S>],
    unmapped: UnmappedPolicy,
}

impl<S> RegisterMap<S> {
    /// Builds a decode table over `rows` with the given unmapped-offset
    /// policy.
    #[must_use]
    pub const fn new(
        device: &'static str,
        rows: &'static [RegisterDef<S>],
        unmapped: UnmappedPolicy,
    ) -> Self {
        Self {
            device,
            rows,
            unmapped,
        }
    }

    /// Device tag carried by faults and diagnostics from this table.
    #[must_use]
    pub const fn device(&self) -> &'static str {
        self.device
    }

    /// Resolves `offset` to its decode row, if any.
    #[must_use]
    pub fn lookup(&self, offset: u32) -> Option<&RegisterDef<S>> {
        self.rows.iter().find(|row| row.contains(offset))
    }

    /// Dispatches a guest load at `offset` over `state`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault`] for reads of write-only ranges and, under
    /// [`UnmappedPolicy::Fatal`], for offsets no row decodes.
    pub fn read(
        &self,
        state: &mut S,
        offset: u32,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<u32, AccessFault> {
        match self.lookup(offset).and_then(|row| row.read.as_ref()) {
            Some(ReadOp::Const(value)) => Ok(*value),
            Some(ReadOp::Value(get)) => Ok(get(state)),
            Some(ReadOp::Effect(update)) => Ok(update(state)),
            Some(ReadOp::Zero) => Ok(0),
            Some(ReadOp::Fault) => Err(AccessFault::WriteOnlyRead {
                device: self.device,
                offset,
            }),
            None => self.unmapped(AccessDirection::Read, offset, sink).map(|()| 0),
        }
    }

    /// Dispatches a guest store of `value` at `offset` over `state`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessFault`] for writes to read-only ranges and, under
    /// [`UnmappedPolicy::Fatal`], for offsets no row decodes.
    pub fn write(
        &self,
        state: &mut S,
        offset: u32,
        value: u32,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AccessFault> {
        match self.lookup(offset).and_then(|row| row.write.as_ref()) {
            Some(WriteOp::Store(put)) => {
                put(state, value);
                Ok(())
            }
            Some(WriteOp::Discard) => Ok(()),
            Some(WriteOp::Fault) => Err(AccessFault::ReadOnlyWrite {
                device: self.device,
                offset,
            }),
            None => self.unmapped(AccessDirection::Write, offset, sink),
        }
    }

    fn unmapped(
        &self,
        direction: AccessDirection,
        offset: u32,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AccessFault> {
        match self.unmapped {
            UnmappedPolicy::Tolerated => {
                sink.report(AccessDiagnostic {
                    device: self.device,
                    direction,
                    offset,
                });
                Ok(())
            }
            UnmappedPolicy::Fatal => Err(AccessFault::BadOffset {
                device: self.device,
                direction,
                offset,
            }),
        }
    }
}
