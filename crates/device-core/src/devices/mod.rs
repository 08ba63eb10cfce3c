//! Register-level models of the individual peripheral devices.
//!
//! Each device is an independent instance of the same pattern: a register
//! file, a static decode table, side-effect handlers, and lifecycle hooks.
//! No state is shared between device instances.

/// L2 cache controller register model.
pub mod cache;
/// SPI serial-flash controller register model.
pub mod sflash;
