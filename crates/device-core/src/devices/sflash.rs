//! SPI serial-flash controller register model.
//!
//! Emulates the command/status interface of a SLINK-style serial controller
//! just far enough to satisfy guest firmware polling; no bytes ever move.
//! Unlike the cache controller, unknown and illegal accesses here are fatal:
//! firmware correctness depends on catching programming errors instead of
//! silently returning stale data.

use crate::regmap::{BitPolicy, ReadOp, RegisterDef, RegisterMap, UnmappedPolicy, WriteOp};
use crate::{
    AccessFault, AccessWidth, DeviceLifecycle, DeviceSnapshot, DiagnosticSink, MmioDevice,
    SnapshotError,
};

/// Device tag used in faults and snapshots.
pub const FLASH_DEVICE: &str = "sflash";

/// Size in bytes of the mapped register window.
pub const FLASH_WINDOW_BYTES: u32 = 0x200;

/// Reset value of the Command register.
pub const COMMAND_RESET: u32 = 0x1000_0420;

/// Reset value of the Status register.
pub const STATUS_RESET: u32 = 0x0280_0000;

/// Command bits that store through a write.
pub const COMMAND_WRITE_MASK: u32 = 0x1C2D_FFFF;

/// Command Go bit: starts a transfer, which completes immediately.
pub const COMMAND_GO: u32 = 1 << 30;

/// Status Ready bit, set once a transfer completes.
pub const STATUS_READY: u32 = 1 << 30;

/// Status bits the guest cannot overwrite.
pub const STATUS_READ_ONLY: u32 = 0x83C0_0000;

/// Status bits that clear when written with one.
pub const STATUS_CLEAR_ON_WRITE: u32 = 0x4C00_0000;

/// Rx Compare bits that store through a write.
pub const RX_COMPARE_WRITE_MASK: u32 = 0x0001_FFFF;

/// Bits every Rx Compare read forces on in the stored value:
/// RX empty, TX empty, Ready.
pub const RX_COMPARE_FORCED: u32 = 0x0080_0000 | 0x0020_0000 | 0x4000_0000;

const STATUS_BITS: BitPolicy = BitPolicy {
    read_only: STATUS_READ_ONLY,
    clear_on_write: STATUS_CLEAR_ON_WRITE,
};

const SNAPSHOT_FIELDS: [&str; 4] = ["command", "status", "rx_compare", "dma_control"];

/// SPI serial-flash controller device instance.
#[derive(Debug, Clone)]
pub struct FlashController {
    command: u32,
    status: u32,
    rx_compare: u32,
    dma_control: u32,
}

fn write_command(dev: &mut FlashController, value: u32) {
    dev.command = value & COMMAND_WRITE_MASK;
    if value & COMMAND_GO != 0 {
        // no transfer is modeled; the controller is ready immediately
        dev.status |= STATUS_READY;
    }
}

fn write_status(dev: &mut FlashController, value: u32) {
    dev.status = STATUS_BITS.apply(dev.status, value);
}

// Firmware polls the empty/ready flags through the compare register, so the
// forced bits go into the stored value, not just the returned one.
fn read_rx_compare(dev: &mut FlashController) -> u32 {
    dev.rx_compare |= RX_COMPARE_FORCED;
    dev.rx_compare
}

fn write_rx_compare(dev: &mut FlashController, value: u32) {
    dev.rx_compare = value & RX_COMPARE_WRITE_MASK;
}

static ROWS: [RegisterDef<FlashController>; 9] = [
    RegisterDef::at(
        "command",
        0x00,
        Some(ReadOp::Value(|dev| dev.command)),
        Some(WriteOp::Store(write_command)),
    ),
    RegisterDef::at(
        "status",
        0x04,
        Some(ReadOp::Value(|dev| dev.status)),
        Some(WriteOp::Store(write_status)),
    ),
    RegisterDef::at(
        "rx_compare",
        0x08,
        Some(ReadOp::Effect(read_rx_compare)),
        Some(WriteOp::Store(write_rx_compare)),
    ),
    RegisterDef::at(
        "dma_control",
        0x0C,
        Some(ReadOp::Value(|dev| dev.dma_control)),
        Some(WriteOp::Store(|dev, value| dev.dma_control = value)),
    ),
    RegisterDef::at("tx_fifo", 0x10, Some(ReadOp::Fault), Some(WriteOp::Discard)),
    // placeholder until secondary status is modeled
    RegisterDef::at("status2", 0x1C, Some(ReadOp::Zero), Some(WriteOp::Discard)),
    RegisterDef::at("rx_fifo", 0x20, Some(ReadOp::Zero), Some(WriteOp::Fault)),
    RegisterDef::at(
        "slink_tx_fifo",
        0x100,
        Some(ReadOp::Fault),
        Some(WriteOp::Discard),
    ),
    RegisterDef::at(
        "slink_rx_fifo",
        0x180,
        Some(ReadOp::Zero),
        Some(WriteOp::Fault),
    ),
];

static DECODE: RegisterMap<FlashController> =
    RegisterMap::new(FLASH_DEVICE, &ROWS, UnmappedPolicy::Fatal);

impl FlashController {
    /// Creates a controller in reset state.
    #[must_use]
    pub fn new() -> Self {
        let mut dev = Self {
            command: 0,
            status: 0,
            rx_compare: 0,
            dma_control: 0,
        };
        dev.reset();
        dev
    }
}

impl Default for FlashController {
    fn default() -> Self {
        Self::new()
    }
}

impl MmioDevice for FlashController {
    fn window_size(&self) -> u32 {
        FLASH_WINDOW_BYTES
    }

    fn read(
        &mut self,
        offset: u32,
        _width: AccessWidth,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<u32, AccessFault> {
        DECODE.read(self, offset, sink)
    }

    fn write(
        &mut self,
        offset: u32,
        _width: AccessWidth,
        value: u32,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AccessFault> {
        DECODE.write(self, offset, value, sink)
    }
}

impl DeviceLifecycle for FlashController {
    fn reset(&mut self) {
        self.command = COMMAND_RESET;
        self.status = STATUS_RESET;
        self.rx_compare = 0;
        self.dma_control = 0;
    }

    fn save_state(&self) -> DeviceSnapshot {
        DeviceSnapshot::capture(
            FLASH_DEVICE,
            &SNAPSHOT_FIELDS,
            [self.command, self.status, self.rx_compare, self.dma_control],
        )
    }

    fn restore_state(&mut self, snapshot: &DeviceSnapshot) -> Result<(), SnapshotError> {
        let [command, status, rx_compare, dma_control] =
            snapshot.unpack(FLASH_DEVICE, &SNAPSHOT_FIELDS)?;
        self.command = command;
        self.status = status;
        self.rx_compare = rx_compare;
        self.dma_control = dma_control;
        Ok(())
    }
}
