//! Flash-controller register conformance suite.
//!
//! Covers the documented reset values, the Go-bit ready transition, the
//! mixed read-only/clear-on-write status semantics, the Rx Compare read
//! side effect, and the fatal illegal-access paths.

#![allow(clippy::pedantic, clippy::nursery)]

use device_core::{
    AccessDirection, AccessFault, AccessWidth, DeviceLifecycle, DeviceSnapshot, DiagnosticLog,
    FlashController, MmioDevice, COMMAND_GO, COMMAND_RESET, COMMAND_WRITE_MASK, FLASH_DEVICE,
    RX_COMPARE_FORCED, RX_COMPARE_WRITE_MASK, STATUS_CLEAR_ON_WRITE, STATUS_READ_ONLY,
    STATUS_READY, STATUS_RESET,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn read(dev: &mut FlashController, offset: u32) -> u32 {
    let mut sink = DiagnosticLog::new();
    dev.read(offset, AccessWidth::Word, &mut sink).unwrap()
}

fn write(dev: &mut FlashController, offset: u32, value: u32) {
    let mut sink = DiagnosticLog::new();
    dev.write(offset, AccessWidth::Word, value, &mut sink)
        .unwrap();
}

/// Builds a controller holding arbitrary register values, going through the
/// public restore path only.
fn controller_with(command: u32, status: u32, rx_compare: u32, dma_control: u32) -> FlashController {
    let mut dev = FlashController::new();
    let snapshot = DeviceSnapshot::capture(
        FLASH_DEVICE,
        &["command", "status", "rx_compare", "dma_control"],
        [command, status, rx_compare, dma_control],
    );
    dev.restore_state(&snapshot).unwrap();
    dev
}

#[test]
fn documented_reset_values() {
    let mut dev = FlashController::new();
    assert_eq!(read(&mut dev, 0x00), COMMAND_RESET);
    assert_eq!(read(&mut dev, 0x04), STATUS_RESET);
    assert_eq!(read(&mut dev, 0x08) & RX_COMPARE_WRITE_MASK, 0);
    assert_eq!(read(&mut dev, 0x0C), 0);
}

#[test]
fn go_bit_write_then_status_read_shows_ready() {
    let mut dev = FlashController::new();
    write(&mut dev, 0x00, 0x4000_0000);
    assert_ne!(read(&mut dev, 0x04) & (1 << 30), 0);
}

#[test]
fn command_without_go_leaves_ready_clear() {
    let mut dev = FlashController::new();
    write(&mut dev, 0x00, COMMAND_WRITE_MASK & !COMMAND_GO);
    assert_eq!(read(&mut dev, 0x04) & STATUS_READY, 0);
}

#[test]
fn dma_control_is_full_passthrough() {
    let mut dev = FlashController::new();
    write(&mut dev, 0x0C, 0xDEAD_BEEF);
    assert_eq!(read(&mut dev, 0x0C), 0xDEAD_BEEF);
}

#[test]
fn secondary_status_reads_zero_and_drops_writes() {
    let mut dev = FlashController::new();
    write(&mut dev, 0x1C, 0xFFFF_FFFF);
    assert_eq!(read(&mut dev, 0x1C), 0);
}

#[test]
fn all_access_widths_share_register_semantics() {
    let mut dev = FlashController::new();
    let mut sink = DiagnosticLog::new();
    for width in [AccessWidth::Byte, AccessWidth::Half, AccessWidth::Word] {
        assert_eq!(dev.read(0x00, width, &mut sink), Ok(COMMAND_RESET));
    }
}

#[rstest]
#[case::tx_fifo(0x10)]
#[case::slink_tx_fifo(0x100)]
fn reading_a_write_only_fifo_is_fatal(#[case] offset: u32) {
    // a prior Go must not soften the fault
    for go_first in [false, true] {
        let mut dev = FlashController::new();
        let mut sink = DiagnosticLog::new();
        if go_first {
            write(&mut dev, 0x00, COMMAND_GO);
        }
        assert_eq!(
            dev.read(offset, AccessWidth::Word, &mut sink),
            Err(AccessFault::WriteOnlyRead {
                device: FLASH_DEVICE,
                offset,
            })
        );
        assert!(sink.is_empty());
    }
}

#[rstest]
#[case::rx_fifo(0x20)]
#[case::slink_rx_fifo(0x180)]
fn writing_a_read_only_fifo_is_fatal(#[case] offset: u32) {
    for go_first in [false, true] {
        let mut dev = FlashController::new();
        let mut sink = DiagnosticLog::new();
        if go_first {
            write(&mut dev, 0x00, COMMAND_GO);
        }
        assert_eq!(read(&mut dev, offset), 0);
        assert_eq!(
            dev.write(offset, AccessWidth::Word, 0xFFFF_FFFF, &mut sink),
            Err(AccessFault::ReadOnlyWrite {
                device: FLASH_DEVICE,
                offset,
            })
        );
        assert!(sink.is_empty());
    }
}

#[rstest]
#[case(0x14)]
#[case(0x18)]
#[case(0x24)]
#[case(0x1FC)]
#[case(0x200)]
fn unknown_offsets_fault_in_both_directions(#[case] offset: u32) {
    let mut dev = FlashController::new();
    let mut sink = DiagnosticLog::new();
    assert_eq!(
        dev.read(offset, AccessWidth::Word, &mut sink),
        Err(AccessFault::BadOffset {
            device: FLASH_DEVICE,
            direction: AccessDirection::Read,
            offset,
        })
    );
    assert_eq!(
        dev.write(offset, AccessWidth::Word, 0, &mut sink),
        Err(AccessFault::BadOffset {
            device: FLASH_DEVICE,
            direction: AccessDirection::Write,
            offset,
        })
    );
    assert!(sink.is_empty());
}

proptest! {
    #[test]
    fn command_always_reads_back_masked(value in any::<u32>()) {
        let mut dev = FlashController::new();
        write(&mut dev, 0x00, value);
        prop_assert_eq!(read(&mut dev, 0x00), value & COMMAND_WRITE_MASK);
    }

    #[test]
    fn status_write_honors_every_bit_class(initial in any::<u32>(), value in any::<u32>()) {
        let mut dev = controller_with(COMMAND_RESET, initial, 0, 0);
        write(&mut dev, 0x04, value);
        let next = read(&mut dev, 0x04);

        // read-only bits hold their stored value
        prop_assert_eq!(next & STATUS_READ_ONLY, initial & STATUS_READ_ONLY);
        // clear-on-write bits only ever drop, and only when acked with a 1
        prop_assert_eq!(
            next & STATUS_CLEAR_ON_WRITE,
            initial & STATUS_CLEAR_ON_WRITE & !value
        );
        // remaining bits take the incoming value
        let plain = !(STATUS_READ_ONLY | STATUS_CLEAR_ON_WRITE);
        prop_assert_eq!(next & plain, value & plain);
    }

    #[test]
    fn rx_compare_write_then_read_forces_poll_bits(value in any::<u32>()) {
        let mut dev = FlashController::new();
        write(&mut dev, 0x08, value);
        let expected = (value & RX_COMPARE_WRITE_MASK) | RX_COMPARE_FORCED;
        prop_assert_eq!(read(&mut dev, 0x08), expected);
        // the forced bits stick in the stored value
        prop_assert_eq!(read(&mut dev, 0x08), expected);
        prop_assert_eq!(dev.save_state().field("rx_compare"), Some(expected));
    }

    #[test]
    fn go_bit_sets_ready_from_any_state(command in any::<u32>(), status in any::<u32>()) {
        let mut dev = controller_with(command, status, 0, 0);
        write(&mut dev, 0x00, COMMAND_GO);
        prop_assert_ne!(read(&mut dev, 0x04) & STATUS_READY, 0);
    }
}
