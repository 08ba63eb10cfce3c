#![no_main]

use device_core::{
    AccessWidth, CacheController, DeviceLifecycle, DiagnosticLog, FlashController, MmioDevice,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cache = CacheController::default();
    let mut flash = FlashController::new();
    let mut sink = DiagnosticLog::new();

    for chunk in data.chunks_exact(9) {
        let op = chunk[0];
        let offset = u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]);
        let value = u32::from_le_bytes([chunk[5], chunk[6], chunk[7], chunk[8]]);
        let width = match (op >> 4) & 0x3 {
            0 => AccessWidth::Byte,
            1 => AccessWidth::Half,
            _ => AccessWidth::Word,
        };

        match op & 0x7 {
            0 => {
                // the cache controller tolerates every offset
                assert!(cache.read(offset, width, &mut sink).is_ok());
            }
            1 => {
                assert!(cache.write(offset, width, value, &mut sink).is_ok());
            }
            2 => {
                // faults are fine, panics are not
                let _ = flash.read(offset, width, &mut sink);
            }
            3 => {
                let _ = flash.write(offset, width, value, &mut sink);
            }
            4 => cache.reset(),
            5 => flash.reset(),
            6 => {
                let snapshot = cache.save_state();
                let _ = cache.restore_state(&snapshot);
            }
            _ => {
                let snapshot = flash.save_state();
                let _ = flash.restore_state(&snapshot);
            }
        }
    }
});
