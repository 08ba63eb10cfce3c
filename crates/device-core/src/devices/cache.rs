//! L2 cache controller register model.
//!
//! Emulates the control-register interface of an L2C-310-style
//! set-associative cache controller. Maintenance operations always read back
//! as complete; no in-progress state is modeled. Unknown offsets are
//! tolerated: the guest keeps running and the host gets a diagnostic.

use crate::regmap::{ReadOp, RegisterDef, RegisterMap, UnmappedPolicy, WriteOp};
use crate::{
    AccessFault, AccessWidth, DeviceLifecycle, DeviceSnapshot, DiagnosticSink, MmioDevice,
    SnapshotError,
};

/// Device tag used in diagnostics and snapshots.
pub const CACHE_DEVICE: &str = "l2-cache";

/// Identification constant returned by the Cache ID register (L2C-310 r3p2).
pub const CACHE_ID: u32 = 0x4100_00C8;

/// Power-on cache-type base when board code does not override it.
pub const DEFAULT_CACHE_TYPE: u32 = 0x1C10_0100;

/// Reset value of the Aux Control register.
pub const AUX_CTRL_RESET: u32 = 0x0202_0000;

/// Size in bytes of the mapped register window.
pub const CACHE_WINDOW_BYTES: u32 = 0x1000;

const OFFSET_MASK: u32 = CACHE_WINDOW_BYTES - 1;

const SNAPSHOT_FIELDS: [&str; 7] = [
    "ctrl",
    "aux_ctrl",
    "data_ctrl",
    "tag_ctrl",
    "filter_start",
    "filter_end",
    "cache_type",
];

/// Construction-time parameters supplied by board code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheControllerConfig {
    /// Base value of the derived Cache Type register.
    pub cache_type: u32,
}

impl Default for CacheControllerConfig {
    fn default() -> Self {
        Self {
            cache_type: DEFAULT_CACHE_TYPE,
        }
    }
}

/// L2 cache controller device instance.
#[derive(Debug, Clone)]
pub struct CacheController {
    cache_type: u32,
    ctrl: u32,
    aux_ctrl: u32,
    tag_ctrl: u32,
    data_ctrl: u32,
    filter_start: u32,
    filter_end: u32,
}

// Aux Control way-size and associativity fields fold into both the data and
// instruction halves of the type word. The combined value is cached back, so
// repeated reads with unchanged Aux Control are idempotent.
fn derive_cache_type(dev: &mut CacheController) -> u32 {
    let mut ways = (dev.aux_ctrl & (7 << 17)) >> 15;
    ways |= (dev.aux_ctrl & (1 << 16)) >> 16;
    dev.cache_type |= (ways << 18) | (ways << 6);
    dev.cache_type
}

static ROWS: [RegisterDef<CacheController>; 12] = [
    RegisterDef::at("cache_id", 0x000, Some(ReadOp::Const(CACHE_ID)), None),
    RegisterDef::at(
        "cache_type",
        0x004,
        Some(ReadOp::Effect(derive_cache_type)),
        None,
    ),
    RegisterDef::at(
        "ctrl",
        0x100,
        Some(ReadOp::Value(|dev| dev.ctrl)),
        // only the enable bit is meaningful
        Some(WriteOp::Store(|dev, value| dev.ctrl = value & 1)),
    ),
    RegisterDef::at(
        "aux_ctrl",
        0x104,
        Some(ReadOp::Value(|dev| dev.aux_ctrl)),
        Some(WriteOp::Store(|dev, value| dev.aux_ctrl = value)),
    ),
    RegisterDef::at(
        "tag_ctrl",
        0x108,
        Some(ReadOp::Value(|dev| dev.tag_ctrl)),
        Some(WriteOp::Store(|dev, value| dev.tag_ctrl = value)),
    ),
    RegisterDef::at(
        "data_ctrl",
        0x10C,
        Some(ReadOp::Value(|dev| dev.data_ctrl)),
        Some(WriteOp::Store(|dev, value| dev.data_ctrl = value)),
    ),
    // Maintenance operations complete instantly: reads report done, stores
    // are accepted and dropped.
    RegisterDef::span(
        "maintenance",
        0x730,
        0x7FF,
        Some(ReadOp::Zero),
        Some(WriteOp::Discard),
    ),
    RegisterDef::at(
        "filter_start",
        0xC00,
        Some(ReadOp::Value(|dev| dev.filter_start)),
        Some(WriteOp::Store(|dev, value| dev.filter_start = value)),
    ),
    RegisterDef::at(
        "filter_end",
        0xC04,
        Some(ReadOp::Value(|dev| dev.filter_end)),
        Some(WriteOp::Store(|dev, value| dev.filter_end = value)),
    ),
    RegisterDef::at("debug_ctrl", 0xF40, Some(ReadOp::Zero), Some(WriteOp::Discard)),
    RegisterDef::at(
        "prefetch_ctrl",
        0xF60,
        Some(ReadOp::Zero),
        Some(WriteOp::Discard),
    ),
    RegisterDef::at("power_ctrl", 0xF80, Some(ReadOp::Zero), Some(WriteOp::Discard)),
];

static DECODE: RegisterMap<CacheController> =
    RegisterMap::new(CACHE_DEVICE, &ROWS, UnmappedPolicy::Tolerated);

impl CacheController {
    /// Creates a controller with board-supplied parameters, in reset state.
    #[must_use]
    pub fn new(config: CacheControllerConfig) -> Self {
        let mut dev = Self {
            cache_type: config.cache_type,
            ctrl: 0,
            aux_ctrl: 0,
            tag_ctrl: 0,
            data_ctrl: 0,
            filter_start: 0,
            filter_end: 0,
        };
        dev.reset();
        dev
    }
}

impl Default for CacheController {
    fn default() -> Self {
        Self::new(CacheControllerConfig::default())
    }
}

impl MmioDevice for CacheController {
    fn window_size(&self) -> u32 {
        CACHE_WINDOW_BYTES
    }

    fn read(
        &mut self,
        offset: u32,
        _width: AccessWidth,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<u32, AccessFault> {
        // aliases inside the window decode identically
        DECODE.read(self, offset & OFFSET_MASK, sink)
    }

    fn write(
        &mut self,
        offset: u32,
        _width: AccessWidth,
        value: u32,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AccessFault> {
        DECODE.write(self, offset & OFFSET_MASK, value, sink)
    }
}

impl DeviceLifecycle for CacheController {
    fn reset(&mut self) {
        // the accumulated cache-type word deliberately survives reset
        self.ctrl = 0;
        self.aux_ctrl = AUX_CTRL_RESET;
        self.tag_ctrl = 0;
        self.data_ctrl = 0;
        self.filter_start = 0;
        self.filter_end = 0;
    }

    fn save_state(&self) -> DeviceSnapshot {
        DeviceSnapshot::capture(
            CACHE_DEVICE,
            &SNAPSHOT_FIELDS,
            [
                self.ctrl,
                self.aux_ctrl,
                self.data_ctrl,
                self.tag_ctrl,
                self.filter_start,
                self.filter_end,
                self.cache_type,
            ],
        )
    }

    fn restore_state(&mut self, snapshot: &DeviceSnapshot) -> Result<(), SnapshotError> {
        let [ctrl, aux_ctrl, data_ctrl, tag_ctrl, filter_start, filter_end, cache_type] =
            snapshot.unpack(CACHE_DEVICE, &SNAPSHOT_FIELDS)?;
        self.ctrl = ctrl;
        self.aux_ctrl = aux_ctrl;
        self.data_ctrl = data_ctrl;
        self.tag_ctrl = tag_ctrl;
        self.filter_start = filter_start;
        self.filter_end = filter_end;
        self.cache_type = cache_type;
        Ok(())
    }
}
