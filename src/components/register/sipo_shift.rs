use log::{debug, trace};

use crate::component::{Chip, ChipBase, Placement};
use crate::error::{ChipError, ChipResult};
use crate::pin::{Pin, PinId, PinTable, PinValue, Side};

/// Pin index of the serial data input.
pub const DATA_PIN: usize = 0;
/// Pin index of the edge-sensitive clock input.
pub const CLOCK_PIN: usize = 1;
/// Pin index of the first parallel output (bit 7).
pub const FIRST_OUTPUT_PIN: usize = 2;

const OUTPUT_LABELS: [&str; 8] = ["I7", "I6", "I5", "I4", "I3", "I2", "I1", "I0"];

/// Edge detector state of the clock input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockPhase {
    /// Clock seen low; the next high level is a rising edge.
    #[default]
    Armed,
    /// Rising edge taken; waiting for the clock to return low.
    Latched,
}

/// 8-bit serial-in, parallel-out shift register.
///
/// Pinout:
/// - 0: `D`, serial data input
/// - 1: clock input, shifts on the rising edge
/// - 2..=9: `I7`..`I0`, parallel outputs, most significant bit first
///
/// Each rising edge shifts the register right by one and loads `D` into
/// bit 7. Reloading a saved placement never restores the register contents.
#[derive(Debug)]
pub struct SipoShift {
    base: ChipBase,
    register: u8,
    clock_latched: bool,
}

impl SipoShift {
    pub const CHIP_NAME: &'static str = "SIPO shift register";
    pub const DUMP_TYPE: u32 = 189;
    pub const POST_COUNT: usize = 10;
    pub const VOLTAGE_SOURCES: usize = 8;

    pub fn new(x: i32, y: i32) -> Self {
        debug!("placing {} at ({}, {})", Self::CHIP_NAME, x, y);
        SipoShift {
            base: ChipBase::new(x, y),
            register: 0,
            clock_latched: false,
        }
    }

    /// Restore placement and orientation; the register always starts cleared.
    pub fn from_placement(placement: &Placement) -> ChipResult<Self> {
        if placement.dump_type != Self::DUMP_TYPE {
            return Err(ChipError::DumpTypeMismatch {
                expected: Self::DUMP_TYPE,
                found: placement.dump_type,
            });
        }
        debug!(
            "restoring {} at ({}, {}) flags {}",
            Self::CHIP_NAME,
            placement.x,
            placement.y,
            placement.flags
        );
        Ok(SipoShift {
            base: ChipBase::from_placement(placement),
            register: 0,
            clock_latched: false,
        })
    }

    pub fn from_dump(line: &str) -> ChipResult<Self> {
        Self::from_placement(&Placement::parse(line)?)
    }

    pub fn register(&self) -> u8 {
        self.register
    }

    pub fn clock_phase(&self) -> ClockPhase {
        if self.clock_latched {
            ClockPhase::Latched
        } else {
            ClockPhase::Armed
        }
    }

    pub fn data_pin(&self) -> Option<PinId> {
        self.base.pins.get(DATA_PIN).copied()
    }

    pub fn clock_pin(&self) -> Option<PinId> {
        self.base.pins.get(CLOCK_PIN).copied()
    }

    /// Output pin carrying `bit` of the register.
    pub fn output_pin(&self, bit: u8) -> Option<PinId> {
        if bit > 7 {
            return None;
        }
        self.base
            .pins
            .get(FIRST_OUTPUT_PIN + (7 - bit as usize))
            .copied()
    }

    fn drive_outputs(&self, pins: &mut PinTable) {
        for (k, &pin) in self.base.pins[FIRST_OUTPUT_PIN..].iter().enumerate() {
            let bit = self.register & (0x80u8 >> k) != 0;
            pins.set_value(pin, PinValue::from_bool(bit));
        }
    }
}

impl Chip for SipoShift {
    fn chip_name(&self) -> &'static str {
        Self::CHIP_NAME
    }

    fn base(&self) -> &ChipBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ChipBase {
        &mut self.base
    }

    fn setup_pins(&mut self, pins: &mut PinTable) {
        self.base.size_x = 9;
        self.base.size_y = 3;

        let mut handles = Vec::with_capacity(Self::POST_COUNT);
        handles.push(pins.allocate(Pin::new(1, Side::West, "D")));
        handles.push(pins.allocate(Pin::new(2, Side::West, "").clock()));
        for (k, label) in OUTPUT_LABELS.iter().enumerate() {
            handles.push(pins.allocate(Pin::new(k + 1, Side::North, label).output()));
        }
        self.base.pins = handles;

        // Outputs always mirror the register, including right after a reload.
        self.drive_outputs(pins);
    }

    fn post_count(&self) -> usize {
        Self::POST_COUNT
    }

    fn voltage_source_count(&self) -> usize {
        Self::VOLTAGE_SOURCES
    }

    fn execute(&mut self, pins: &mut PinTable) {
        if self.base.pins.len() < Self::POST_COUNT {
            return;
        }
        let clock = pins.is_high(self.base.pins[CLOCK_PIN]);
        let data = pins.is_high(self.base.pins[DATA_PIN]);

        if clock && !self.clock_latched {
            self.clock_latched = true;
            // Shift first, then load the new high bit.
            self.register >>= 1;
            if data {
                self.register += 128;
            }
            trace!("shift in {} -> {:08b}", u8::from(data), self.register);
            self.drive_outputs(pins);
        }
        if !clock {
            self.clock_latched = false;
        }
    }

    fn has_reset(&self) -> bool {
        false
    }

    fn dump_type(&self) -> u32 {
        Self::DUMP_TYPE
    }
}
