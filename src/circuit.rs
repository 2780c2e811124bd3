//! Discrete-time circuit stepper.
//!
//! A [`Circuit`] owns the pin table and every chip placed in it. Each call to
//! [`Circuit::step`] runs every chip's transition once, in the order the chips
//! were added, then copies wired pin levels from source to target.

use log::{debug, trace};

use crate::component::Chip;
use crate::error::{ChipError, ChipResult};
use crate::pin::{Pin, PinId, PinTable, PinValue, Side};

/// Handle to a chip placed in a [`Circuit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipId(usize);

impl ChipId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One-way wire: after each tick `target` takes the level of `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire {
    pub source: PinId,
    pub target: PinId,
}

#[derive(Debug)]
pub struct Circuit {
    name: String,
    pins: PinTable,
    chips: Vec<Box<dyn Chip>>,
    inputs: Vec<PinId>,
    wires: Vec<Wire>,
    next_voltage_source: usize,
    ticks: u64,
}

impl Circuit {
    pub fn new(name: &str) -> Self {
        Circuit {
            name: name.to_string(),
            pins: PinTable::new(),
            chips: Vec::new(),
            inputs: Vec::new(),
            wires: Vec::new(),
            next_voltage_source: 0,
            ticks: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Place a chip: allocate its pins and hand out its voltage source ids.
    pub fn add_chip(&mut self, mut chip: Box<dyn Chip>) -> ChipId {
        chip.setup_pins(&mut self.pins);

        for n in 0..chip.voltage_source_count() {
            chip.set_voltage_source(n, self.next_voltage_source, &mut self.pins);
            self.next_voltage_source += 1;
        }

        debug!(
            "{}: added {} with {} posts",
            self.name,
            chip.chip_name(),
            chip.post_count()
        );
        self.chips.push(chip);
        ChipId(self.chips.len() - 1)
    }

    /// Free-standing pin driven from outside the circuit.
    pub fn add_input(&mut self, label: &str) -> PinId {
        let id = self
            .pins
            .allocate(Pin::new(self.inputs.len(), Side::West, label));
        self.inputs.push(id);
        id
    }

    pub fn input(&self, label: &str) -> Option<PinId> {
        self.inputs
            .iter()
            .copied()
            .find(|&id| self.pins.get(id).map(|p| p.label == label).unwrap_or(false))
    }

    pub fn connect(&mut self, source: PinId, target: PinId) -> ChipResult<()> {
        for id in [source, target] {
            if !self.pins.contains(id) {
                return Err(ChipError::UnknownPin(id.index()));
            }
        }
        debug!("{}: wire {} -> {}", self.name, source, target);
        self.wires.push(Wire { source, target });
        // Targets see the source level before the next tick runs.
        self.pins.set_value(target, self.pins.value(source));
        Ok(())
    }

    /// Drive a pin and forward the level along its wires.
    pub fn set_input(&mut self, id: PinId, value: PinValue) {
        self.pins.set_value(id, value);
        self.propagate();
    }

    pub fn value(&self, id: PinId) -> PinValue {
        self.pins.value(id)
    }

    /// Advance one tick.
    pub fn step(&mut self) {
        for chip in self.chips.iter_mut() {
            chip.execute(&mut self.pins);
        }
        self.propagate();
        self.ticks += 1;
        trace!("{}: tick {}", self.name, self.ticks);
    }

    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// One full clock cycle: present `bit` on `data`, step with the clock
    /// high, then step with it low.
    pub fn clock_in(&mut self, data: PinId, clock: PinId, bit: bool) {
        self.set_input(data, PinValue::from_bool(bit));
        self.set_input(clock, PinValue::High);
        self.step();
        self.set_input(clock, PinValue::Low);
        self.step();
    }

    fn propagate(&mut self) {
        // Wires are applied in order, so chained wires settle in one pass.
        for wire in &self.wires {
            let level = self.pins.value(wire.source);
            self.pins.set_value(wire.target, level);
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn chip(&self, id: ChipId) -> Option<&dyn Chip> {
        self.chips.get(id.0).map(|chip| chip.as_ref())
    }

    pub fn chips(&self) -> impl Iterator<Item = (ChipId, &dyn Chip)> {
        self.chips
            .iter()
            .enumerate()
            .map(|(index, chip)| (ChipId(index), chip.as_ref()))
    }

    pub fn chip_count(&self) -> usize {
        self.chips.len()
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Total voltage sources requested by the placed chips.
    pub fn voltage_source_count(&self) -> usize {
        self.next_voltage_source
    }

    pub fn pins(&self) -> &PinTable {
        &self.pins
    }

    /// Placement lines for every chip, in placement order.
    pub fn dump(&self) -> Vec<String> {
        self.chips.iter().map(|chip| chip.dump(&self.pins)).collect()
    }
}
