use std::fmt;

/// Logic level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinValue {
    #[default]
    Low,
    High,
}

impl PinValue {
    pub fn to_str(&self) -> &'static str {
        match self {
            PinValue::Low => "Low",
            PinValue::High => "High",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            PinValue::Low => '0',
            PinValue::High => '1',
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            PinValue::High
        } else {
            PinValue::Low
        }
    }

    pub fn is_high(&self) -> bool {
        *self == PinValue::High
    }
}

impl From<bool> for PinValue {
    fn from(value: bool) -> Self {
        PinValue::from_bool(value)
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// Edge of the chip outline a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    South,
    West,
    East,
}

/// A connection point on a chip outline.
///
/// Pins live in the circuit's [`PinTable`]; chips only keep [`PinId`] handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub label: String,
    pub value: PinValue,
    /// Driven by the owning chip.
    pub output: bool,
    /// Edge-sensitive clock input, drawn with a clock marker.
    pub clock: bool,
    /// Slot along `side`, in grid units from the chip origin.
    pub position: usize,
    pub side: Side,
    /// Voltage source id assigned by the host solver, outputs only.
    pub voltage_source: Option<usize>,
}

impl Pin {
    pub fn new(position: usize, side: Side, label: &str) -> Self {
        Pin {
            label: label.to_string(),
            value: PinValue::Low,
            output: false,
            clock: false,
            position,
            side,
            voltage_source: None,
        }
    }

    pub fn output(mut self) -> Self {
        self.output = true;
        self
    }

    pub fn clock(mut self) -> Self {
        self.clock = true;
        self
    }

    /// Label as shown in chip info; the unlabelled clock input reads "Clk".
    pub fn display_label(&self) -> &str {
        if self.clock && self.label.is_empty() {
            "Clk"
        } else {
            &self.label
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.display_label(), self.value)?;
        if let Some(vs) = self.voltage_source {
            write!(f, " [vs {}]", vs)?;
        }
        Ok(())
    }
}

/// Handle to a pin in a [`PinTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub(crate) usize);

impl PinId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Circuit-owned storage for every pin in a circuit.
#[derive(Debug, Default, Clone)]
pub struct PinTable {
    pins: Vec<Pin>,
}

impl PinTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, pin: Pin) -> PinId {
        self.pins.push(pin);
        PinId(self.pins.len() - 1)
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(id.0)
    }

    pub fn get_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pins.get_mut(id.0)
    }

    pub fn contains(&self, id: PinId) -> bool {
        id.0 < self.pins.len()
    }

    /// Level of a pin; a dangling handle reads as low.
    pub fn value(&self, id: PinId) -> PinValue {
        self.get(id).map(|pin| pin.value).unwrap_or_default()
    }

    pub fn is_high(&self, id: PinId) -> bool {
        self.value(id).is_high()
    }

    pub fn set_value(&mut self, id: PinId, value: PinValue) {
        if let Some(pin) = self.get_mut(id) {
            pin.value = value;
        }
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PinId, &Pin)> {
        self.pins
            .iter()
            .enumerate()
            .map(|(index, pin)| (PinId(index), pin))
    }
}
