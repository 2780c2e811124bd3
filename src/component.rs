//! Chip interface and the placement state shared by every chip kind.

use std::fmt;
use std::str::{FromStr, SplitWhitespace};

use crate::error::{ChipError, ChipResult};
use crate::pin::{PinId, PinTable, PinValue, Side};

/// Draw the chip at half size.
pub const FLAG_SMALL: u32 = 1;
/// Mirror the chip horizontally.
pub const FLAG_FLIP_X: u32 = 1024;
/// Mirror the chip vertically.
pub const FLAG_FLIP_Y: u32 = 2048;

/// A clocked logic chip hosted by a [`crate::circuit::Circuit`].
///
/// The host calls [`Chip::setup_pins`] once when the chip is added, then
/// [`Chip::execute`] exactly once per simulation tick.
pub trait Chip: fmt::Debug + Send {
    fn chip_name(&self) -> &'static str;
    fn base(&self) -> &ChipBase;
    fn base_mut(&mut self) -> &mut ChipBase;

    /// Allocate this chip's pins in the circuit pin table and size the outline.
    fn setup_pins(&mut self, pins: &mut PinTable);
    fn post_count(&self) -> usize;
    fn voltage_source_count(&self) -> usize;

    /// Per-tick transition. Reads inputs and drives this chip's own outputs.
    fn execute(&mut self, pins: &mut PinTable);

    /// Whether the chip follows the reset pin convention.
    fn has_reset(&self) -> bool {
        true
    }

    /// Numeric tag identifying the chip kind in a placement line.
    fn dump_type(&self) -> u32;

    fn pins(&self) -> &[PinId] {
        &self.base().pins
    }

    /// Bind the n-th voltage source to the n-th output pin.
    fn set_voltage_source(&mut self, n: usize, id: usize, pins: &mut PinTable) {
        let target = self
            .pins()
            .iter()
            .copied()
            .filter(|&pin| pins.get(pin).map(|p| p.output).unwrap_or(false))
            .nth(n);

        if let Some(pin) = target.and_then(|pin| pins.get_mut(pin)) {
            pin.voltage_source = Some(id);
        }
    }

    /// Placement line for this chip, output levels included.
    fn dump(&self, pins: &PinTable) -> String {
        let base = self.base();
        let mut line = format!(
            "{} {} {} {} {} {}",
            self.dump_type(),
            base.x,
            base.y,
            base.x2,
            base.y2,
            base.flags
        );
        for pin in base.pins.iter().filter_map(|&id| pins.get(id)) {
            if pin.output {
                line.push(' ');
                line.push_str(if pin.value.is_high() { "true" } else { "false" });
            }
        }
        line
    }

    /// Chip name followed by one `label = level` line per labelled pin.
    fn info(&self, pins: &PinTable) -> Vec<String> {
        let mut lines = vec![self.chip_name().to_string()];
        for pin in self.pins().iter().filter_map(|&id| pins.get(id)) {
            let label = pin.display_label();
            if label.is_empty() {
                continue;
            }
            lines.push(format!("{} = {}", label, pin.value.to_char()));
        }
        lines
    }
}

/// A parsed placement line: `<type> <x> <y> <x2> <y2> <flags> [<level>...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub dump_type: u32,
    pub x: i32,
    pub y: i32,
    pub x2: i32,
    pub y2: i32,
    pub flags: u32,
    /// Saved levels of the output pins, in pin order. Chips rebuild their
    /// outputs from internal state, so these are never written back to pins.
    pub output_levels: Vec<PinValue>,
}

impl Placement {
    pub fn at(dump_type: u32, x: i32, y: i32) -> Self {
        Placement {
            dump_type,
            x,
            y,
            x2: x,
            y2: y,
            flags: 0,
            output_levels: Vec::new(),
        }
    }

    pub fn parse(line: &str) -> ChipResult<Self> {
        let mut tokens = line.split_whitespace();

        let dump_type = next_field(&mut tokens, "type")?;
        let x = next_field(&mut tokens, "x")?;
        let y = next_field(&mut tokens, "y")?;
        let x2 = next_field(&mut tokens, "x2")?;
        let y2 = next_field(&mut tokens, "y2")?;
        let flags = next_field(&mut tokens, "flags")?;

        let output_levels = tokens.map(parse_level).collect::<ChipResult<Vec<_>>>()?;

        Ok(Placement {
            dump_type,
            x,
            y,
            x2,
            y2,
            flags,
            output_levels,
        })
    }
}

impl FromStr for Placement {
    type Err = ChipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::parse(s)
    }
}

fn next_field<T: FromStr>(tokens: &mut SplitWhitespace<'_>, field: &'static str) -> ChipResult<T> {
    let token = tokens.next().ok_or(ChipError::MissingField(field))?;
    token.parse().map_err(|_| ChipError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

/// Logic threshold for levels saved as voltages.
const HIGH_THRESHOLD: f64 = 2.5;

fn parse_level(token: &str) -> ChipResult<PinValue> {
    match token {
        "true" | "1" => Ok(PinValue::High),
        "false" | "0" => Ok(PinValue::Low),
        other => match other.parse::<f64>() {
            Ok(volts) if volts.is_finite() => Ok(PinValue::from_bool(volts > HIGH_THRESHOLD)),
            _ => Err(ChipError::InvalidBool(other.to_string())),
        },
    }
}

/// Placement, outline size and pin handles common to every chip.
#[derive(Debug, Clone, Default)]
pub struct ChipBase {
    pub x: i32,
    pub y: i32,
    pub x2: i32,
    pub y2: i32,
    pub flags: u32,
    pub size_x: usize,
    pub size_y: usize,
    pub pins: Vec<PinId>,
}

impl ChipBase {
    pub fn new(x: i32, y: i32) -> Self {
        ChipBase {
            x,
            y,
            x2: x,
            y2: y,
            ..Default::default()
        }
    }

    pub fn from_placement(placement: &Placement) -> Self {
        ChipBase {
            x: placement.x,
            y: placement.y,
            x2: placement.x2,
            y2: placement.y2,
            flags: placement.flags,
            ..Default::default()
        }
    }

    pub fn is_small(&self) -> bool {
        self.flags & FLAG_SMALL != 0
    }

    pub fn flip_x(&self) -> bool {
        self.flags & FLAG_FLIP_X != 0
    }

    pub fn flip_y(&self) -> bool {
        self.flags & FLAG_FLIP_Y != 0
    }

    /// Distance between adjacent pin slots.
    pub fn grid_spacing(&self) -> i32 {
        if self.is_small() {
            8
        } else {
            16
        }
    }

    /// Width and height of the chip outline.
    pub fn footprint(&self) -> (i32, i32) {
        let spacing = self.grid_spacing();
        (self.size_x as i32 * spacing, self.size_y as i32 * spacing)
    }

    /// Grid coordinates of the n-th post, honouring the flip flags.
    pub fn post_location(&self, n: usize, pins: &PinTable) -> Option<(i32, i32)> {
        let pin = pins.get(*self.pins.get(n)?)?;
        let spacing = self.grid_spacing();
        let (width, height) = self.footprint();

        let mut side = pin.side;
        let mut pos = pin.position as i32;
        match side {
            Side::North | Side::South => {
                if self.flip_x() {
                    pos = self.size_x as i32 - pos;
                }
                if self.flip_y() {
                    side = if side == Side::North { Side::South } else { Side::North };
                }
            }
            Side::West | Side::East => {
                if self.flip_y() {
                    pos = self.size_y as i32 - pos;
                }
                if self.flip_x() {
                    side = if side == Side::West { Side::East } else { Side::West };
                }
            }
        }

        let offset = pos * spacing;
        let location = match side {
            Side::North => (self.x + offset, self.y),
            Side::South => (self.x + offset, self.y + height),
            Side::West => (self.x, self.y + offset),
            Side::East => (self.x + width, self.y + offset),
        };
        Some(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::Pin;

    #[test]
    fn test_placement_parse() {
        let placement = Placement::parse("189 32 48 176 48 1024").unwrap();
        assert_eq!(placement.dump_type, 189);
        assert_eq!((placement.x, placement.y), (32, 48));
        assert_eq!((placement.x2, placement.y2), (176, 48));
        assert_eq!(placement.flags, FLAG_FLIP_X);
        assert!(placement.output_levels.is_empty());
    }

    #[test]
    fn test_placement_parse_with_levels() {
        let placement: Placement = "189 0 0 0 0 0 true false 1 0".parse().unwrap();
        assert_eq!(
            placement.output_levels,
            vec![PinValue::High, PinValue::Low, PinValue::High, PinValue::Low]
        );
    }

    #[test]
    fn test_placement_parse_errors() {
        assert!(matches!(
            Placement::parse("189 0 0"),
            Err(ChipError::MissingField("x2"))
        ));
        assert!(matches!(
            Placement::parse("189 0 zero 0 0 0"),
            Err(ChipError::InvalidNumber { field: "y", .. })
        ));
        assert!(matches!(
            Placement::parse("189 0 0 0 0 0 maybe"),
            Err(ChipError::InvalidBool(_))
        ));
        assert!(matches!(Placement::parse(""), Err(ChipError::MissingField("type"))));
    }

    #[test]
    fn test_placement_parse_voltage_levels() {
        let placement = Placement::parse("189 0 0 0 0 0 5.0 0.0 2.5 3.3 -1").unwrap();
        assert_eq!(
            placement.output_levels,
            vec![
                PinValue::High,
                PinValue::Low,
                PinValue::Low,
                PinValue::High,
                PinValue::Low
            ]
        );
        assert!(matches!(
            Placement::parse("189 0 0 0 0 0 NaN"),
            Err(ChipError::InvalidBool(_))
        ));
    }

    #[test]
    fn test_base_flags() {
        let mut base = ChipBase::new(0, 0);
        assert!(!base.is_small());
        assert_eq!(base.grid_spacing(), 16);

        base.flags = FLAG_SMALL | FLAG_FLIP_Y;
        assert!(base.is_small());
        assert!(base.flip_y());
        assert!(!base.flip_x());
        assert_eq!(base.grid_spacing(), 8);
    }

    #[test]
    fn test_post_location() {
        let mut table = PinTable::new();
        let mut base = ChipBase::new(100, 200);
        base.size_x = 4;
        base.size_y = 3;
        base.pins.push(table.allocate(Pin::new(1, Side::North, "A")));
        base.pins.push(table.allocate(Pin::new(2, Side::West, "B")));

        assert_eq!(base.post_location(0, &table), Some((116, 200)));
        assert_eq!(base.post_location(1, &table), Some((100, 232)));
        assert_eq!(base.post_location(2, &table), None);

        base.flags = FLAG_FLIP_X;
        assert_eq!(base.post_location(0, &table), Some((148, 200)));
        assert_eq!(base.post_location(1, &table), Some((164, 232)));
    }
}
