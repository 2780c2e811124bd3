//! # JSON Circuit Description
//!
//! Builds a [`Circuit`] from a JSON description of its chips, external
//! inputs and wires.
//!
//! ## Usage
//!
//! ```no_run
//! use sipo_sim::circuit_config::ChipFactory;
//!
//! let factory = ChipFactory::new();
//! let system = factory.create_from_json("configs/sipo_cascade.json").expect("Could not load circuit!");
//! println!("Loaded {} with {} chips", system.circuit.name(), system.circuit.chip_count());
//! ```
//!
//! ## Description Format
//!
//! ```json
//! {
//!   "name": "Cascade",
//!   "description": "two SIPO registers in series",
//!   "inputs": ["DATA", "CLK"],
//!   "chips": [
//!     {"name": "SR0", "placement": "189 0 0 144 0 0"},
//!     {"name": "SR1", "component_type": "sipo_shift", "position": [0, 64]}
//!   ],
//!   "connections": [
//!     {
//!       "source": {"component": "inputs", "pin": "DATA"},
//!       "targets": [{"component": "SR0", "pin": "D"}]
//!     }
//!   ]
//! }
//! ```
//!
//! A chip entry is either a placement line, dispatched on its dump type, or a
//! component type with an optional grid position. The pseudo component
//! `inputs` names the circuit's external input pins.

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::circuit::{ChipId, Circuit};
use crate::component::{Chip, Placement};
use crate::components::register::SipoShift;
use crate::error::{ChipError, ChipResult};
use crate::pin::PinId;

/// Component name that refers to the circuit's external inputs.
pub const INPUTS_COMPONENT: &str = "inputs";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    pub chips: Vec<ChipConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipConfig {
    pub name: String,
    pub component_type: Option<String>,
    pub placement: Option<String>,
    pub position: Option<[i32; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub source: PinReference,
    pub targets: Vec<PinReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinReference {
    pub component: String,
    pub pin: String,
}

type PlacementConstructor = fn(&Placement) -> ChipResult<Box<dyn Chip>>;

/// Registry of chip constructors, keyed by dump type and by component type name.
#[derive(Debug)]
pub struct ChipFactory {
    constructors: HashMap<u32, PlacementConstructor>,
    type_names: HashMap<String, u32>,
}

impl Default for ChipFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipFactory {
    pub fn new() -> Self {
        let mut factory = ChipFactory {
            constructors: HashMap::new(),
            type_names: HashMap::new(),
        };
        factory.register_default_chips();
        factory
    }

    fn register_default_chips(&mut self) {
        self.register("sipo_shift", SipoShift::DUMP_TYPE, |placement| {
            Ok(Box::new(SipoShift::from_placement(placement)?))
        });
    }

    pub fn register(&mut self, type_name: &str, dump_type: u32, constructor: PlacementConstructor) {
        self.constructors.insert(dump_type, constructor);
        self.type_names.insert(type_name.to_string(), dump_type);
    }

    /// Build a chip from a placement line.
    pub fn create_from_dump(&self, line: &str) -> ChipResult<Box<dyn Chip>> {
        let placement = Placement::parse(line)?;
        self.create_from_placement(&placement)
    }

    pub fn create_from_placement(&self, placement: &Placement) -> ChipResult<Box<dyn Chip>> {
        let constructor = self
            .constructors
            .get(&placement.dump_type)
            .ok_or(ChipError::UnknownDumpType(placement.dump_type))?;
        constructor(placement)
    }

    /// Build a chip of a named type at a grid position.
    pub fn create_by_type(&self, type_name: &str, x: i32, y: i32) -> ChipResult<Box<dyn Chip>> {
        let dump_type = self
            .type_names
            .get(type_name)
            .copied()
            .ok_or_else(|| ChipError::UnknownComponentType(type_name.to_string()))?;
        self.create_from_placement(&Placement::at(dump_type, x, y))
    }

    pub fn create_from_json(&self, path: &str) -> ChipResult<ConfiguredCircuit> {
        let content = std::fs::read_to_string(path).map_err(|source| ChipError::Io {
            path: path.to_string(),
            source,
        })?;
        self.create_from_str(&content)
    }

    pub fn create_from_str(&self, json: &str) -> ChipResult<ConfiguredCircuit> {
        let config: CircuitConfig = serde_json::from_str(json)?;
        self.build(config)
    }

    pub fn build(&self, config: CircuitConfig) -> ChipResult<ConfiguredCircuit> {
        let mut circuit = Circuit::new(&config.name);
        let mut chip_ids = HashMap::new();

        for label in &config.inputs {
            circuit.add_input(label);
        }

        for entry in &config.chips {
            let chip = self.create_chip(entry)?;
            let id = circuit.add_chip(chip);
            chip_ids.insert(entry.name.clone(), id);
        }

        let mut system = ConfiguredCircuit {
            circuit,
            chip_ids,
            config,
        };

        for connection in system.config.connections.clone() {
            let source = system.resolve(&connection.source)?;
            for target in &connection.targets {
                let target = system.resolve(target)?;
                system.circuit.connect(source, target)?;
            }
        }

        info!(
            "loaded circuit {} ({} chips, {} wires)",
            system.circuit.name(),
            system.circuit.chip_count(),
            system.circuit.wires().len()
        );
        Ok(system)
    }

    fn create_chip(&self, entry: &ChipConfig) -> ChipResult<Box<dyn Chip>> {
        debug!("creating chip {}", entry.name);
        if let Some(line) = &entry.placement {
            return self.create_from_dump(line);
        }
        match &entry.component_type {
            Some(type_name) => {
                let [x, y] = entry.position.unwrap_or([0, 0]);
                self.create_by_type(type_name, x, y)
            }
            None => Err(ChipError::IncompleteChipEntry(entry.name.clone())),
        }
    }
}

/// A circuit built from a description, with chip names kept for lookups.
#[derive(Debug)]
pub struct ConfiguredCircuit {
    pub circuit: Circuit,
    pub config: CircuitConfig,
    chip_ids: HashMap<String, ChipId>,
}

impl ConfiguredCircuit {
    pub fn chip_id(&self, name: &str) -> Option<ChipId> {
        self.chip_ids.get(name).copied()
    }

    pub fn chip(&self, name: &str) -> Option<&dyn Chip> {
        self.chip_id(name).and_then(|id| self.circuit.chip(id))
    }

    /// Find a pin by component name and pin label.
    ///
    /// The unlabelled clock input answers to `Clk` in any case.
    pub fn pin(&self, component: &str, label: &str) -> ChipResult<PinId> {
        let unknown_label = || ChipError::UnknownPinLabel {
            component: component.to_string(),
            label: label.to_string(),
        };

        if component == INPUTS_COMPONENT {
            return self.circuit.input(label).ok_or_else(unknown_label);
        }

        let chip = self
            .chip(component)
            .ok_or_else(|| ChipError::UnknownComponent(component.to_string()))?;
        let pins = self.circuit.pins();
        chip.pins()
            .iter()
            .copied()
            .find(|&id| {
                pins.get(id)
                    .map(|pin| {
                        pin.label == label || (pin.clock && label.eq_ignore_ascii_case("clk"))
                    })
                    .unwrap_or(false)
            })
            .ok_or_else(unknown_label)
    }

    fn resolve(&self, reference: &PinReference) -> ChipResult<PinId> {
        self.pin(&reference.component, &reference.pin)
    }

    /// Parallel outputs of a named chip, packed most significant pin first.
    pub fn output_byte(&self, name: &str) -> Option<u8> {
        let chip = self.chip(name)?;
        let pins = self.circuit.pins();
        let byte = chip
            .pins()
            .iter()
            .filter_map(|&id| pins.get(id))
            .filter(|pin| pin.output)
            .fold(0u8, |acc, pin| (acc << 1) | u8::from(pin.value.is_high()));
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASCADE: &str = r#"{
        "name": "Cascade",
        "inputs": ["DATA", "CLK"],
        "chips": [
            {"name": "SR0", "placement": "189 0 0 144 0 0"},
            {"name": "SR1", "component_type": "sipo_shift", "position": [0, 64]}
        ],
        "connections": [
            {"source": {"component": "inputs", "pin": "DATA"},
             "targets": [{"component": "SR0", "pin": "D"}]},
            {"source": {"component": "inputs", "pin": "CLK"},
             "targets": [{"component": "SR0", "pin": "Clk"}, {"component": "SR1", "pin": "CLK"}]},
            {"source": {"component": "SR0", "pin": "I0"},
             "targets": [{"component": "SR1", "pin": "D"}]}
        ]
    }"#;

    #[test]
    fn test_factory_creation() {
        let factory = ChipFactory::new();
        assert!(format!("{:?}", factory).len() > 0);
        let chip = factory.create_by_type("sipo_shift", 8, 16).unwrap();
        assert_eq!(chip.chip_name(), "SIPO shift register");
        assert_eq!((chip.base().x, chip.base().y), (8, 16));
    }

    #[test]
    fn test_unknown_types() {
        let factory = ChipFactory::new();
        assert!(matches!(
            factory.create_by_type("intel_4003", 0, 0),
            Err(ChipError::UnknownComponentType(_))
        ));
        assert!(matches!(
            factory.create_from_dump("150 0 0 0 0 0"),
            Err(ChipError::UnknownDumpType(150))
        ));
    }

    #[test]
    fn test_cascade_loads() {
        let system = ChipFactory::new().create_from_str(CASCADE).unwrap();
        assert_eq!(system.circuit.name(), "Cascade");
        assert_eq!(system.circuit.chip_count(), 2);
        assert_eq!(system.circuit.wires().len(), 4);
        assert_eq!(system.circuit.voltage_source_count(), 16);
        assert_eq!(system.chip("SR1").unwrap().base().y, 64);
    }

    #[test]
    fn test_pin_lookup() {
        let system = ChipFactory::new().create_from_str(CASCADE).unwrap();
        let clock = system.pin("SR0", "clk").unwrap();
        assert!(system.circuit.pins().get(clock).unwrap().clock);

        assert!(matches!(
            system.pin("SR0", "Q"),
            Err(ChipError::UnknownPinLabel { .. })
        ));
        assert!(matches!(
            system.pin("SR9", "D"),
            Err(ChipError::UnknownComponent(_))
        ));
        assert!(system.pin(INPUTS_COMPONENT, "DATA").is_ok());
    }

    #[test]
    fn test_incomplete_entry() {
        let json = r#"{"name": "Bad", "chips": [{"name": "X"}]}"#;
        let result = ChipFactory::new().create_from_str(json);
        assert!(matches!(result, Err(ChipError::IncompleteChipEntry(name)) if name == "X"));
    }

    #[test]
    fn test_invalid_json() {
        let result = ChipFactory::new().create_from_str("{ not json");
        assert!(matches!(result, Err(ChipError::Json(_))));
    }
}
