use log::error;
use sipo_sim::circuit_config::{ChipFactory, ConfiguredCircuit, INPUTS_COMPONENT};
use sipo_sim::error::ChipResult;
use std::process;

const DEFAULT_CONFIG: &str = "configs/sipo_cascade.json";

fn main() {
    env_logger::init();

    println!("SIPO Shift Register - Cascade Example");
    println!("=====================================");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let factory = ChipFactory::new();
    let mut system = match factory.create_from_json(&path) {
        Ok(system) => system,
        Err(e) => {
            error!("Failed to load circuit: {}", e);
            process::exit(1);
        }
    };

    println!("Loaded '{}' from {}", system.circuit.name(), path);
    if !system.config.description.is_empty() {
        println!("  {}", system.config.description);
    }
    println!("  Chips: {}", system.circuit.chip_count());
    println!("  Voltage sources: {}", system.circuit.voltage_source_count());
    println!();

    if let Err(e) = run_pattern(&mut system, 0xA5C3) {
        error!("Simulation failed: {}", e);
        process::exit(1);
    }
}

/// Clock a 16-bit word in, least significant bit first, printing every register.
fn run_pattern(system: &mut ConfiguredCircuit, word: u16) -> ChipResult<()> {
    let data = system.pin(INPUTS_COMPONENT, "DATA")?;
    let clock = system.pin(INPUTS_COMPONENT, "CLK")?;
    let names: Vec<String> = system.config.chips.iter().map(|c| c.name.clone()).collect();

    println!("Clocking in 0x{:04X}, LSB first...", word);
    for i in 0..16 {
        let bit = (word >> i) & 1 == 1;
        system.circuit.clock_in(data, clock, bit);

        let registers: Vec<String> = names
            .iter()
            .filter_map(|name| system.output_byte(name).map(|b| format!("{}={:08b}", name, b)))
            .collect();
        println!("  edge {:2}: D={} {}", i + 1, u8::from(bit), registers.join(" "));
    }

    println!();
    println!("Placement lines after {} ticks:", system.circuit.tick_count());
    for line in system.circuit.dump() {
        println!("  {}", line);
    }
    Ok(())
}
