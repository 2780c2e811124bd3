//! # SIPO Shift Register Simulator
//!
//! An edge-triggered 8-bit serial-in, parallel-out shift register chip for a
//! discrete-time logic circuit simulator.
//!
//! This library provides:
//! - The `SipoShift` chip with its fixed 10-pin layout and rising-edge shifting
//! - A `Chip` trait and shared `ChipBase` for placement, footprint and pin handles
//! - A circuit-owned pin table addressed by `PinId` handles
//! - A deterministic stepper that runs every chip once per tick
//! - JSON circuit descriptions and placement-line parsing

pub mod circuit;
pub mod circuit_config;
pub mod component;
pub mod components;
pub mod error;
pub mod pin;

// Re-export commonly used items for easier importing
pub use circuit::{ChipId, Circuit};
pub use component::{Chip, ChipBase, Placement};
pub use components::register::{ClockPhase, SipoShift};
pub use error::{ChipError, ChipResult};
pub use pin::{Pin, PinId, PinTable, PinValue};
