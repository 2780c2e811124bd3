// Register components module
pub mod sipo_shift;

// Re-export the register types
pub use sipo_shift::{ClockPhase, SipoShift};
