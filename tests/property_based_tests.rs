//! Property-based tests for the SIPO shift register
//!
//! A reference model keeps the full history of shifted-in bits; after every
//! tick the chip's parallel outputs must equal the newest eight of them.

use proptest::prelude::*;
use sipo_sim::{Chip, ClockPhase, PinTable, PinValue, SipoShift};

fn placed() -> (SipoShift, PinTable) {
    let mut table = PinTable::new();
    let mut sr = SipoShift::new(0, 0);
    sr.setup_pins(&mut table);
    (sr, table)
}

fn tick(sr: &mut SipoShift, table: &mut PinTable, data: bool, clock: bool) {
    let pins = sr.pins().to_vec();
    table.set_value(pins[0], PinValue::from_bool(data));
    table.set_value(pins[1], PinValue::from_bool(clock));
    sr.execute(table);
}

fn outputs(sr: &SipoShift, table: &PinTable) -> u8 {
    sr.pins()[2..]
        .iter()
        .fold(0u8, |acc, &id| (acc << 1) | u8::from(table.is_high(id)))
}

fn newest_eight(history: &[bool]) -> u8 {
    history
        .iter()
        .rev()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (age, &bit)| acc | (u8::from(bit) << (7 - age)))
}

proptest! {
    #[test]
    fn outputs_track_shifted_bits(ticks in prop::collection::vec(any::<(bool, bool)>(), 0..64)) {
        let (mut sr, mut table) = placed();
        let mut history = Vec::new();
        let mut clock_was_high = false;

        for (data, clock) in ticks {
            if clock && !clock_was_high {
                history.push(data);
            }
            clock_was_high = clock;

            tick(&mut sr, &mut table, data, clock);
            prop_assert_eq!(sr.register(), newest_eight(&history));
            prop_assert_eq!(outputs(&sr, &table), newest_eight(&history));
        }
    }

    #[test]
    fn reloaded_outputs_track_shifted_bits(
        levels in prop::collection::vec(any::<bool>(), 8),
        ticks in prop::collection::vec(any::<(bool, bool)>(), 0..64),
    ) {
        let mut line = String::from("189 0 0 0 0 0");
        for level in &levels {
            line.push_str(if *level { " true" } else { " false" });
        }
        let mut table = PinTable::new();
        let mut sr = SipoShift::from_dump(&line).unwrap();
        sr.setup_pins(&mut table);
        prop_assert_eq!(outputs(&sr, &table), 0);

        let mut history = Vec::new();
        let mut clock_was_high = false;
        for (data, clock) in ticks {
            if clock && !clock_was_high {
                history.push(data);
            }
            clock_was_high = clock;

            tick(&mut sr, &mut table, data, clock);
            prop_assert_eq!(sr.register(), newest_eight(&history));
            prop_assert_eq!(outputs(&sr, &table), newest_eight(&history));
        }
    }

    #[test]
    fn held_clock_shifts_once(data in any::<bool>(), held in 1usize..32) {
        let (mut sr, mut table) = placed();
        for _ in 0..held {
            tick(&mut sr, &mut table, data, true);
            prop_assert_eq!(sr.clock_phase(), ClockPhase::Latched);
        }
        prop_assert_eq!(sr.register(), if data { 0x80 } else { 0 });
    }

    #[test]
    fn reload_always_clears_register(
        x in -1000i32..1000,
        y in -1000i32..1000,
        flags in 0u32..4096,
        levels in prop::collection::vec(any::<bool>(), 0..=8),
    ) {
        let mut line = format!("189 {} {} {} {} {}", x, y, x + 144, y, flags);
        for level in &levels {
            line.push_str(if *level { " true" } else { " false" });
        }

        let sr = SipoShift::from_dump(&line).unwrap();
        prop_assert_eq!(sr.register(), 0);
        prop_assert_eq!(sr.clock_phase(), ClockPhase::Armed);
        prop_assert_eq!(sr.post_count(), 10);
        prop_assert_eq!(sr.voltage_source_count(), 8);
        prop_assert!(!sr.has_reset());
    }
}
