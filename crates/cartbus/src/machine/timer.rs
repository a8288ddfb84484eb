//! Divider and programmable timer.
//!
//! A hidden 16-bit counter advances once per machine cycle and DIV exposes
//! bits 13:6 of it. TIMA increments on a falling edge of the counter bit
//! selected by TAC, which is how DIV writes and TAC changes can produce
//! spurious increments on hardware.

use crate::cpu::Interrupts;

use super::IoRegisters;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct Timer {
    internal_counter: u16,
    /// TIMA overflowed on the previous tick; reload and interrupt are due.
    overflow: bool,
}

impl Timer {
    /// Seeded so that DIV reads 0xAB right after boot.
    pub(super) fn power_on() -> Self {
        Self {
            internal_counter: 0x2AC0,
            overflow: false,
        }
    }

    /// Counter bit watched for TIMA increments:
    /// - 00 → bit 7 (4096 Hz)
    /// - 01 → bit 1 (262144 Hz)
    /// - 10 → bit 3 (65536 Hz)
    /// - 11 → bit 5 (16384 Hz)
    #[inline]
    fn counter_bit(&self, control: u8) -> bool {
        let mask = match control & 0x03 {
            0x01 => 1u16 << 1,
            0x02 => 1u16 << 3,
            0x03 => 1u16 << 5,
            _ => 1u16 << 7,
        };
        self.internal_counter & mask != 0
    }

    #[inline]
    fn input(&self, control: u8) -> bool {
        control & 0x04 != 0 && self.counter_bit(control)
    }

    fn increment_counter(&mut self, io: &mut IoRegisters) {
        let (next, overflow) = io.timer_counter.overflowing_add(1);
        io.timer_counter = next;
        if overflow {
            // TIMA sits at 0x00 for one cycle before the reload.
            self.overflow = true;
        }
    }

    /// Advance by one machine cycle.
    pub(super) fn tick(&mut self, io: &mut IoRegisters) {
        if self.overflow {
            self.overflow = false;
            io.timer_counter = io.timer_modulo;
            io.request(Interrupts::TIMER);
        }

        let before = self.input(io.timer_control);
        self.internal_counter = self.internal_counter.wrapping_add(1);
        if before && !self.input(io.timer_control) {
            self.increment_counter(io);
        }
        io.divider = (self.internal_counter >> 6) as u8;
    }

    /// Any write to DIV clears the whole counter.
    pub(super) fn reset_divider(&mut self, io: &mut IoRegisters) {
        if self.input(io.timer_control) {
            self.increment_counter(io);
        }
        self.internal_counter = 0;
        io.divider = 0;
    }

    /// Disabling the timer or switching the clock while the selected bit is
    /// high is a falling edge too.
    pub(super) fn write_control(&mut self, io: &mut IoRegisters, value: u8) {
        let before = self.input(io.timer_control);
        io.timer_control = value & 0x07;
        if before && !self.input(io.timer_control) {
            self.increment_counter(io);
        }
    }
}
