//! The interface the execution driver expects from a CPU core.

use bitflags::bitflags;

use crate::bus::Bus;

bitflags! {
    /// Interrupt sources, as laid out in IF (0xFF0F) and IE (0xFFFF).
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Interrupts: u8 {
        const VBLANK = 0x01;
        const LCD_STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

impl Interrupts {
    /// The source serviced first when several are pending.
    pub fn highest_priority(self) -> Option<Interrupts> {
        let bits = self.bits();
        (bits != 0).then(|| Interrupts::from_bits_truncate(bits & bits.wrapping_neg()))
    }

    /// Jump vector of a single source.
    pub fn vector(self) -> Option<u16> {
        let bit = self.bits();
        (bit.count_ones() == 1).then(|| 0x40 + 8 * bit.trailing_zeros() as u16)
    }
}

/// A CPU core driven by [`crate::driver::Driver`].
///
/// Instruction decode and execution are not part of this crate; the driver
/// only needs to step the core, ask whether it is in standby, and offer it
/// pending interrupts.
pub trait Cpu {
    /// Execute one instruction and return the machine cycles it took.
    ///
    /// A return of more than one cycle is charged against the driver's
    /// iteration budget so that long instructions catch up in real time.
    fn step(&mut self, bus: &mut dyn Bus) -> u32;

    /// HALT or STOP: the driver skips `step` and only advances time.
    fn in_standby(&self) -> bool;

    /// Offer the pending sources (IF & IE). Return the source that was
    /// serviced, if any; the driver clears it from IF.
    fn dispatch_interrupt(&mut self, bus: &mut dyn Bus, pending: Interrupts)
        -> Option<Interrupts>;

    /// Restore the register file to its post-boot state.
    fn reset(&mut self, color: bool);
}
