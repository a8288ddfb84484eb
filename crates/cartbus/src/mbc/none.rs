use crate::cartridge::Cartridge;

use super::{BankController, BankingRegisters};

/// Plain 32 KiB cartridge with no controller.
///
/// ROM writes go straight into the image. Real hardware ignores them; the
/// pass-through is kept because some homebrew relies on it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct NoMbc;

impl BankController for NoMbc {
    fn read(&self, cart: &Cartridge, _regs: &BankingRegisters, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => cart.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0xA000..=0xBFFF => super::read_ram(cart, 0, addr),
            _ => 0xFF,
        }
    }

    fn write(&self, cart: &mut Cartridge, _regs: &mut BankingRegisters, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => {
                if let Some(slot) = cart.rom.get_mut(addr as usize) {
                    *slot = value;
                }
            }
            0xA000..=0xBFFF => super::write_ram(cart, 0, addr, value),
            _ => {}
        }
    }
}
