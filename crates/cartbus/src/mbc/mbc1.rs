use crate::cartridge::Cartridge;

use super::{BankController, BankingRegisters};

/// MBC1 in ROM banking mode.
///
/// The banking mode register is recorded but never switches to the
/// large-RAM layout. The RAM window is banked by the ROM bank register
/// (bank 0 selecting bank 1), not by the RAM bank register.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Mbc1;

impl Mbc1 {
    fn ram_bank(regs: &BankingRegisters) -> usize {
        super::non_zero_bank(regs.rom_bank)
    }
}

impl BankController for Mbc1 {
    fn read(&self, cart: &Cartridge, regs: &BankingRegisters, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => super::read_banked_rom(cart, regs, addr),
            0xA000..=0xBFFF => super::read_ram(cart, Self::ram_bank(regs), addr),
            _ => 0xFF,
        }
    }

    fn write(&self, cart: &mut Cartridge, regs: &mut BankingRegisters, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => regs.ram_enable = value,
            0x2000..=0x3FFF => {
                log::debug!("mbc1: ROM bank <- 0x{value:02X}");
                regs.rom_bank = value;
            }
            0x4000..=0x5FFF => regs.ram_bank = value,
            0x6000..=0x7FFF => regs.banking_mode = value,
            0xA000..=0xBFFF => super::write_ram(cart, Self::ram_bank(regs), addr, value),
            _ => {}
        }
    }
}
