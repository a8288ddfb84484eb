use crate::cartridge::header::MBC2_RAM_SIZE;
use crate::cartridge::Cartridge;

use super::{BankController, BankingRegisters};

/// Address bit that routes a 0x0000-0x3FFF write to the ROM bank register
/// (set) or the RAM enable latch (clear).
const REGISTER_SELECT_BIT: u16 = 1 << 7;

/// MBC2: MBC1-style ROM banking plus 512 half-bytes of built-in RAM,
/// mirrored across the whole 0xA000-0xBFFF window.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Mbc2;

impl Mbc2 {
    #[inline]
    fn builtin_index(addr: u16) -> usize {
        match addr {
            0xA000..=0xA1FF => (addr - 0xA000) as usize,
            _ => (addr - 0xA200) as usize & (MBC2_RAM_SIZE - 1),
        }
    }
}

impl BankController for Mbc2 {
    fn read(&self, cart: &Cartridge, regs: &BankingRegisters, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => super::read_banked_rom(cart, regs, addr),
            0xA000..=0xBFFF => cart
                .builtin_ram
                .as_ref()
                .and_then(|ram| ram.get(Self::builtin_index(addr)))
                .map_or(0xFF, |&b| b & 0x0F),
            _ => 0xFF,
        }
    }

    fn write(&self, cart: &mut Cartridge, regs: &mut BankingRegisters, addr: u16, value: u8) {
        match addr {
            0x0000..=0x3FFF => {
                if addr & REGISTER_SELECT_BIT != 0 {
                    log::debug!("mbc2: ROM bank <- 0x{value:02X}");
                    regs.rom_bank = value;
                } else {
                    regs.ram_enable = value;
                }
            }
            0xA000..=0xBFFF => {
                let index = Self::builtin_index(addr);
                if let Some(slot) = cart.builtin_ram.as_mut().and_then(|ram| ram.get_mut(index)) {
                    *slot = value;
                }
            }
            _ => {}
        }
    }
}
