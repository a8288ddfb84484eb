use crate::cartridge::Cartridge;

use super::{BankController, BankingRegisters};

/// RAM bank selects at or above this value map the clock register instead
/// of RAM.
const RTC_SELECT: u8 = 0x07;

/// MBC3 with a single scalar standing in for the clock registers.
///
/// RAM bank 0 selects bank 1, as on MBC1. Clock latching (0x6000-0x7FFF)
/// is accepted and ignored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Mbc3;

impl BankController for Mbc3 {
    fn read(&self, cart: &Cartridge, regs: &BankingRegisters, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => super::read_banked_rom(cart, regs, addr),
            0xA000..=0xBFFF if regs.ram_bank >= RTC_SELECT => regs.rtc,
            0xA000..=0xBFFF => {
                super::read_ram(cart, super::non_zero_bank(regs.ram_bank), addr)
            }
            _ => 0xFF,
        }
    }

    fn write(&self, cart: &mut Cartridge, regs: &mut BankingRegisters, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => regs.ram_enable = value,
            0x2000..=0x3FFF => {
                log::debug!("mbc3: ROM bank <- 0x{value:02X}");
                regs.rom_bank = value;
            }
            0x4000..=0x5FFF => regs.ram_bank = value,
            0x6000..=0x7FFF => log::trace!("mbc3: clock latch 0x{value:02X} ignored"),
            0xA000..=0xBFFF if regs.ram_bank >= RTC_SELECT => regs.rtc = value,
            0xA000..=0xBFFF => {
                super::write_ram(cart, super::non_zero_bank(regs.ram_bank), addr, value)
            }
            _ => {}
        }
    }
}
