//! Memory bank controllers.
//!
//! Each controller decodes the two cartridge windows (0x0000-0x7FFF and
//! 0xA000-0xBFFF). Everything else is decoded by the MMU before a controller
//! is consulted. Bank state lives in [`BankingRegisters`] rather than in the
//! controllers, so the controllers themselves are stateless.

mod mbc1;
mod mbc2;
mod mbc3;
mod none;

pub use mbc1::Mbc1;
pub use mbc2::Mbc2;
pub use mbc3::Mbc3;
pub use none::NoMbc;

use crate::cartridge::header::{RAM_BANK_SIZE, ROM_BANK_SIZE};
use crate::cartridge::{Cartridge, MbcKind};
use crate::error::BusError;

/// Cartridge-side bank selection state.
///
/// Registers hold the raw byte last written; bank indices are reduced modulo
/// the physical bank count at access time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BankingRegisters {
    /// Recorded, but does not gate RAM access.
    pub ram_enable: u8,
    pub rom_bank: u8,
    pub ram_bank: u8,
    /// SVBK: working RAM bank mapped at 0xD000.
    pub wram_bank: u8,
    /// Recorded, but addressing always behaves as mode 0.
    pub banking_mode: u8,
    /// Single stand-in for the MBC3 clock registers.
    pub rtc: u8,
}

impl BankingRegisters {
    pub const fn power_on() -> Self {
        Self {
            ram_enable: 0,
            rom_bank: 1,
            ram_bank: 0,
            wram_bank: 1,
            banking_mode: 0,
            rtc: 0,
        }
    }
}

impl Default for BankingRegisters {
    fn default() -> Self {
        Self::power_on()
    }
}

/// Address decoding for one controller family.
pub trait BankController {
    fn read(&self, cart: &Cartridge, regs: &BankingRegisters, addr: u16) -> u8;
    fn write(&self, cart: &mut Cartridge, regs: &mut BankingRegisters, addr: u16, value: u8);
}

/// The controllers the MMU can execute.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mbc {
    None(NoMbc),
    Mbc1(Mbc1),
    Mbc2(Mbc2),
    Mbc3(Mbc3),
}

impl Mbc {
    /// Pick the decoder for `kind`, rejecting families that are recognised
    /// by the header parser but not implemented.
    pub fn for_kind(kind: MbcKind) -> Result<Self, BusError> {
        match kind {
            MbcKind::None => Ok(Mbc::None(NoMbc)),
            MbcKind::Mbc1 => Ok(Mbc::Mbc1(Mbc1)),
            MbcKind::Mbc2 => Ok(Mbc::Mbc2(Mbc2)),
            MbcKind::Mbc3 => Ok(Mbc::Mbc3(Mbc3)),
            other => Err(BusError::UnsupportedMbc(other)),
        }
    }
}

impl BankController for Mbc {
    fn read(&self, cart: &Cartridge, regs: &BankingRegisters, addr: u16) -> u8 {
        match self {
            Mbc::None(m) => m.read(cart, regs, addr),
            Mbc::Mbc1(m) => m.read(cart, regs, addr),
            Mbc::Mbc2(m) => m.read(cart, regs, addr),
            Mbc::Mbc3(m) => m.read(cart, regs, addr),
        }
    }

    fn write(&self, cart: &mut Cartridge, regs: &mut BankingRegisters, addr: u16, value: u8) {
        match self {
            Mbc::None(m) => m.write(cart, regs, addr, value),
            Mbc::Mbc1(m) => m.write(cart, regs, addr, value),
            Mbc::Mbc2(m) => m.write(cart, regs, addr, value),
            Mbc::Mbc3(m) => m.write(cart, regs, addr, value),
        }
    }
}

/// Bank number 0 cannot be selected into a switchable window; it reads as 1.
#[inline]
fn non_zero_bank(bank: u8) -> usize {
    if bank == 0 {
        1
    } else {
        bank as usize
    }
}

/// ROM read shared by the banked controllers: bank 0 fixed at 0x0000-0x3FFF,
/// `rom_bank` at 0x4000-0x7FFF.
fn read_banked_rom(cart: &Cartridge, regs: &BankingRegisters, addr: u16) -> u8 {
    let bank = if addr < 0x4000 {
        0
    } else {
        non_zero_bank(regs.rom_bank) % cart.rom_banks()
    };
    let index = bank * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
    cart.rom.get(index).copied().unwrap_or(0xFF)
}

/// Byte offset of `addr` within external RAM bank `bank`, or `None` when the
/// cartridge has no RAM.
fn ram_index(cart: &Cartridge, bank: usize, addr: u16) -> Option<usize> {
    let banks = cart.ram_banks();
    if banks == 0 {
        return None;
    }
    let offset = (addr as usize - 0xA000) & (RAM_BANK_SIZE - 1);
    Some((bank % banks) * RAM_BANK_SIZE + offset)
}

fn read_ram(cart: &Cartridge, bank: usize, addr: u16) -> u8 {
    match (ram_index(cart, bank, addr), cart.ram.as_ref()) {
        (Some(index), Some(ram)) => ram.get(index).copied().unwrap_or(0xFF),
        _ => 0xFF,
    }
}

fn write_ram(cart: &mut Cartridge, bank: usize, addr: u16, value: u8) {
    let Some(index) = ram_index(cart, bank, addr) else {
        log::trace!("mbc: RAM write 0x{addr:04X} dropped, cartridge has no RAM");
        return;
    };
    if let Some(slot) = cart.ram.as_mut().and_then(|ram| ram.get_mut(index)) {
        *slot = value;
    }
}
