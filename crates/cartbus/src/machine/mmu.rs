use crate::bus::Bus;
use crate::error::BusError;
use crate::mbc::BankController;

use super::memory::WRAM_BANKS;
use super::Machine;

impl Machine {
    /// Decode a read across the full 16-bit address space.
    ///
    /// Fails only for 0xFEA0-0xFEFF, which no region claims.
    pub fn try_read(&self, addr: u16) -> Result<u8, BusError> {
        let value = match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.read_cartridge(addr),
            0x8000..=0x9FFF => self.memory.vram[self.vram_bank()][(addr - 0x8000) as usize],
            0xC000..=0xCFFF => self.memory.wram[0][(addr - 0xC000) as usize],
            0xD000..=0xDFFF => self.memory.wram[self.wram_bank()][(addr - 0xD000) as usize],
            // Echo RAM aliases the same storage, with the same bank rule.
            0xE000..=0xEFFF => self.memory.wram[0][(addr - 0xE000) as usize],
            0xF000..=0xFDFF => self.memory.wram[self.wram_bank()][(addr - 0xF000) as usize],
            0xFE00..=0xFE9F => self.memory.oam[(addr - 0xFE00) as usize],
            0xFF00..=0xFF7F => self.read_io(addr),
            0xFF80..=0xFFFE => self.memory.high[(addr & 0xFF) as usize],
            0xFFFF => self.memory.interrupt_enable,
            _ => return Err(BusError::InvalidAddress(addr)),
        };
        Ok(value)
    }

    /// Decode a write across the full 16-bit address space.
    pub fn try_write(&mut self, addr: u16, value: u8) -> Result<(), BusError> {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => self.write_cartridge(addr, value),
            0x8000..=0x9FFF => {
                let bank = self.vram_bank();
                self.memory.vram[bank][(addr - 0x8000) as usize] = value;
            }
            0xC000..=0xCFFF => self.memory.wram[0][(addr - 0xC000) as usize] = value,
            0xD000..=0xDFFF => {
                let bank = self.wram_bank();
                self.memory.wram[bank][(addr - 0xD000) as usize] = value;
            }
            0xE000..=0xEFFF => self.memory.wram[0][(addr - 0xE000) as usize] = value,
            0xF000..=0xFDFF => {
                let bank = self.wram_bank();
                self.memory.wram[bank][(addr - 0xF000) as usize] = value;
            }
            0xFE00..=0xFE9F => self.memory.oam[(addr - 0xFE00) as usize] = value,
            0xFF00..=0xFF7F => self.write_io(addr, value),
            0xFF80..=0xFFFE => self.memory.high[(addr & 0xFF) as usize] = value,
            0xFFFF => self.memory.interrupt_enable = value,
            _ => return Err(BusError::InvalidAddress(addr)),
        }
        Ok(())
    }

    /// VRAM bank mapped at 0x8000. Bank 1 only exists in color mode.
    #[inline]
    pub(crate) fn vram_bank(&self) -> usize {
        if self.color_mode {
            self.io.vram_bank as usize % 2
        } else {
            0
        }
    }

    /// WRAM bank mapped at 0xD000; a selection of 0 maps bank 1.
    #[inline]
    pub(crate) fn wram_bank(&self) -> usize {
        match self.banks.wram_bank as usize % WRAM_BANKS {
            0 => 1,
            bank => bank,
        }
    }

    fn read_cartridge(&self, addr: u16) -> u8 {
        match (&self.mbc, &self.cartridge) {
            (Some(mbc), Some(cart)) => mbc.read(cart, &self.banks, addr),
            _ => 0xFF,
        }
    }

    fn write_cartridge(&mut self, addr: u16, value: u8) {
        match (&self.mbc, &mut self.cartridge) {
            (Some(mbc), Some(cart)) => mbc.write(cart, &mut self.banks, addr, value),
            _ => log::trace!("mmu: write 0x{addr:04X} with empty cartridge slot"),
        }
    }
}

impl Bus for Machine {
    fn read8(&mut self, addr: u16) -> u8 {
        self.try_read(addr).unwrap_or_else(|err| {
            log::warn!("mmu: {err}; reading 0xFF");
            0xFF
        })
    }

    fn write8(&mut self, addr: u16, value: u8) {
        if let Err(err) = self.try_write(addr, value) {
            log::warn!("mmu: {err}; write of 0x{value:02X} dropped");
        }
    }

    fn speed_switch(&mut self) -> bool {
        if !self.color_mode || self.io.speed & 0x01 == 0 {
            return false;
        }
        self.io.speed = (self.io.speed ^ 0x80) & 0x80;
        log::debug!("mmu: speed switch, double speed = {}", self.double_speed());
        true
    }
}
