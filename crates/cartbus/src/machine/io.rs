//! The 0xFF00-0xFF7F register window.

use crate::cpu::Interrupts;

use super::Machine;

/// Memory-mapped peripheral registers that have dedicated storage.
///
/// Only reachable through [`Machine::read_io`] / [`Machine::write_io`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IoRegisters {
    /// P1 select bits (4-5).
    pub joypad: u8,
    pub serial_data: u8,
    pub serial_control: u8,
    pub divider: u8,
    pub timer_counter: u8,
    pub timer_modulo: u8,
    pub timer_control: u8,
    pub interrupt_flag: u8,
    pub lcdc: u8,
    pub lcd_status: u8,
    pub scy: u8,
    pub scx: u8,
    pub ly: u8,
    pub lyc: u8,
    /// OAM DMA trigger; non-zero means a transfer from `dma << 8` is due.
    pub dma: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,
    pub wy: u8,
    pub wx: u8,
    /// KEY1: bit 7 current speed, bit 0 switch armed.
    pub speed: u8,
    pub vram_bank: u8,
    pub boot_rom_disabled: bool,
    /// Pressed buttons (bit0 A, bit1 B, bit2 Select, bit3 Start).
    pub buttons: u8,
    /// Pressed directions (bit0 Right, bit1 Left, bit2 Up, bit3 Down).
    pub dpad: u8,
}

impl IoRegisters {
    /// Register values left behind by the DMG boot ROM.
    pub const fn power_on() -> Self {
        Self {
            joypad: 0x00,
            serial_data: 0x00,
            serial_control: 0x7E,
            divider: 0xAB,
            timer_counter: 0x00,
            timer_modulo: 0x00,
            timer_control: 0x00,
            interrupt_flag: 0x01,
            lcdc: 0x91,
            lcd_status: 0x85,
            scy: 0x00,
            scx: 0x00,
            ly: 0x00,
            lyc: 0x00,
            dma: 0x00,
            bgp: 0xFC,
            obp0: 0x00,
            obp1: 0x00,
            wy: 0x00,
            wx: 0x00,
            speed: 0x00,
            vram_bank: 0x00,
            boot_rom_disabled: true,
            buttons: 0x00,
            dpad: 0x00,
        }
    }

    #[inline]
    pub fn request(&mut self, interrupts: Interrupts) {
        self.interrupt_flag |= interrupts.bits();
    }

    #[inline]
    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & 0x80 != 0
    }

    fn read_joypad(&self) -> u8 {
        let select = self.joypad & 0x30;
        let mut low = 0x0F;
        if select & 0x10 == 0 {
            low &= !self.dpad;
        }
        if select & 0x20 == 0 {
            low &= !self.buttons;
        }
        0xC0 | select | (low & 0x0F)
    }
}

impl Default for IoRegisters {
    fn default() -> Self {
        Self::power_on()
    }
}

/// Joypad inputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Machine {
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let (latch, bit) = match button {
            Button::Right => (&mut self.io.dpad, 0),
            Button::Left => (&mut self.io.dpad, 1),
            Button::Up => (&mut self.io.dpad, 2),
            Button::Down => (&mut self.io.dpad, 3),
            Button::A => (&mut self.io.buttons, 0),
            Button::B => (&mut self.io.buttons, 1),
            Button::Select => (&mut self.io.buttons, 2),
            Button::Start => (&mut self.io.buttons, 3),
        };
        let mask = 1u8 << bit;
        if pressed {
            *latch |= mask;
            self.io.request(Interrupts::JOYPAD);
        } else {
            *latch &= !mask;
        }
    }

    /// Decode a read inside 0xFF00-0xFF7F.
    pub(crate) fn read_io(&self, addr: u16) -> u8 {
        let io = &self.io;
        match addr {
            0xFF00 => io.read_joypad(),
            0xFF01 => io.serial_data,
            0xFF02 => io.serial_control | 0x7E,
            0xFF04 => io.divider,
            0xFF05 => io.timer_counter,
            0xFF06 => io.timer_modulo,
            0xFF07 => io.timer_control | 0xF8,
            0xFF0F => io.interrupt_flag | 0xE0,
            0xFF40 => io.lcdc,
            0xFF41 => io.lcd_status | 0x80,
            0xFF42 => io.scy,
            0xFF43 => io.scx,
            0xFF44 => io.ly,
            0xFF45 => io.lyc,
            0xFF46 => io.dma,
            0xFF47 => io.bgp,
            0xFF48 => io.obp0,
            0xFF49 => io.obp1,
            0xFF4A => io.wy,
            0xFF4B => io.wx,
            0xFF4D if self.color_mode => 0x7E | io.speed,
            0xFF4F if self.color_mode => 0xFE | (io.vram_bank & 0x01),
            0xFF50 => 0xFE | io.boot_rom_disabled as u8,
            0xFF70 if self.color_mode => 0xF8 | (self.banks.wram_bank & 0x07),
            0xFF4D | 0xFF4F | 0xFF70 => 0xFF,
            // Audio, wave RAM, VRAM DMA and CGB palettes.
            _ => self.memory.high[(addr & 0xFF) as usize],
        }
    }

    /// Decode a write inside 0xFF00-0xFF7F.
    pub(crate) fn write_io(&mut self, addr: u16, value: u8) {
        match addr {
            0xFF00 => self.io.joypad = value & 0x30,
            0xFF01 => self.io.serial_data = value,
            0xFF02 => self.io.serial_control = value & 0x81,
            0xFF04 => self.timer.reset_divider(&mut self.io),
            0xFF05 => self.io.timer_counter = value,
            0xFF06 => self.io.timer_modulo = value,
            0xFF07 => self.timer.write_control(&mut self.io, value),
            0xFF0F => self.io.interrupt_flag = value & 0x1F,
            0xFF40 => self.io.lcdc = value,
            0xFF41 => self.io.lcd_status = (self.io.lcd_status & 0x07) | (value & 0x78),
            0xFF42 => self.io.scy = value,
            0xFF43 => self.io.scx = value,
            0xFF44 => log::trace!("io: write to read-only LY ignored"),
            0xFF45 => self.io.lyc = value,
            0xFF46 => {
                log::debug!("io: OAM DMA requested from 0x{value:02X}00");
                self.io.dma = value;
            }
            0xFF47 => self.io.bgp = value,
            0xFF48 => self.io.obp0 = value,
            0xFF49 => self.io.obp1 = value,
            0xFF4A => self.io.wy = value,
            0xFF4B => self.io.wx = value,
            0xFF4D if self.color_mode => self.io.speed = (self.io.speed & 0x80) | (value & 0x01),
            0xFF4F if self.color_mode => self.io.vram_bank = value,
            0xFF50 => self.io.boot_rom_disabled |= value != 0,
            0xFF55 if self.color_mode => {
                self.memory.high[0x55] = value;
                self.start_hdma(value);
            }
            0xFF70 if self.color_mode => {
                log::debug!("io: WRAM bank <- 0x{value:02X}");
                self.banks.wram_bank = value;
            }
            0xFF4D | 0xFF4F | 0xFF70 => {}
            _ => self.memory.high[(addr & 0xFF) as usize] = value,
        }
    }
}
