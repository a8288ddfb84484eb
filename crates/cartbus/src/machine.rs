//! All mutable console state, bundled so the driver can own it outright.

mod dma;
mod io;
mod lcd;
mod memory;
mod mmu;
mod timer;

pub use io::{Button, IoRegisters};
pub use lcd::LcdEvents;
pub use memory::{MachineMemory, OAM_SIZE, VRAM_BANK_SIZE, WRAM_BANKS, WRAM_BANK_SIZE};

use crate::cartridge::Cartridge;
use crate::error::BusError;
use crate::mbc::{BankingRegisters, Mbc};

use dma::Hdma;
use lcd::LcdTiming;
use timer::Timer;

/// Cartridge, bank registers, IO registers and console RAM.
///
/// Reads and writes go through [`Machine::try_read`] / [`Machine::try_write`]
/// or, for CPU cores, the infallible [`crate::bus::Bus`] implementation.
#[derive(Clone, Debug)]
pub struct Machine {
    cartridge: Option<Cartridge>,
    mbc: Option<Mbc>,
    pub banks: BankingRegisters,
    pub io: IoRegisters,
    pub memory: MachineMemory,
    timer: Timer,
    lcd: LcdTiming,
    hdma: Hdma,
    color_mode: bool,
    /// Odd CPU cycle carried over while the LCD runs at half rate.
    lcd_subcycle: u8,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// A powered-on console with an empty cartridge slot. Cartridge space
    /// reads as 0xFF until something is inserted.
    pub fn new() -> Self {
        Self {
            cartridge: None,
            mbc: None,
            banks: BankingRegisters::power_on(),
            io: IoRegisters::power_on(),
            memory: MachineMemory::power_on(),
            timer: Timer::power_on(),
            lcd: LcdTiming::default(),
            hdma: Hdma::default(),
            color_mode: false,
            lcd_subcycle: 0,
        }
    }

    /// A powered-on console with `cartridge` inserted.
    pub fn with_cartridge(cartridge: Cartridge, allow_color: bool) -> Result<Self, BusError> {
        let mbc = Mbc::for_kind(cartridge.metadata().mbc_kind)?;
        let mut machine = Self::new();
        machine.insert_cartridge(cartridge, mbc, allow_color);
        Ok(machine)
    }

    /// Swap in a new cartridge and reset everything else to power-on state.
    pub(crate) fn insert_cartridge(&mut self, cartridge: Cartridge, mbc: Mbc, allow_color: bool) {
        self.color_mode = allow_color && cartridge.metadata().supports_color;
        self.cartridge = Some(cartridge);
        self.mbc = Some(mbc);
        self.reset();
    }

    /// Power-on reset of everything except the cartridge and its RAM.
    pub fn reset(&mut self) {
        self.banks = BankingRegisters::power_on();
        self.io = IoRegisters::power_on();
        self.memory = MachineMemory::power_on();
        self.timer = Timer::power_on();
        self.lcd = LcdTiming::default();
        self.hdma = Hdma::default();
        self.lcd_subcycle = 0;
        log::info!("machine: reset (color={})", self.color_mode);
    }

    #[inline]
    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    #[inline]
    pub(crate) fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    #[inline]
    pub fn color_mode(&self) -> bool {
        self.color_mode
    }

    #[inline]
    pub fn double_speed(&self) -> bool {
        self.color_mode && self.io.speed & 0x80 != 0
    }

    /// Advance DIV/TIMA by `cycles` machine cycles.
    pub fn update_timer(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.timer.tick(&mut self.io);
        }
    }

    /// Advance LY/STAT by `cycles` CPU machine cycles. In double speed the
    /// LCD runs at half the CPU rate.
    pub fn update_display(&mut self, cycles: u32) -> LcdEvents {
        let lcd_cycles = if self.double_speed() {
            let total = self.lcd_subcycle as u32 + cycles;
            self.lcd_subcycle = (total & 1) as u8;
            total / 2
        } else {
            self.lcd_subcycle = 0;
            cycles
        };
        self.lcd.update(&mut self.io, lcd_cycles)
    }
}
