//! Wall-clock pacing of the machine.
//!
//! The host calls [`Driver::advance`] from whatever timer it has, passing the
//! milliseconds since the previous call. Each call runs a burst of
//! iterations; one iteration updates the peripherals in a fixed order, steps
//! the CPU once and services DMA.

mod audio;
mod config;

pub use config::{DriverConfig, DEFAULT_ITERATIONS_PER_MILLI};

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use cartbus_common::{AudioSink, Color, DisplaySink};

use crate::cartridge::{Cartridge, CartridgeMetadata};
use crate::cpu::{Cpu, Interrupts};
use crate::error::BusError;
use crate::machine::Machine;
use crate::mbc::Mbc;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use audio::ChannelGate;

/// Shared stop switch. Anything holding a clone can freeze the driver; the
/// flag is checked before every iteration, so a freeze requested during a
/// burst takes effect at the next iteration boundary.
#[derive(Clone, Debug, Default)]
pub struct FreezeHandle(Rc<Cell<bool>>);

impl FreezeHandle {
    pub fn freeze(&self) {
        self.0.set(true);
    }

    pub fn thaw(&self) {
        self.0.set(false);
    }

    pub fn is_frozen(&self) -> bool {
        self.0.get()
    }
}

/// Owns the machine and its collaborators and runs them against real time.
///
/// Two flags stop the loop: `halted` is raised internally while a cartridge
/// or save is being swapped in, `frozen` is raised by the host (pause).
pub struct Driver<C: Cpu> {
    machine: Machine,
    cpu: C,
    display: Box<dyn DisplaySink>,
    audio: ChannelGate,
    config: DriverConfig,
    halted: bool,
    frozen: FreezeHandle,
    /// Machine cycles elapsed since the last reset.
    cycles: u64,
    /// Cycles consumed by the previous iteration; the peripherals catch up
    /// on them at the start of the next one.
    last_cycles: u32,
}

impl<C: Cpu> Driver<C> {
    /// A driver with an empty cartridge slot. It stays halted until
    /// [`Driver::load_cartridge`] succeeds.
    pub fn new(
        cpu: C,
        display: Box<dyn DisplaySink>,
        audio: Box<dyn AudioSink>,
        config: DriverConfig,
    ) -> Self {
        Self {
            machine: Machine::new(),
            cpu,
            display,
            audio: ChannelGate::new(audio),
            config,
            halted: true,
            frozen: FreezeHandle::default(),
            cycles: 0,
            last_cycles: 0,
        }
    }

    /// Parse `rom` and, if it is valid and executable, replace the current
    /// cartridge and reset the machine.
    ///
    /// Nothing is touched until the header has been fully validated, so a
    /// rejected image leaves the previous cartridge running.
    pub fn load_cartridge(&mut self, rom: &[u8]) -> Result<&CartridgeMetadata> {
        let cartridge = Cartridge::parse(rom).context("invalid cartridge header")?;
        let mbc = Mbc::for_kind(cartridge.metadata().mbc_kind)
            .context("cartridge cannot be executed")?;

        self.halted = true;
        self.machine
            .insert_cartridge(cartridge, mbc, self.config.allow_color);
        self.reset_collaborators();
        self.halted = false;

        let metadata = self
            .machine
            .cartridge()
            .map(Cartridge::metadata)
            .context("cartridge slot empty after load")?;
        Ok(metadata)
    }

    /// Replace cartridge RAM with a saved blob and reset the machine.
    ///
    /// The blob must be exactly as long as the cartridge's save RAM.
    pub fn load_save_ram(&mut self, blob: &[u8]) -> Result<()> {
        let expected = self
            .machine
            .cartridge()
            .context("no cartridge loaded")?
            .save_len();
        if blob.len() != expected {
            return Err(BusError::SaveSizeMismatch {
                expected,
                actual: blob.len(),
            })
            .context("save RAM rejected");
        }

        self.halted = true;
        if let Some(cart) = self.machine.cartridge_mut() {
            cart.restore_save(blob);
        }
        self.machine.reset();
        self.reset_collaborators();
        self.halted = false;
        log::info!("driver: restored {} bytes of save RAM", blob.len());
        Ok(())
    }

    /// Current save RAM, for the host to persist.
    pub fn save_ram(&self) -> Option<&[u8]> {
        self.machine.cartridge().and_then(Cartridge::save_data)
    }

    fn reset_collaborators(&mut self) {
        self.cpu.reset(self.machine.color_mode());
        self.audio.reset();
        self.cycles = 0;
        self.last_cycles = 0;
    }

    /// Run the iterations owed for `elapsed_millis` of wall-clock time.
    ///
    /// The budget is `elapsed_millis * iterations_per_milli`, doubled in
    /// double-speed mode. An instruction that takes more than one cycle
    /// spends the extra cycles from the same budget. Returns the number of
    /// iterations actually run.
    pub fn advance(&mut self, elapsed_millis: u64) -> u64 {
        if self.halted || self.frozen.is_frozen() {
            return 0;
        }

        let millis = elapsed_millis.min(self.config.max_catch_up_millis);
        if millis < elapsed_millis {
            log::debug!("driver: clamped {elapsed_millis} ms of catch-up to {millis} ms");
        }
        let speed = if self.machine.double_speed() { 2 } else { 1 };
        let mut budget = millis
            .saturating_mul(self.config.iterations_per_milli)
            .saturating_mul(speed);

        let mut iterations = 0;
        while budget > 0 {
            if self.frozen.is_frozen() || self.halted {
                break;
            }
            let cycles = self.iterate();
            budget = budget.saturating_sub(cycles as u64);
            iterations += 1;
        }
        iterations
    }

    /// One pass over every component, in a fixed order. Returns the cycles
    /// it consumed.
    pub fn iterate(&mut self) -> u32 {
        let elapsed = self.last_cycles;

        let events = self.machine.update_display(elapsed);
        if events.switched_off {
            self.blank_display();
        }
        self.machine.update_timer(elapsed);
        self.audio.update(&self.machine.memory.high);
        self.dispatch_interrupts();

        let cycles = if self.cpu.in_standby() {
            1
        } else {
            self.cpu.step(&mut self.machine).max(1)
        };
        self.cycles += cycles as u64;

        if self.machine.io.dma != 0 {
            self.machine.run_oam_dma();
        }
        if self.machine.hdma_active() && self.machine.color_mode() {
            self.machine.run_hdma(events.hblanks);
        }

        self.last_cycles = cycles;
        cycles
    }

    fn dispatch_interrupts(&mut self) {
        let requested = self.machine.io.interrupt_flag & self.machine.memory.interrupt_enable;
        let pending = Interrupts::from_bits_truncate(requested);
        if pending.is_empty() {
            return;
        }
        if let Some(serviced) = self.cpu.dispatch_interrupt(&mut self.machine, pending) {
            log::trace!("driver: serviced {:?}", serviced);
            self.machine.io.interrupt_flag &= !serviced.bits();
        }
    }

    /// A switched-off LCD shows a blank, white screen.
    fn blank_display(&mut self) {
        let white = Color::WHITE.packed();
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                self.display.put_pixel(x, y, white);
            }
        }
    }

    pub fn freeze(&self) {
        self.frozen.freeze();
    }

    pub fn thaw(&self) {
        self.frozen.thaw();
    }

    /// A handle that can freeze this driver from elsewhere, including from
    /// inside a collaborator while a burst is running.
    pub fn freeze_handle(&self) -> FreezeHandle {
        self.frozen.clone()
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_frozen()
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[inline]
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    #[inline]
    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    #[inline]
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    #[inline]
    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    #[inline]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests;
