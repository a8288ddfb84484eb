use std::cell::RefCell;
use std::rc::Rc;

use cartbus_common::{AudioChannel, AudioSink, DisplaySink, NullAudio, NullDisplay};

use super::{Driver, DriverConfig, FreezeHandle};
use crate::bus::Bus;
use crate::cpu::{Cpu, Interrupts};
use crate::error::{BusError, CartridgeError};
use crate::testing::{fix_checksum, header_image};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// CPU stand-in: every step bumps a register and performs any scripted
/// writes queued for that step.
#[derive(Default)]
struct ScriptedCpu {
    regs: [u8; 8],
    steps: u32,
    cycles_per_step: u32,
    standby: bool,
    ime: bool,
    resets: u32,
    writes: Vec<(u32, u16, u8)>,
    freeze_at: Option<(u32, FreezeHandle)>,
    serviced: Vec<Interrupts>,
}

impl Cpu for ScriptedCpu {
    fn step(&mut self, bus: &mut dyn Bus) -> u32 {
        self.steps += 1;
        self.regs[0] = self.regs[0].wrapping_add(1);
        for &(step, addr, value) in &self.writes {
            if step == self.steps {
                bus.write8(addr, value);
            }
        }
        if let Some((step, handle)) = &self.freeze_at {
            if *step == self.steps {
                handle.freeze();
            }
        }
        self.cycles_per_step.max(1)
    }

    fn in_standby(&self) -> bool {
        self.standby
    }

    fn dispatch_interrupt(
        &mut self,
        _bus: &mut dyn Bus,
        pending: Interrupts,
    ) -> Option<Interrupts> {
        if !self.ime {
            return None;
        }
        let first = pending.highest_priority()?;
        self.serviced.push(first);
        Some(first)
    }

    fn reset(&mut self, _color: bool) {
        self.regs = [0; 8];
        self.resets += 1;
    }
}

#[derive(Clone, Default)]
struct CountingDisplay(Rc<RefCell<Vec<(usize, usize, u32)>>>);

impl DisplaySink for CountingDisplay {
    fn put_pixel(&mut self, x: usize, y: usize, rgb: u32) {
        self.0.borrow_mut().push((x, y, rgb));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioEvent {
    Channel(AudioChannel, bool),
    Stop,
}

#[derive(Clone, Default)]
struct RecordingAudio(Rc<RefCell<Vec<AudioEvent>>>);

impl AudioSink for RecordingAudio {
    fn set_channel_enabled(&mut self, channel: AudioChannel, enabled: bool) {
        self.0.borrow_mut().push(AudioEvent::Channel(channel, enabled));
    }

    fn stop(&mut self) {
        self.0.borrow_mut().push(AudioEvent::Stop);
    }
}

fn config() -> DriverConfig {
    DriverConfig::builder().iterations_per_milli(100).build()
}

fn driver_with(cpu: ScriptedCpu) -> Driver<ScriptedCpu> {
    let mut driver = Driver::new(cpu, Box::new(NullDisplay), Box::new(NullAudio), config());
    driver.load_cartridge(&header_image(0x00, 0x00, 0x02)).unwrap();
    driver
}

fn step_cpu(cycles: u32) -> ScriptedCpu {
    ScriptedCpu {
        cycles_per_step: cycles,
        ..ScriptedCpu::default()
    }
}

#[test]
fn config_defaults() {
    let config = DriverConfig::default();
    assert_eq!(config.iterations_per_milli, super::DEFAULT_ITERATIONS_PER_MILLI);
    assert!(config.allow_color);
    assert_eq!(config.max_catch_up_millis, 250);
}

#[test]
fn stays_halted_until_a_cartridge_loads() {
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        config(),
    );
    assert!(driver.is_halted());
    assert_eq!(driver.advance(10), 0);

    let meta = driver.load_cartridge(&header_image(0x00, 0x00, 0x02)).unwrap();
    assert_eq!(meta.title, "TEST");
    assert!(!driver.is_halted());
    assert_eq!(driver.cpu().resets, 1);
}

#[test]
fn runs_iterations_owed_for_elapsed_time() {
    let mut driver = driver_with(step_cpu(1));
    assert_eq!(driver.advance(3), 300);
    assert_eq!(driver.cpu().steps, 300);
    assert_eq!(driver.cycles(), 300);
    assert_eq!(driver.advance(0), 0);
}

#[test]
fn long_instructions_spend_extra_budget() {
    let mut driver = driver_with(step_cpu(4));
    assert_eq!(driver.advance(1), 25);
    assert_eq!(driver.cycles(), 100);

    let mut driver = driver_with(step_cpu(3));
    // 34 iterations: the last one overshoots the budget of 100 by 2.
    assert_eq!(driver.advance(1), 34);
    assert_eq!(driver.cycles(), 102);
}

#[test]
fn catch_up_is_clamped() {
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        DriverConfig::builder()
            .iterations_per_milli(10)
            .max_catch_up_millis(5)
            .build(),
    );
    driver.load_cartridge(&header_image(0x00, 0x00, 0x00)).unwrap();
    assert_eq!(driver.advance(1000), 50);
}

#[test]
fn oversized_budget_saturates() {
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        DriverConfig::builder()
            .iterations_per_milli(u64::MAX / 2)
            .max_catch_up_millis(u64::MAX)
            .build(),
    );
    driver.load_cartridge(&header_image(0x00, 0x00, 0x00)).unwrap();
    let handle = driver.freeze_handle();
    driver.cpu_mut().freeze_at = Some((3, handle));
    assert_eq!(driver.advance(u64::MAX), 3);
}

#[test]
fn freeze_mid_burst_stops_at_next_iteration() {
    let mut driver = driver_with(step_cpu(1));
    let handle = driver.freeze_handle();
    driver.cpu_mut().freeze_at = Some((10, handle.clone()));

    assert_eq!(driver.advance(5), 10);
    assert!(driver.is_frozen());
    assert_eq!(driver.cpu().steps, 10);

    assert_eq!(driver.advance(5), 0);
    assert_eq!(driver.cpu().steps, 10);

    handle.thaw();
    assert_eq!(driver.advance(1), 100);
    assert_eq!(driver.cpu().steps, 110);

    driver.freeze();
    assert_eq!(driver.advance(1), 0);
    driver.thaw();
    assert!(!driver.is_frozen());
}

#[test]
fn standby_only_advances_cycles() {
    let mut cpu = step_cpu(1);
    cpu.standby = true;
    let mut driver = driver_with(cpu);
    driver.cpu_mut().regs = [1, 2, 3, 4, 5, 6, 7, 8];

    let memory = driver.machine().memory.clone();
    let banks = driver.machine().banks.clone();
    for _ in 0..50 {
        assert_eq!(driver.iterate(), 1);
    }

    assert_eq!(driver.cycles(), 50);
    assert_eq!(driver.cpu().steps, 0);
    assert_eq!(driver.cpu().regs, [1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(driver.machine().memory, memory);
    assert_eq!(driver.machine().banks, banks);
}

#[test]
fn peripherals_catch_up_on_previous_iteration() {
    let mut driver = driver_with(step_cpu(64));
    let divider = driver.machine().io.divider;
    driver.iterate();
    // The timer has not seen the first step's cycles yet.
    assert_eq!(driver.machine().io.divider, divider);
    driver.iterate();
    assert_eq!(driver.machine().io.divider, divider.wrapping_add(1));
}

#[test]
fn serviced_interrupt_is_cleared_from_if() {
    let mut cpu = step_cpu(1);
    cpu.ime = true;
    let mut driver = driver_with(cpu);
    let machine = driver.machine_mut();
    machine.memory.interrupt_enable = 0x05;
    machine.io.interrupt_flag = 0x05;

    driver.iterate();
    assert_eq!(driver.cpu().serviced, vec![Interrupts::VBLANK]);
    assert_eq!(driver.machine().io.interrupt_flag & 0x05, 0x04);

    driver.iterate();
    assert_eq!(
        driver.cpu().serviced,
        vec![Interrupts::VBLANK, Interrupts::TIMER]
    );
    assert_eq!(driver.machine().io.interrupt_flag & 0x05, 0x00);
}

#[test]
fn masked_interrupts_are_not_offered() {
    let mut cpu = step_cpu(1);
    cpu.ime = true;
    let mut driver = driver_with(cpu);
    driver.machine_mut().memory.interrupt_enable = 0x00;
    driver.machine_mut().io.interrupt_flag = 0x1F;
    driver.iterate();
    assert!(driver.cpu().serviced.is_empty());
    assert_eq!(driver.machine().io.interrupt_flag, 0x1F);
}

#[test]
fn oam_dma_runs_after_the_triggering_step() {
    let mut cpu = step_cpu(1);
    cpu.writes = vec![(1, 0xC000, 0xAB), (1, 0xC09F, 0xCD), (1, 0xFF46, 0xC0)];
    let mut driver = driver_with(cpu);
    driver.iterate();
    let machine = driver.machine();
    assert_eq!(machine.io.dma, 0);
    assert_eq!(machine.memory.oam[0], 0xAB);
    assert_eq!(machine.memory.oam[0x9F], 0xCD);
}

#[test]
fn general_hdma_runs_in_color_mode() {
    let mut rom = header_image(0x00, 0x00, 0x00);
    rom[0x143] = 0xC0;
    fix_checksum(&mut rom);

    let mut cpu = step_cpu(1);
    cpu.writes = vec![
        (1, 0xC000, 0x5E),
        (1, 0xFF51, 0xC0),
        (1, 0xFF52, 0x00),
        (1, 0xFF53, 0x00),
        (1, 0xFF54, 0x40),
        (1, 0xFF55, 0x00),
    ];
    let mut driver = Driver::new(cpu, Box::new(NullDisplay), Box::new(NullAudio), config());
    driver.load_cartridge(&rom).unwrap();
    driver.iterate();
    assert!(!driver.machine().hdma_active());
    assert_eq!(driver.machine().memory.vram[0][0x40], 0x5E);
}

#[test]
fn double_speed_doubles_the_budget() {
    let mut rom = header_image(0x00, 0x00, 0x00);
    rom[0x143] = 0x80;
    fix_checksum(&mut rom);
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        config(),
    );
    driver.load_cartridge(&rom).unwrap();

    let machine = driver.machine_mut();
    machine.write8(0xFF4D, 0x01);
    assert!(machine.speed_switch());
    assert_eq!(driver.advance(1), 200);
}

#[test]
fn double_speed_is_ignored_when_color_is_disallowed() {
    let mut rom = header_image(0x00, 0x00, 0x00);
    rom[0x143] = 0x80;
    fix_checksum(&mut rom);
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        DriverConfig::builder()
            .iterations_per_milli(100)
            .allow_color(false)
            .build(),
    );
    driver.load_cartridge(&rom).unwrap();
    assert!(!driver.machine().color_mode());

    let machine = driver.machine_mut();
    machine.write8(0xFF4D, 0x01);
    assert!(!machine.speed_switch());
    assert_eq!(driver.advance(1), 100);
}

#[test]
fn switching_lcd_off_blanks_the_display() {
    let display = CountingDisplay::default();
    let mut cpu = step_cpu(1);
    cpu.writes = vec![(1, 0xFF40, 0x11)];
    let mut driver = Driver::new(cpu, Box::new(display.clone()), Box::new(NullAudio), config());
    driver.load_cartridge(&header_image(0x00, 0x00, 0x00)).unwrap();

    driver.iterate();
    assert!(display.0.borrow().is_empty());
    driver.iterate();
    let pixels = display.0.borrow();
    assert_eq!(pixels.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
    assert!(pixels.iter().all(|&(_, _, rgb)| rgb == 0x00FF_FFFF));
    assert_eq!(driver.machine().io.ly, 0);
}

#[test]
fn audio_sink_sees_only_channel_transitions() {
    let audio = RecordingAudio::default();
    let mut cpu = step_cpu(1);
    cpu.writes = vec![(2, 0xFF25, 0x01), (3, 0xFF26, 0x00)];
    let mut driver = Driver::new(cpu, Box::new(NullDisplay), Box::new(audio.clone()), config());
    driver.load_cartridge(&header_image(0x00, 0x00, 0x00)).unwrap();
    audio.0.borrow_mut().clear();

    // Power-on NR52=0xF1, NR51=0xF3 routes every channel somewhere.
    driver.iterate();
    let expected: Vec<_> = AudioChannel::ALL
        .iter()
        .map(|&c| AudioEvent::Channel(c, true))
        .collect();
    assert_eq!(*audio.0.borrow(), expected);
    audio.0.borrow_mut().clear();

    driver.iterate();
    assert!(audio.0.borrow().is_empty());

    // Step 2 left only square 1 routed.
    driver.iterate();
    assert_eq!(
        *audio.0.borrow(),
        vec![
            AudioEvent::Channel(AudioChannel::Square2, false),
            AudioEvent::Channel(AudioChannel::Wave, false),
            AudioEvent::Channel(AudioChannel::Noise, false),
        ]
    );
    audio.0.borrow_mut().clear();

    driver.iterate();
    assert_eq!(*audio.0.borrow(), vec![AudioEvent::Stop]);
}

#[test]
fn rejected_cartridge_leaves_running_state_alone() {
    let mut driver = driver_with(step_cpu(1));
    driver.machine_mut().write8(0xA000, 0x42);
    driver.machine_mut().write8(0xC000, 0x24);
    driver.advance(1);
    let cycles = driver.cycles();

    let mut bad = header_image(0x01, 0x00, 0x03);
    bad[0x14D] ^= 0xFF;
    let err = driver.load_cartridge(&bad).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CartridgeError>(),
        Some(CartridgeError::ChecksumMismatch { .. })
    ));

    let unsupported = header_image(0xFF, 0x00, 0x00);
    let err = driver.load_cartridge(&unsupported).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BusError>(),
        Some(BusError::UnsupportedMbc(crate::MbcKind::HuC1))
    ));

    assert!(!driver.is_halted());
    assert_eq!(driver.cycles(), cycles);
    assert_eq!(driver.cpu().resets, 1);
    let machine = driver.machine_mut();
    assert_eq!(machine.read8(0xA000), 0x42);
    assert_eq!(machine.read8(0xC000), 0x24);
}

#[test]
fn save_ram_must_match_and_resets_machine() {
    let mut driver = driver_with(step_cpu(1));
    driver.advance(1);

    let err = driver.load_save_ram(&[0u8; 100]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<BusError>(),
        Some(&BusError::SaveSizeMismatch {
            expected: 8192,
            actual: 100
        })
    );
    assert_eq!(driver.cpu().resets, 1);

    let mut blob = vec![0u8; 8192];
    blob[0] = 0x11;
    blob[8191] = 0x22;
    driver.machine_mut().banks.rom_bank = 0x07;
    driver.load_save_ram(&blob).unwrap();

    assert!(!driver.is_halted());
    assert_eq!(driver.cpu().resets, 2);
    assert_eq!(driver.cycles(), 0);
    assert_eq!(driver.machine().banks.rom_bank, 1);
    assert_eq!(driver.save_ram(), Some(blob.as_slice()));
    let machine = driver.machine_mut();
    assert_eq!(machine.read8(0xA000), 0x11);
    assert_eq!(machine.read8(0xBFFF), 0x22);
}

#[test]
fn save_ram_without_cartridge_is_an_error() {
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        config(),
    );
    assert!(driver.load_save_ram(&[]).is_err());
    assert!(driver.save_ram().is_none());
}

#[test]
fn mbc2_save_covers_builtin_ram() {
    let mut driver = Driver::new(
        step_cpu(1),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        config(),
    );
    driver.load_cartridge(&header_image(0x06, 0x00, 0x00)).unwrap();
    assert_eq!(driver.save_ram().map(<[u8]>::len), Some(512));

    let blob = vec![0xF3u8; 512];
    driver.load_save_ram(&blob).unwrap();
    assert_eq!(driver.machine_mut().read8(0xA000), 0x03);
}
