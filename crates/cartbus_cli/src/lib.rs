//! Headless host for the cartbus driver: loads a ROM, optionally restores
//! save RAM, and runs against the wall clock for a fixed duration.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use cartbus::{Bus, Cpu, Driver, DriverConfig, Interrupts};
use cartbus_common::{NullAudio, NullDisplay};

pub const DEFAULT_RUN_MILLIS: u64 = 1000;

/// Command line: `cartbus <rom> [save] [millis]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub rom: PathBuf,
    pub save: Option<PathBuf>,
    pub millis: u64,
}

impl Options {
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let rom = match args.next() {
            Some(rom) if !rom.is_empty() => PathBuf::from(rom),
            _ => bail!("usage: cartbus <rom> [save] [millis]"),
        };
        let save = args.next().filter(|s| !s.is_empty() && s != "-").map(PathBuf::from);
        let millis = match args.next() {
            Some(ms) => ms
                .parse()
                .with_context(|| format!("invalid run time '{ms}'"))?,
            None => DEFAULT_RUN_MILLIS,
        };
        Ok(Self { rom, save, millis })
    }
}

/// Stand-in core that fetches one byte per step and never services
/// interrupts. Enough to exercise the bus and the driver's pacing.
#[derive(Debug, Default)]
pub struct FetchOnlyCpu {
    pc: u16,
    pub fetched: u64,
}

impl Cpu for FetchOnlyCpu {
    fn step(&mut self, bus: &mut dyn Bus) -> u32 {
        let _opcode = bus.read8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        if self.pc == 0x8000 {
            self.pc = 0x0100;
        }
        self.fetched += 1;
        1
    }

    fn in_standby(&self) -> bool {
        false
    }

    fn dispatch_interrupt(&mut self, _bus: &mut dyn Bus, _pending: Interrupts) -> Option<Interrupts> {
        None
    }

    fn reset(&mut self, _color: bool) {
        self.pc = 0x0100;
        self.fetched = 0;
    }
}

pub fn run(options: &Options) -> Result<()> {
    let rom = std::fs::read(&options.rom)
        .with_context(|| format!("failed to read ROM '{}'", options.rom.display()))?;

    let mut driver = Driver::new(
        FetchOnlyCpu::default(),
        Box::new(NullDisplay),
        Box::new(NullAudio),
        DriverConfig::default(),
    );
    let metadata = driver.load_cartridge(&rom)?;
    println!("{metadata}");

    if let Some(path) = &options.save {
        if path.exists() {
            let blob = std::fs::read(path)
                .with_context(|| format!("failed to read save '{}'", path.display()))?;
            driver.load_save_ram(&blob)?;
        } else {
            log::info!("no save at '{}', starting fresh", path.display());
        }
    }

    let iterations = run_for(&mut driver, Duration::from_millis(options.millis));
    log::info!(
        "ran {} iterations, {} cycles, {} fetches in {} ms",
        iterations,
        driver.cycles(),
        driver.cpu().fetched,
        options.millis
    );

    if let (Some(path), Some(ram)) = (&options.save, driver.save_ram()) {
        std::fs::write(path, ram)
            .with_context(|| format!("failed to write save '{}'", path.display()))?;
        log::info!("wrote {} bytes of save RAM to '{}'", ram.len(), path.display());
    }
    Ok(())
}

/// Feed the driver whole elapsed milliseconds until `duration` has passed.
fn run_for<C: Cpu>(driver: &mut Driver<C>, duration: Duration) -> u64 {
    let start = Instant::now();
    let mut last = start;
    let mut iterations = 0;
    while start.elapsed() < duration {
        thread::sleep(Duration::from_millis(1));
        let millis = u64::try_from(last.elapsed().as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            continue;
        }
        last += Duration::from_millis(millis);
        iterations += driver.advance(millis);
    }
    iterations
}
