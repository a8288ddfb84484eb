pub const VRAM_BANK_SIZE: usize = 0x2000;
pub const WRAM_BANK_SIZE: usize = 0x1000;
pub const WRAM_BANKS: usize = 8;
pub const OAM_SIZE: usize = 0xA0;

/// Console-side RAM.
///
/// `high` spans the whole 0xFF00-0xFFFF page. 0xFF80-0xFFFE is HRAM proper;
/// the IO window falls back to it for registers that have no dedicated field
/// (audio, wave RAM, HDMA, CGB palettes).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MachineMemory {
    pub vram: [[u8; VRAM_BANK_SIZE]; 2],
    pub wram: [[u8; WRAM_BANK_SIZE]; WRAM_BANKS],
    pub oam: [u8; OAM_SIZE],
    pub high: [u8; 0x100],
    pub interrupt_enable: u8,
}

impl MachineMemory {
    pub fn power_on() -> Self {
        let mut memory = Self {
            vram: [[0; VRAM_BANK_SIZE]; 2],
            wram: [[0; WRAM_BANK_SIZE]; WRAM_BANKS],
            oam: [0; OAM_SIZE],
            high: [0; 0x100],
            interrupt_enable: 0,
        };
        memory.randomize_internal_ram();
        memory.apply_audio_power_on();
        memory
    }

    /// Fill WRAM and HRAM with a fixed-seed xorshift pattern.
    ///
    /// These areas hold garbage at power-on; a deterministic pattern keeps
    /// runs reproducible while still not being all zero.
    fn randomize_internal_ram(&mut self) {
        let mut x: u32 = 0xC0DE_1234;
        let mut next_byte = || {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        };

        for bank in self.wram.iter_mut() {
            bank.fill_with(&mut next_byte);
        }
        for byte in &mut self.high[0x80..0xFF] {
            *byte = next_byte();
        }
    }

    /// Post-boot values of NR10-NR52, which live in the fallback store.
    fn apply_audio_power_on(&mut self) {
        const AUDIO: [(u8, u8); 21] = [
            (0x10, 0x80),
            (0x11, 0xBF),
            (0x12, 0xF3),
            (0x13, 0xFF),
            (0x14, 0xBF),
            (0x16, 0x3F),
            (0x17, 0x00),
            (0x18, 0xFF),
            (0x19, 0xBF),
            (0x1A, 0x7F),
            (0x1B, 0xFF),
            (0x1C, 0x9F),
            (0x1D, 0xFF),
            (0x1E, 0xBF),
            (0x20, 0xFF),
            (0x21, 0x00),
            (0x22, 0x00),
            (0x23, 0xBF),
            (0x24, 0x77),
            (0x25, 0xF3),
            (0x26, 0xF1),
        ];
        for (offset, value) in AUDIO {
            self.high[offset as usize] = value;
        }
        // VRAM DMA registers read back 0xFF when idle.
        self.high[0x51..=0x55].fill(0xFF);
    }
}

impl Default for MachineMemory {
    fn default() -> Self {
        Self::power_on()
    }
}
