use super::memory::{OAM_SIZE, VRAM_BANK_SIZE};
use super::Machine;

/// Bytes moved per HDMA block.
const HDMA_BLOCK: u16 = 0x10;

/// VRAM DMA progress. The source/destination/control registers themselves
/// live in the fallback store at 0xFF51-0xFF55.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(super) struct Hdma {
    active: bool,
    hblank_mode: bool,
    source: u16,
    dest: u16,
    blocks_left: u8,
}

impl Machine {
    /// Copy 160 bytes from `dma << 8` into OAM and clear the trigger.
    pub fn run_oam_dma(&mut self) {
        let base = (self.io.dma as u16) << 8;
        for i in 0..OAM_SIZE as u16 {
            let src = base.wrapping_add(i);
            self.memory.oam[i as usize] = self.try_read(src).unwrap_or(0xFF);
        }
        log::trace!("dma: OAM loaded from 0x{base:04X}");
        self.io.dma = 0;
    }

    #[inline]
    pub fn hdma_active(&self) -> bool {
        self.hdma.active
    }

    /// Handle a write to HDMA5 (0xFF55).
    pub(super) fn start_hdma(&mut self, value: u8) {
        let high = &mut self.memory.high;
        if self.hdma.active && self.hdma.hblank_mode && value & 0x80 == 0 {
            self.hdma.active = false;
            high[0x55] = 0x80 | self.hdma.blocks_left.wrapping_sub(1);
            log::debug!("dma: HBlank transfer cancelled, {} blocks left", self.hdma.blocks_left);
            return;
        }

        let source = u16::from_be_bytes([high[0x51], high[0x52]]) & 0xFFF0;
        let dest = 0x8000 | (u16::from_be_bytes([high[0x53], high[0x54]]) & 0x1FF0);
        self.hdma = Hdma {
            active: true,
            hblank_mode: value & 0x80 != 0,
            source,
            dest,
            blocks_left: (value & 0x7F) + 1,
        };
        high[0x55] = value & 0x7F;
        log::debug!(
            "dma: {} transfer of {} blocks 0x{source:04X} -> 0x{dest:04X}",
            if self.hdma.hblank_mode { "HBlank" } else { "general" },
            self.hdma.blocks_left,
        );
    }

    /// Move pending VRAM DMA blocks: all of them for a general-purpose
    /// transfer, one per HBlank entered for an HBlank transfer.
    pub fn run_hdma(&mut self, hblanks: u32) {
        if !self.hdma.active {
            return;
        }
        let blocks = if self.hdma.hblank_mode {
            hblanks.min(self.hdma.blocks_left as u32)
        } else {
            self.hdma.blocks_left as u32
        };
        for _ in 0..blocks {
            self.copy_hdma_block();
        }

        self.memory.high[0x55] = if self.hdma.blocks_left == 0 {
            self.hdma.active = false;
            0xFF
        } else {
            self.hdma.blocks_left - 1
        };
    }

    fn copy_hdma_block(&mut self) {
        let bank = self.vram_bank();
        for i in 0..HDMA_BLOCK {
            let byte = self.try_read(self.hdma.source.wrapping_add(i)).unwrap_or(0xFF);
            let offset = (self.hdma.dest.wrapping_add(i) - 0x8000) as usize % VRAM_BANK_SIZE;
            self.memory.vram[bank][offset] = byte;
        }
        self.hdma.source = self.hdma.source.wrapping_add(HDMA_BLOCK);
        self.hdma.dest = 0x8000 | (self.hdma.dest.wrapping_add(HDMA_BLOCK) & 0x1FFF);
        self.hdma.blocks_left -= 1;
    }
}
