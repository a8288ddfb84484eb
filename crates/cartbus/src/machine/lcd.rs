//! LY/STAT timing. Pixels are produced elsewhere; this only tracks where
//! the LCD controller is in the frame and raises its interrupts.

use crate::cpu::Interrupts;

use super::IoRegisters;

/// Machine cycles per scanline (456 dots).
pub const CYCLES_PER_LINE: u32 = 114;
pub const LINES_PER_FRAME: u32 = 154;
pub const VISIBLE_LINES: u8 = 144;
const OAM_SCAN_CYCLES: u32 = 20;
const TRANSFER_CYCLES: u32 = 43;

/// Edges observed during one [`LcdTiming::update`] call.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LcdEvents {
    /// Visible lines that entered HBlank.
    pub hblanks: u32,
    pub vblank: bool,
    /// LCDC bit 7 went from set to clear.
    pub switched_off: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(super) struct LcdTiming {
    /// Position within the frame, in machine cycles.
    frame_cycle: u32,
    /// OR of all enabled STAT sources after the last step.
    stat_line: bool,
    was_enabled: bool,
}

impl LcdTiming {
    pub(super) fn update(&mut self, io: &mut IoRegisters, cycles: u32) -> LcdEvents {
        let mut events = LcdEvents::default();

        if !io.lcd_enabled() {
            if self.was_enabled {
                log::debug!("lcd: switched off at LY={}", io.ly);
                events.switched_off = true;
            }
            self.was_enabled = false;
            self.frame_cycle = 0;
            self.stat_line = false;
            io.ly = 0;
            io.lcd_status &= !0x03;
            return events;
        }
        self.was_enabled = true;

        for _ in 0..cycles {
            let old_mode = Self::mode(self.frame_cycle);
            let old_ly = self.line();
            self.frame_cycle = (self.frame_cycle + 1) % (CYCLES_PER_LINE * LINES_PER_FRAME);
            let mode = Self::mode(self.frame_cycle);
            io.ly = self.line();

            if old_mode == 3 && mode == 0 {
                events.hblanks += 1;
            }
            if old_ly < VISIBLE_LINES && io.ly == VISIBLE_LINES {
                events.vblank = true;
                io.request(Interrupts::VBLANK);
            }
            self.update_status(io, mode);
        }
        events
    }

    #[inline]
    fn line(&self) -> u8 {
        (self.frame_cycle / CYCLES_PER_LINE) as u8
    }

    /// STAT mode for a frame position: 2 OAM scan, 3 transfer, 0 HBlank,
    /// 1 VBlank.
    fn mode(frame_cycle: u32) -> u8 {
        if frame_cycle / CYCLES_PER_LINE >= VISIBLE_LINES as u32 {
            return 1;
        }
        match frame_cycle % CYCLES_PER_LINE {
            c if c < OAM_SCAN_CYCLES => 2,
            c if c < OAM_SCAN_CYCLES + TRANSFER_CYCLES => 3,
            _ => 0,
        }
    }

    /// Refresh STAT bits 0-2 and fire INT 48 on a rising edge of the
    /// combined STAT line.
    fn update_status(&mut self, io: &mut IoRegisters, mode: u8) {
        let coincidence = io.ly == io.lyc;
        let mut stat = (io.lcd_status & !0x07) | mode;
        if coincidence {
            stat |= 0x04;
        }
        io.lcd_status = stat;

        let line = (stat & 0x40 != 0 && coincidence)
            || (stat & 0x20 != 0 && mode == 2)
            || (stat & 0x10 != 0 && mode == 1)
            || (stat & 0x08 != 0 && mode == 0);
        if line && !self.stat_line {
            io.request(Interrupts::LCD_STAT);
        }
        self.stat_line = line;
    }
}
