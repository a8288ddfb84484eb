//! Fixed header offsets and the lookup tables behind them.

use crate::error::CartridgeError;

use super::MbcKind;

pub const LOGO_OFFSET: usize = 0x104;
pub const TITLE_OFFSET: usize = 0x134;
pub const TITLE_LEN: usize = 16;
pub const CGB_FLAG_OFFSET: usize = 0x143;
pub const SGB_FLAG_OFFSET: usize = 0x146;
pub const CARTRIDGE_TYPE_OFFSET: usize = 0x147;
pub const ROM_SIZE_OFFSET: usize = 0x148;
pub const RAM_SIZE_OFFSET: usize = 0x149;
pub const CHECKSUM_OFFSET: usize = 0x14D;
/// First byte past the header; shorter images are rejected.
pub const HEADER_END: usize = 0x150;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;
/// MBC2 carries 512 half-bytes of RAM inside the controller itself.
pub const MBC2_RAM_SIZE: usize = 0x200;

/// The bitmap the boot ROM compares before handing over control.
pub const LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// A resolved memory size: total bytes and the number of banks they span.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MemorySize {
    pub bytes: usize,
    pub banks: usize,
}

impl MemorySize {
    const fn from_banks(banks: usize, bank_size: usize) -> Self {
        Self {
            bytes: banks * bank_size,
            banks,
        }
    }
}

/// Header checksum over 0x134..=0x14C as computed by the boot ROM.
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[TITLE_OFFSET..CHECKSUM_OFFSET]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
}

/// ROM size code at 0x148.
pub fn rom_size(code: u8) -> Result<MemorySize, CartridgeError> {
    match code {
        0x00..=0x08 => {
            let bytes = (32 * 1024) << code;
            Ok(MemorySize {
                bytes,
                banks: bytes / ROM_BANK_SIZE,
            })
        }
        // 1.1, 1.2 and 1.5 MiB; never shipped, but documented.
        0x52 => Ok(MemorySize::from_banks(72, ROM_BANK_SIZE)),
        0x53 => Ok(MemorySize::from_banks(80, ROM_BANK_SIZE)),
        0x54 => Ok(MemorySize::from_banks(96, ROM_BANK_SIZE)),
        _ => Err(CartridgeError::UnsupportedRomSize(code)),
    }
}

/// RAM size code at 0x149.
///
/// Code 0x01 historically meant 2 KiB; no licensed cartridge used it, so it
/// is treated as "no RAM".
pub fn ram_size(code: u8) -> Result<MemorySize, CartridgeError> {
    match code {
        0x00 | 0x01 => Ok(MemorySize::from_banks(0, RAM_BANK_SIZE)),
        0x02 => Ok(MemorySize::from_banks(1, RAM_BANK_SIZE)),
        0x03 => Ok(MemorySize::from_banks(4, RAM_BANK_SIZE)),
        0x04 => Ok(MemorySize::from_banks(16, RAM_BANK_SIZE)),
        0x05 => Ok(MemorySize::from_banks(8, RAM_BANK_SIZE)),
        _ => Err(CartridgeError::UnsupportedRamSize(code)),
    }
}

/// Cartridge type code at 0x147.
pub fn mbc_kind(code: u8) -> Result<MbcKind, CartridgeError> {
    let kind = match code {
        0x00 | 0x08 | 0x09 => MbcKind::None,
        0x01..=0x03 => MbcKind::Mbc1,
        0x05 | 0x06 => MbcKind::Mbc2,
        0x0B..=0x0D => MbcKind::Mmm01,
        0x0F..=0x13 => MbcKind::Mbc3,
        0x19..=0x1E => MbcKind::Mbc5,
        0x20 => MbcKind::Mbc6,
        0x22 => MbcKind::Mbc7,
        0xFE => MbcKind::HuC3,
        0xFF => MbcKind::HuC1,
        _ => return Err(CartridgeError::UnsupportedCartridgeType(code)),
    };
    Ok(kind)
}

#[inline]
pub fn has_rumble(code: u8) -> bool {
    matches!(code, 0x1C | 0x1D | 0x1E | 0x22)
}

/// Title bytes up to the first NUL, at most 16 of them.
pub fn title(rom: &[u8]) -> String {
    rom[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}
