//! Cartridge images and their header metadata.

pub mod header;

use std::fmt;

use crate::error::CartridgeError;

use header::{MemorySize, HEADER_END, LOGO, LOGO_OFFSET, MBC2_RAM_SIZE};

/// Memory bank controller family named by the cartridge type byte.
///
/// Only `None`, `Mbc1`, `Mbc2` and `Mbc3` can be executed by the MMU; the rest
/// are recognised so that the header can still be inspected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MbcKind {
    None,
    Mbc1,
    Mbc2,
    Mbc3,
    Mmm01,
    Mbc5,
    Mbc6,
    Mbc7,
    HuC1,
    HuC3,
}

impl fmt::Display for MbcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MbcKind::None => "ROM ONLY",
            MbcKind::Mbc1 => "MBC1",
            MbcKind::Mbc2 => "MBC2",
            MbcKind::Mbc3 => "MBC3",
            MbcKind::Mmm01 => "MMM01",
            MbcKind::Mbc5 => "MBC5",
            MbcKind::Mbc6 => "MBC6",
            MbcKind::Mbc7 => "MBC7",
            MbcKind::HuC1 => "HuC1",
            MbcKind::HuC3 => "HuC3",
        };
        f.write_str(name)
    }
}

/// Static facts decoded from the header at load time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CartridgeMetadata {
    pub title: String,
    pub supports_color: bool,
    pub supports_sgb: bool,
    pub rom_size: usize,
    pub rom_bank_count: usize,
    pub ram_size: usize,
    pub ram_bank_count: usize,
    pub mbc_kind: MbcKind,
    pub supports_rumble: bool,
}

impl fmt::Display for CartridgeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "title:  {:?}", self.title)?;
        writeln!(f, "mbc:    {}", self.mbc_kind)?;
        writeln!(
            f,
            "rom:    {} KiB ({} banks)",
            self.rom_size / 1024,
            self.rom_bank_count
        )?;
        writeln!(
            f,
            "ram:    {} KiB ({} banks)",
            self.ram_size / 1024,
            self.ram_bank_count
        )?;
        write!(
            f,
            "flags:  color={} sgb={} rumble={}",
            self.supports_color, self.supports_sgb, self.supports_rumble
        )
    }
}

/// A validated ROM image plus the RAM that travels with it.
///
/// The ROM is never resized after load. `ram` holds external cartridge RAM
/// (absent when the header declares none); `builtin_ram` holds the 512
/// nibbles inside an MBC2 controller. Both survive machine resets.
#[derive(Clone, Debug)]
pub struct Cartridge {
    pub(crate) rom: Vec<u8>,
    pub(crate) ram: Option<Vec<u8>>,
    pub(crate) builtin_ram: Option<Vec<u8>>,
    metadata: CartridgeMetadata,
}

impl Cartridge {
    /// Validate and decode a ROM image.
    ///
    /// All checks run before anything is allocated, so an error never
    /// leaves a half-built cartridge behind.
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END {
            return Err(CartridgeError::HeaderTooShort { len: rom.len() });
        }
        if rom[LOGO_OFFSET..LOGO_OFFSET + LOGO.len()] != LOGO {
            return Err(CartridgeError::LogoMismatch);
        }

        let computed = header::header_checksum(rom);
        let stored = rom[header::CHECKSUM_OFFSET];
        if computed != stored {
            return Err(CartridgeError::ChecksumMismatch { stored, computed });
        }

        let MemorySize {
            bytes: rom_size,
            banks: rom_bank_count,
        } = header::rom_size(rom[header::ROM_SIZE_OFFSET])?;
        let MemorySize {
            bytes: ram_size,
            banks: ram_bank_count,
        } = header::ram_size(rom[header::RAM_SIZE_OFFSET])?;
        let type_code = rom[header::CARTRIDGE_TYPE_OFFSET];
        let mbc_kind = header::mbc_kind(type_code)?;

        let metadata = CartridgeMetadata {
            title: header::title(rom),
            supports_color: rom[header::CGB_FLAG_OFFSET] & 0x80 != 0,
            supports_sgb: rom[header::SGB_FLAG_OFFSET] == 0x03,
            rom_size,
            rom_bank_count,
            ram_size,
            ram_bank_count,
            mbc_kind,
            supports_rumble: header::has_rumble(type_code),
        };

        if rom.len() != rom_size {
            log::warn!(
                "cartridge: image is {} bytes but header declares {} bytes",
                rom.len(),
                rom_size
            );
        }
        log::info!(
            "cartridge: loaded {:?} ({}, {} ROM banks, {} RAM banks)",
            metadata.title,
            metadata.mbc_kind,
            rom_bank_count,
            ram_bank_count
        );

        Ok(Self {
            rom: rom.to_vec(),
            ram: (ram_size > 0).then(|| vec![0; ram_size]),
            builtin_ram: (mbc_kind == MbcKind::Mbc2).then(|| vec![0; MBC2_RAM_SIZE]),
            metadata,
        })
    }

    #[inline]
    pub fn metadata(&self) -> &CartridgeMetadata {
        &self.metadata
    }

    #[inline]
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    #[inline]
    pub fn ram(&self) -> Option<&[u8]> {
        self.ram.as_deref()
    }

    #[inline]
    pub fn builtin_ram(&self) -> Option<&[u8]> {
        self.builtin_ram.as_deref()
    }

    /// The battery-backed bytes a host would persist: MBC2's built-in RAM,
    /// otherwise the external RAM.
    pub fn save_data(&self) -> Option<&[u8]> {
        self.builtin_ram().or_else(|| self.ram())
    }

    /// Length a save-RAM blob must have to be accepted.
    pub fn save_len(&self) -> usize {
        self.save_data().map_or(0, <[u8]>::len)
    }

    /// Replace the save bytes wholesale. The caller checks the length.
    pub(crate) fn restore_save(&mut self, blob: &[u8]) {
        let target = match (self.builtin_ram.as_mut(), self.ram.as_mut()) {
            (Some(builtin), _) => builtin,
            (None, Some(ram)) => ram,
            (None, None) => return,
        };
        target.copy_from_slice(blob);
    }

    /// ROM banks physically present in the image (at least one).
    #[inline]
    pub(crate) fn rom_banks(&self) -> usize {
        self.rom.len().div_ceil(header::ROM_BANK_SIZE).max(1)
    }

    /// External RAM banks physically allocated.
    #[inline]
    pub(crate) fn ram_banks(&self) -> usize {
        self.ram
            .as_ref()
            .map_or(0, |ram| ram.len().div_ceil(header::RAM_BANK_SIZE))
    }
}
