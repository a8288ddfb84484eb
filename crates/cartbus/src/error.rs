use std::fmt;

use crate::cartridge::MbcKind;

/// Reasons a ROM image is rejected at load time.
///
/// Every variant is raised before any machine state is touched, so a failed
/// load leaves the previously inserted cartridge running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    HeaderTooShort { len: usize },
    LogoMismatch,
    ChecksumMismatch { stored: u8, computed: u8 },
    UnsupportedRomSize(u8),
    UnsupportedRamSize(u8),
    UnsupportedCartridgeType(u8),
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::HeaderTooShort { len } => {
                write!(f, "image is {len} bytes, shorter than the 0x150-byte header")
            }
            CartridgeError::LogoMismatch => write!(f, "boot logo at 0x104 does not match"),
            CartridgeError::ChecksumMismatch { stored, computed } => write!(
                f,
                "header checksum mismatch: stored 0x{stored:02X}, computed 0x{computed:02X}"
            ),
            CartridgeError::UnsupportedRomSize(code) => {
                write!(f, "unsupported ROM size code 0x{code:02X}")
            }
            CartridgeError::UnsupportedRamSize(code) => {
                write!(f, "unsupported RAM size code 0x{code:02X}")
            }
            CartridgeError::UnsupportedCartridgeType(code) => {
                write!(f, "unsupported cartridge type 0x{code:02X}")
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

/// Invariant violations raised by the memory map itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The cartridge declares a controller the MMU cannot execute.
    UnsupportedMbc(MbcKind),
    /// The address is not covered by the decode table (0xFEA0-0xFEFF).
    InvalidAddress(u16),
    SaveSizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::UnsupportedMbc(kind) => write!(f, "memory bank controller {kind} is not supported"),
            BusError::InvalidAddress(addr) => write!(f, "address 0x{addr:04X} is not mapped"),
            BusError::SaveSizeMismatch { expected, actual } => write!(
                f,
                "save RAM is {actual} bytes but the cartridge expects {expected}"
            ),
        }
    }
}

impl std::error::Error for BusError {}
