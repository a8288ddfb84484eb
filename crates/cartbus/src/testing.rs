//! Synthetic ROM images for tests.

use crate::cartridge::header::{
    header_checksum, CARTRIDGE_TYPE_OFFSET, CHECKSUM_OFFSET, HEADER_END, LOGO, LOGO_OFFSET,
    RAM_SIZE_OFFSET, ROM_BANK_SIZE, ROM_SIZE_OFFSET, TITLE_OFFSET,
};

/// Minimal header-only image: valid logo, title "TEST", correct checksum.
pub(crate) fn header_image(cart_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
    let mut rom = vec![0u8; HEADER_END];
    write_header(&mut rom, cart_type, rom_code, ram_code);
    rom
}

/// Full-size image where every byte of bank `n` is `pattern(n)`, with a
/// valid header patched into bank 0.
pub(crate) fn banked_image(cart_type: u8, rom_code: u8, ram_code: u8, banks: usize) -> Vec<u8> {
    let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
    for (bank, chunk) in rom.chunks_mut(ROM_BANK_SIZE).enumerate() {
        chunk.fill(pattern(bank));
    }
    write_header(&mut rom, cart_type, rom_code, ram_code);
    rom
}

/// Fill byte used for ROM bank `n` by [`banked_image`].
pub(crate) fn pattern(bank: usize) -> u8 {
    0x10u8.wrapping_add((bank as u8).wrapping_mul(0x11))
}

fn write_header(rom: &mut [u8], cart_type: u8, rom_code: u8, ram_code: u8) {
    rom[LOGO_OFFSET..LOGO_OFFSET + LOGO.len()].copy_from_slice(&LOGO);
    rom[TITLE_OFFSET..TITLE_OFFSET + 16].fill(0);
    rom[TITLE_OFFSET..TITLE_OFFSET + 4].copy_from_slice(b"TEST");
    rom[0x143..=0x14C].fill(0);
    rom[CARTRIDGE_TYPE_OFFSET] = cart_type;
    rom[ROM_SIZE_OFFSET] = rom_code;
    rom[RAM_SIZE_OFFSET] = ram_code;
    fix_checksum(rom);
}

pub(crate) fn fix_checksum(rom: &mut [u8]) {
    rom[CHECKSUM_OFFSET] = header_checksum(rom);
}
