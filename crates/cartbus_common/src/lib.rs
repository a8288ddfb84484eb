pub mod sink;

pub use sink::{AudioChannel, AudioSink, DisplaySink, NullAudio, NullDisplay};

/// An opaque 24-bit color as handed to a [`DisplaySink`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Pack as `0x00RRGGBB`, the layout display sinks receive.
    #[inline]
    pub const fn packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn packed_layout_is_rrggbb() {
        let c = Color::new_rgb(0x12, 0x34, 0x56);
        assert_eq!(c.packed(), 0x0012_3456);
        assert_eq!(Color::WHITE.packed(), 0x00FF_FFFF);
    }
}
