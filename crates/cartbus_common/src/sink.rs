/// Receives pixels produced outside the core.
///
/// No batching contract is assumed: a sink may be handed a single pixel or a
/// whole frame, in any order.
pub trait DisplaySink {
    /// `rgb` is packed as `0x00RRGGBB`.
    fn put_pixel(&mut self, x: usize, y: usize, rgb: u32);
}

/// The four pulse/wave/noise channels of the APU.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AudioChannel {
    Square1,
    Square2,
    Wave,
    Noise,
}

impl AudioChannel {
    pub const ALL: [AudioChannel; 4] = [
        AudioChannel::Square1,
        AudioChannel::Square2,
        AudioChannel::Wave,
        AudioChannel::Noise,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            AudioChannel::Square1 => 0,
            AudioChannel::Square2 => 1,
            AudioChannel::Wave => 2,
            AudioChannel::Noise => 3,
        }
    }
}

/// Receives channel gating signals. Waveform synthesis lives elsewhere.
pub trait AudioSink {
    fn set_channel_enabled(&mut self, channel: AudioChannel, enabled: bool);
    /// Silence everything, e.g. when the master sound switch turns off.
    fn stop(&mut self);
}

/// Display sink that drops every pixel.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn put_pixel(&mut self, _x: usize, _y: usize, _rgb: u32) {}
}

/// Audio sink that only traces the signals it receives.
#[derive(Default, Debug, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn set_channel_enabled(&mut self, channel: AudioChannel, enabled: bool) {
        log::trace!("audio: {:?} enabled={}", channel, enabled);
    }

    fn stop(&mut self) {
        log::trace!("audio: stop");
    }
}
