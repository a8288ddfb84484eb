use cartbus_common::{AudioChannel, AudioSink};

const NR51: usize = 0x25;
const NR52: usize = 0x26;

/// Forwards channel on/off changes to the audio sink.
///
/// A channel is on when the master switch (NR52 bit 7) is set and NR51
/// routes it to at least one output. Only transitions are forwarded.
pub(super) struct ChannelGate {
    sink: Box<dyn AudioSink>,
    enabled: [bool; 4],
    master: bool,
}

impl ChannelGate {
    pub(super) fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            enabled: [false; 4],
            master: false,
        }
    }

    pub(super) fn reset(&mut self) {
        self.sink.stop();
        self.enabled = [false; 4];
        self.master = false;
    }

    /// `high` is the 0xFF00 page fallback store holding NR51/NR52.
    pub(super) fn update(&mut self, high: &[u8; 0x100]) {
        let master = high[NR52] & 0x80 != 0;
        if !master {
            if self.master {
                log::debug!("audio: master switch off");
                self.sink.stop();
                self.enabled = [false; 4];
            }
            self.master = false;
            return;
        }
        self.master = true;

        let routing = high[NR51];
        for channel in AudioChannel::ALL {
            let i = channel.index();
            let on = routing & (0x11 << i) != 0;
            if on != self.enabled[i] {
                self.enabled[i] = on;
                self.sink.set_channel_enabled(channel, on);
            }
        }
    }
}
