/// The memory bus as seen by a CPU core.
///
/// Accesses are infallible from the core's point of view; the machine logs
/// and absorbs accesses to unmapped addresses.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    /// Handle the CGB "speed switch" mechanism (KEY1 + STOP).
    ///
    /// When running in color mode with the KEY1 prepare bit set, executing
    /// `STOP` toggles double speed instead of entering standby.
    ///
    /// Returns `true` if a speed switch occurred.
    fn speed_switch(&mut self) -> bool {
        false
    }
}
