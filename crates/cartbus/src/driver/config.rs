use typed_builder::TypedBuilder;

/// DMG machine cycles per millisecond (4.194304 MHz / 4).
pub const DEFAULT_ITERATIONS_PER_MILLI: u64 = 1048;

/// Pacing knobs supplied by the host.
#[derive(TypedBuilder, Clone, Debug, Eq, PartialEq)]
pub struct DriverConfig {
    /// Base iterations owed per elapsed millisecond, before the
    /// double-speed multiplier.
    #[builder(default = DEFAULT_ITERATIONS_PER_MILLI)]
    pub iterations_per_milli: u64,
    /// Run color-capable cartridges in color mode.
    #[builder(default = true)]
    pub allow_color: bool,
    /// Upper bound on the time one `advance` call will catch up on.
    #[builder(default = 250)]
    pub max_catch_up_millis: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
