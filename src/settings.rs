//! Settings related to the captured serial link and the log file rotation.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values. The defaults match what the
//! device falls back to when the media carries no configuration file.

/// Sentinel baud rate requesting automatic detection of the link speed.
pub const AUTO_BAUD_RATE: u32 = 0;

/// Highest baud rate accepted from a configuration file.
pub const MAX_BAUD_RATE: u32 = 256_000;

/// Smallest accepted log file size in KB.
pub const MIN_LOG_KB: u32 = 1;

/// Largest accepted log file size in KB.
pub const MAX_LOG_KB: u32 = 102_400;

// =============================================================================
// Public Interface
// =============================================================================

/// Number of bits used to represent a character sent on the line.
///
/// Nine-bit words are part of some logged devices' wire formats and must
/// be representable even where a host serial stack cannot produce them.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DataBits {
    Eight,
    Nine,
}

/// The type of parity to use for error checking.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Number of bit times used to signal the end of a character.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StopBits {
    Half,
    One,
    OnePointFive,
    Two,
}

/// Groups all settings related to the captured serial link and to the log
/// rotation. Loaded from the media's configuration file when one exists,
/// otherwise built from the defaults.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The baud rate in symbols-per-second. [`AUTO_BAUD_RATE`] requests
    /// automatic detection.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bit times to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// Upper bound of a single log file, in KB. Reaching it rotates to a
    /// freshly named file.
    pub max_log_kb: u32,
    /// Whether timestamps are requested in the log. Persisted with the
    /// device configuration; log content itself stays raw captured bytes.
    pub add_time: bool,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder` or the configuration store.
    #[doc(hidden)]
    pub(crate) _private_use_builder: (),
}

impl Settings {
    /// `true` when the baud rate requests automatic detection.
    pub fn is_auto_baud(&self) -> bool {
        self.baud_rate == AUTO_BAUD_RATE
    }

    /// Maximum log file size in bytes.
    pub fn max_log_bytes(&self) -> u64 {
        u64::from(self.max_log_kb) * 1024
    }
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if
/// not explicitly set.
///
/// **Example**
///
/// ```
/// use logcom::SettingsBuilder;
///
/// let settings = SettingsBuilder::new().baud_rate(115_200).finalize();
/// assert_eq!(settings.baud_rate, 115_200);
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl SettingsBuilder {
    /// Start building the settings using the device defaults: automatic
    /// baud rate, 8-N-1 framing, 1024 KB log files, no timestamps.
    pub fn new() -> Self {
        SettingsBuilder {
            settings: Settings {
                baud_rate: AUTO_BAUD_RATE,
                data_bits: DataBits::Eight,
                parity: Parity::None,
                stop_bits: StopBits::One,
                max_log_kb: 1024,
                add_time: false,
                _private_use_builder: (),
            },
        }
    }

    /// Set the baud rate in symbols-per-second; [`AUTO_BAUD_RATE`]
    /// requests automatic detection.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line.
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of parity to use for error checking.
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bit times to use to signal the end of a character.
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    /// Set the upper bound of a single log file, in KB.
    pub fn max_log_kb(mut self, max_log_kb: u32) -> Self {
        self.settings.max_log_kb = max_log_kb;
        self
    }

    /// Request timestamps in the log.
    pub fn add_time(mut self, add_time: bool) -> Self {
        self.settings.add_time = add_time;
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        SettingsBuilder::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[test]
fn all_default() {
    let settings = SettingsBuilder::new().finalize();
    assert_eq!(
        settings,
        Settings {
            baud_rate: AUTO_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            max_log_kb: 1024,
            add_time: false,
            _private_use_builder: (),
        }
    )
}

#[test]
fn default_is_auto_baud() {
    let settings = SettingsBuilder::new().finalize();
    assert!(settings.is_auto_baud());
}

#[test]
fn baud_rate() {
    let baud_rate = 9_600;
    let settings = SettingsBuilder::new().baud_rate(baud_rate).finalize();
    assert_eq!(settings.baud_rate, baud_rate);
    assert!(!settings.is_auto_baud());
}

#[test]
fn data_bits() {
    let data_bits = DataBits::Nine;
    let settings = SettingsBuilder::new().data_bits(data_bits).finalize();
    assert_eq!(settings.data_bits, data_bits);
}

#[test]
fn parity() {
    let parity = Parity::Even;
    let settings = SettingsBuilder::new().parity(parity).finalize();
    assert_eq!(settings.parity, parity);
}

#[test]
fn stop_bits() {
    let stop_bits = StopBits::OnePointFive;
    let settings = SettingsBuilder::new().stop_bits(stop_bits).finalize();
    assert_eq!(settings.stop_bits, stop_bits);
}

#[test]
fn max_log_kb() {
    let settings = SettingsBuilder::new().max_log_kb(2048).finalize();
    assert_eq!(settings.max_log_kb, 2048);
    assert_eq!(settings.max_log_bytes(), 2048 * 1024);
}

#[test]
fn add_time() {
    let settings = SettingsBuilder::new().add_time(true).finalize();
    assert!(settings.add_time);
}
