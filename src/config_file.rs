//! The on-media configuration file.
//!
//! Link and log settings live in a plain-text `config.ini` at the volume
//! root so they can be edited from any host the media is plugged into.
//! The entry must be in the form:
//!
//! ```text
//! 0
//! 8-N-1
//! 1024
//! 1
//! ```
//!
//! where `0` is the baud rate (0 requests automatic detection), `8-N-1`
//! is data bits (8 or 9), parity (`N`/`O`/`E`) and stop bits
//! (`0.5`/`1`/`1.5`/`2`), `1024` is the maximum log file size in KB and
//! the final `1` enables timestamp recording. Lines end in `\r\n`.
//!
//! A human-readable build-date trailer follows the structured fields on
//! every save; loading ignores it.
//!
//! Validation is all-or-nothing: a missing delimiter or a single
//! out-of-range field rejects the whole file and the caller falls back
//! to defaults — settings are never partially applied.

use log::debug;
use thiserror::Error;

use crate::hardware::{LogVolume, OpenMode};
use crate::settings::{
    DataBits, Parity, Settings, StopBits, MAX_BAUD_RATE, MAX_LOG_KB, MIN_LOG_KB,
};

/// The name of the configuration file at the volume root.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// A configuration file longer than one storage block is nonsense; only
/// the first block is ever read.
const CONFIG_READ_BLOCK: usize = 512;

/// Delimiters terminating each of the six fields, in field order.
const DELIMITERS: [&str; 6] = ["\r\n", "-", "-", "\r\n", "\r\n", "\r\n"];

/// Ways loading or saving the configuration file can fail.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum ConfigError {
    /// The file is absent or empty.
    #[error("no configuration file on the media")]
    NotFound,

    /// A delimiter is missing or a field is out of its valid range.
    #[error("malformed configuration file")]
    Parse,

    /// Fewer bytes reached the media than were rendered.
    #[error("short write while saving the configuration file")]
    WriteFailed,
}

// =============================================================================
// Public Interface
// =============================================================================

/// Read and parse the configuration file from the mounted volume.
pub fn load(volume: &mut dyn LogVolume) -> Result<Settings, ConfigError> {
    if !volume.open(CONFIG_FILE_NAME, OpenMode::Read) {
        return Err(ConfigError::NotFound);
    }
    let mut buf = vec![0u8; CONFIG_READ_BLOCK];
    let len = volume.read(&mut buf).unwrap_or(0);
    volume.close();
    if len == 0 {
        return Err(ConfigError::NotFound);
    }

    let text = String::from_utf8_lossy(&buf[..len]);
    let settings = parse(&text)?;
    debug!("configuration loaded: {:?}", settings);
    Ok(settings)
}

/// Render `settings` and write them to the volume, trailer included.
///
/// The file is created when absent and overwritten from the start when
/// present. Anything short of the full rendered byte count on the media
/// is a hard failure.
pub fn save(volume: &mut dyn LogVolume, settings: &Settings) -> Result<(), ConfigError> {
    let text = render(settings);

    if !volume.create_if_absent(CONFIG_FILE_NAME) {
        return Err(ConfigError::WriteFailed);
    }
    if !volume.open(CONFIG_FILE_NAME, OpenMode::Write) {
        return Err(ConfigError::WriteFailed);
    }
    let written = volume.write(text.as_bytes());
    volume.close();

    match written {
        Some(n) if n == text.len() => Ok(()),
        _ => Err(ConfigError::WriteFailed),
    }
}

/// Parse the six delimited fields out of a configuration text.
///
/// Everything after the sixth delimiter (the build-date trailer) is
/// ignored.
pub fn parse(text: &str) -> Result<Settings, ConfigError> {
    let fields = split_fields(text).ok_or(ConfigError::Parse)?;

    let baud_rate: u32 = fields[0].parse().map_err(|_| ConfigError::Parse)?;
    if baud_rate > MAX_BAUD_RATE {
        return Err(ConfigError::Parse);
    }

    let data_bits = match fields[1] {
        "8" => DataBits::Eight,
        "9" => DataBits::Nine,
        _ => return Err(ConfigError::Parse),
    };

    let parity = match fields[2] {
        "N" => Parity::None,
        "O" => Parity::Odd,
        "E" => Parity::Even,
        _ => return Err(ConfigError::Parse),
    };

    let stop_bits = match fields[3] {
        "0.5" => StopBits::Half,
        "1" => StopBits::One,
        "1.5" => StopBits::OnePointFive,
        "2" => StopBits::Two,
        _ => return Err(ConfigError::Parse),
    };

    let max_log_kb: u32 = fields[4].parse().map_err(|_| ConfigError::Parse)?;
    if !(MIN_LOG_KB..=MAX_LOG_KB).contains(&max_log_kb) {
        return Err(ConfigError::Parse);
    }

    let add_time = match fields[5] {
        "0" => false,
        "1" => true,
        _ => return Err(ConfigError::Parse),
    };

    Ok(Settings {
        baud_rate,
        data_bits,
        parity,
        stop_bits,
        max_log_kb,
        add_time,
        _private_use_builder: (),
    })
}

/// Render `settings` as configuration file content, build-date trailer
/// included.
pub fn render(settings: &Settings) -> String {
    let mut text = String::new();

    text += &settings.baud_rate.to_string();
    text += "\r\n";

    text += match settings.data_bits {
        DataBits::Eight => "8-",
        DataBits::Nine => "9-",
    };
    text += match settings.parity {
        Parity::None => "N-",
        Parity::Odd => "O-",
        Parity::Even => "E-",
    };
    text += match settings.stop_bits {
        StopBits::Half => "0.5\r\n",
        StopBits::One => "1\r\n",
        StopBits::OnePointFive => "1.5\r\n",
        StopBits::Two => "2\r\n",
    };

    text += &settings.max_log_kb.to_string();
    text += "\r\n";

    text += if settings.add_time { "1" } else { "0" };
    text += "\r\n\r\n\r\n";

    text += "Build Date:\r\n";
    text += env!("LOGCOM_BUILD_DATE");

    text
}

// =============================================================================
// Private stuff
// =============================================================================

fn split_fields(text: &str) -> Option<[&str; 6]> {
    let mut fields = [""; 6];
    let mut rest = text;
    for (field, delimiter) in fields.iter_mut().zip(DELIMITERS.iter()) {
        let pos = rest.find(delimiter)?;
        *field = &rest[..pos];
        rest = &rest[pos + delimiter.len()..];
    }
    Some(fields)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::MockVolume;
    use crate::settings::SettingsBuilder;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[test]
    fn parses_the_documented_example() {
        let settings = parse("0\r\n8-N-1\r\n1024\r\n1\r\n").unwrap();
        assert!(settings.is_auto_baud());
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.max_log_kb, 1024);
        assert!(settings.add_time);
    }

    #[test]
    fn render_then_parse_is_identity() {
        let settings = SettingsBuilder::new()
            .baud_rate(57_600)
            .data_bits(DataBits::Nine)
            .parity(Parity::Even)
            .stop_bits(StopBits::Two)
            .max_log_kb(2048)
            .add_time(false)
            .finalize();
        assert_eq!(parse(&render(&settings)).unwrap(), settings);

        let defaults = SettingsBuilder::new().finalize();
        assert_eq!(parse(&render(&defaults)).unwrap(), defaults);
    }

    #[test]
    fn render_appends_the_build_trailer() {
        let text = render(&SettingsBuilder::new().finalize());
        assert!(text.contains("Build Date:\r\n"));
    }

    #[test]
    fn rejects_every_missing_delimiter() {
        let malformed = [
            "0",                              // no line ending at all
            "0\r\n8N-1\r\n1024\r\n1\r\n",     // first dash missing
            "0\r\n8-N1\r\n1024\r\n1\r\n",     // second dash missing
            "0\r\n8-N-1 1024\r\n1\r\n",       // stop-bits delimiter missing
            "0\r\n8-N-1\r\n1024 1\r\n",       // size delimiter missing
            "0\r\n8-N-1\r\n1024\r\n1",        // flag delimiter missing
        ];
        for text in &malformed {
            assert_eq!(parse(text), Err(ConfigError::Parse), "{:?}", text);
        }
    }

    #[test]
    fn rejects_every_out_of_range_field() {
        let malformed = [
            "x\r\n8-N-1\r\n1024\r\n1\r\n",       // baud not numeric
            "300000\r\n8-N-1\r\n1024\r\n1\r\n",  // baud above the cap
            "0\r\n7-N-1\r\n1024\r\n1\r\n",       // unsupported word length
            "0\r\n8-X-1\r\n1024\r\n1\r\n",       // unknown parity
            "0\r\n8-N-3\r\n1024\r\n1\r\n",       // unknown stop bits
            "0\r\n8-N-1\r\n0\r\n1\r\n",          // size below minimum
            "0\r\n8-N-1\r\n200000\r\n1\r\n",     // size above maximum
            "0\r\n8-N-1\r\n1024\r\n2\r\n",       // flag not 0/1
        ];
        for text in &malformed {
            assert_eq!(parse(text), Err(ConfigError::Parse), "{:?}", text);
        }
    }

    #[test]
    fn load_reports_missing_and_empty_files_as_not_found() {
        let mut volume = Rc::new(RefCell::new(MockVolume::default()));
        assert_eq!(load(&mut volume), Err(ConfigError::NotFound));

        volume
            .borrow_mut()
            .files
            .insert(CONFIG_FILE_NAME.to_owned(), Vec::new());
        assert_eq!(load(&mut volume), Err(ConfigError::NotFound));
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut volume = Rc::new(RefCell::new(MockVolume::default()));
        let settings = SettingsBuilder::new()
            .baud_rate(115_200)
            .parity(Parity::Odd)
            .max_log_kb(42)
            .add_time(true)
            .finalize();

        save(&mut volume, &settings).unwrap();
        assert_eq!(load(&mut volume).unwrap(), settings);

        // The trailer went to the media but never comes back out.
        let stored = volume.borrow().files[CONFIG_FILE_NAME].clone();
        assert!(String::from_utf8_lossy(&stored).contains("Build Date:"));
    }

    #[test]
    fn short_write_fails_the_save() {
        let mut volume = Rc::new(RefCell::new(MockVolume::default()));
        volume.borrow_mut().write_caps = VecDeque::from(vec![5]);

        let settings = SettingsBuilder::new().finalize();
        assert_eq!(save(&mut volume, &settings), Err(ConfigError::WriteFailed));
    }
}
