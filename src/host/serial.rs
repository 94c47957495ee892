//! The captured serial link over a host serial port.

use std::io::{Read, Write};
use std::time::Duration;

use log::{debug, info, warn};
use serialport::{ClearBuffer, FlowControl, SerialPort};

use crate::hardware::SerialLink;
use crate::settings::{DataBits, Parity, Settings, StopBits};

/// [`SerialLink`] backed by the operating system's serial stack.
///
/// The port opens lazily on the first `initialize` so the adapter can be
/// built before the device is plugged, and it reconfigures in place when
/// the rate detection sweeps candidates. I/O errors latch the line-error
/// flag until the next `initialize`, which is how a hosted port
/// approximates the framing/noise flags of a hardware receiver.
pub struct HostSerial {
    path: String,
    port: Option<Box<dyn SerialPort>>,
    line_error: bool,
}

impl HostSerial {
    pub fn new(path: impl Into<String>) -> Self {
        HostSerial {
            path: path.into(),
            port: None,
            line_error: false,
        }
    }
}

impl SerialLink for HostSerial {
    fn initialize(&mut self, settings: &Settings) {
        self.line_error = false;

        match &mut self.port {
            Some(port) => {
                if let Err(err) = configure(port.as_mut(), settings) {
                    warn!("failed to reconfigure {}: {}", self.path, err);
                    self.line_error = true;
                }
            }
            None => match open_with_retry(&self.path, settings) {
                Ok(port) => {
                    info!(
                        "connected to {} at {} baud",
                        self.path, settings.baud_rate
                    );
                    self.port = Some(port);
                }
                Err(err) => {
                    warn!("failed to open {}: {}", self.path, err);
                    self.line_error = true;
                }
            },
        }
    }

    fn available_len(&mut self) -> usize {
        match &mut self.port {
            Some(port) => match port.bytes_to_read() {
                Ok(available) => available as usize,
                Err(err) => {
                    debug!("bytes_to_read failed: {}", err);
                    self.line_error = true;
                    0
                }
            },
            None => 0,
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        let port = match &mut self.port {
            Some(port) => port,
            None => return 0,
        };
        match port.read(buf) {
            Ok(received) => received,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::TimedOut {
                    debug!("read failed: {}", err);
                    self.line_error = true;
                }
                0
            }
        }
    }

    fn clear_receive(&mut self) {
        if let Some(port) = &mut self.port {
            let _ = port.clear(ClearBuffer::Input);
        }
    }

    fn has_line_error(&mut self) -> bool {
        self.line_error
    }

    fn transmit(&mut self, bytes: &[u8]) {
        if let Some(port) = &mut self.port {
            if let Err(err) = port.write_all(bytes) {
                debug!("write failed: {}", err);
                self.line_error = true;
            }
        }
    }
}

fn configure(port: &mut dyn SerialPort, settings: &Settings) -> serialport::Result<()> {
    port.set_baud_rate(settings.baud_rate)?;
    port.set_data_bits(map_data_bits(settings.data_bits))?;
    port.set_stop_bits(map_stop_bits(settings.stop_bits))?;
    port.set_parity(map_parity(settings.parity))?;
    port.set_flow_control(FlowControl::None)?;
    Ok(())
}

fn open_with_retry(
    path: &str,
    settings: &Settings,
) -> Result<Box<dyn SerialPort>, serialport::Error> {
    use retry::{delay, retry_with_index};

    let result = retry_with_index(
        delay::Fixed::from_millis(1000).take(4),
        |index| -> Result<Box<dyn SerialPort>, serialport::Error> {
            debug!("Trying to connect {}", index);
            let builder = serialport::new(path, settings.baud_rate)
                .data_bits(map_data_bits(settings.data_bits))
                .stop_bits(map_stop_bits(settings.stop_bits))
                .parity(map_parity(settings.parity))
                .flow_control(FlowControl::None)
                .timeout(Duration::from_millis(10));
            builder.open()
        },
    );
    match result {
        Ok(port) => Ok(port),
        Err(err) => match err {
            retry::Error::Operation {
                error,
                total_delay,
                tries,
            } => {
                info!(
                    "Failed to open the port after {:?} and {} tries: {}",
                    total_delay, tries, error,
                );
                Err(error)
            }
            retry::Error::Internal(_) => {
                info!("Internal retry error while opening port");
                Err(serialport::Error::new(
                    serialport::ErrorKind::Unknown,
                    "internal error while retrying to open the port",
                ))
            }
        },
    }
}

fn map_data_bits(data_bits: DataBits) -> serialport::DataBits {
    match data_bits {
        DataBits::Eight => serialport::DataBits::Eight,
        DataBits::Nine => {
            // Host serial stacks stop at eight; the capture still works
            // for the low eight bits of each word.
            warn!("9-bit words are not supported here, falling back to 8");
            serialport::DataBits::Eight
        }
    }
}

fn map_parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn map_stop_bits(stop_bits: StopBits) -> serialport::StopBits {
    match stop_bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
        StopBits::Half => {
            warn!("half stop bits are not supported here, using 1");
            serialport::StopBits::One
        }
        StopBits::OnePointFive => {
            warn!("1.5 stop bits are not supported here, using 2");
            serialport::StopBits::Two
        }
    }
}
