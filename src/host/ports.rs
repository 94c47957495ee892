//! Serial port device selection.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serialport::{available_ports, SerialPortType};

use std::{thread, time::Duration};

//==============================================================================
// Public Interface
//==============================================================================

/// Present the list of connected serial devices for interactive
/// selection, waiting for one to be connected first if none is.
///
/// Returns `None` when the selection is cancelled, so the caller can
/// refresh the list and ask again — useful while plugging the probe side
/// of the link without restarting `logcom`.
pub fn select_port() -> Option<String> {
    let mut found_ports;
    let mut attempt: usize = 1;
    let waiting_period: usize = 1;

    let pb = spinner();

    // Avoid cursor flicker during the waiting
    Term::stdout().hide_cursor().ok()?;
    // Enumerate connected USB serial devices until we have some.
    loop {
        found_ports = enumerate_usb_serial_ports();
        let num_ports = found_ports.len();
        if num_ports > 0 {
            pb.finish_with_message("Select the port to capture:");
            break;
        } else {
            let waited = attempt * waiting_period;
            pb.set_message(format!(
                "[{:03}s {}] ⌛ Waiting for a USB serial controller to be connected...",
                style(waited).dim(),
                num_ports
            ));
            attempt += 1;
        }

        thread::sleep(Duration::from_secs(waiting_period as u64));
    }
    Term::stdout().show_cursor().ok()?;

    let selection = select_port_interactive(&found_ports);
    match &selection {
        Some(path) => {
            pb.finish_with_message(format!("👍 Serial port {} is ready", style(path).green()));
        }
        None => {
            pb.finish_with_message("❌ Selection canceled -> refreshing...");
        }
    }
    selection
}

/// Wait for a device with the given path to appear on the system,
/// re-enumerating every couple of seconds.
pub fn wait_for_port(path: &str) {
    let pb = spinner();

    let mut attempt: usize = 1;
    let waiting_period: usize = 2;

    loop {
        let found_ports = enumerate_usb_serial_ports();
        if check_requested_port(&found_ports, path) {
            pb.finish_with_message(format!("👍 Serial port {} is ready", style(path).green()));
            return;
        }

        let waited = attempt * waiting_period;
        pb.set_message(format!(
            "[{:03}s {}] ⏳ Waiting for {} to be ready...",
            style(waited).dim(),
            found_ports.len(),
            style(path).cyan()
        ));

        thread::sleep(Duration::from_secs(waiting_period as u64));
        attempt += 1;
    }
}

//==============================================================================
// Private stuff
//==============================================================================

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(120);
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠚", "⠞", "⠖", "⠦", "⠴", "⠲", "⠳", "⠓"])
            .template("[LC] {spinner:.blue} {msg}"),
    );
    pb
}

fn check_requested_port(ports: &[String], path: &str) -> bool {
    ports.iter().any(|detected| detected.starts_with(path))
}

/// Enumerates serial devices of type USB on the system
fn enumerate_usb_serial_ports() -> Vec<String> {
    let mut usb_ports = vec![];
    match available_ports() {
        Ok(ports) => {
            for p in ports {
                match p.port_type {
                    // USB ports give us more info about the connected
                    // serial controller
                    SerialPortType::UsbPort(info) => {
                        let extended_name = format!(
                            "{}: ({} / {})",
                            p.port_name,
                            info.manufacturer.as_ref().map_or("", String::as_str),
                            info.product.as_ref().map_or("", String::as_str)
                        );
                        usb_ports.push(extended_name);
                    }
                    // We're also interested in the other devices, such as
                    // virtual ports for testing
                    _ => {
                        usb_ports.push(p.port_name);
                    }
                }
            }
        }
        Err(ref e) => {
            info!("error: {}", e.to_string());
        }
    }
    usb_ports
}

fn select_port_interactive(ports: &[String]) -> Option<String> {
    use dialoguer::{theme::ColorfulTheme, Select};

    let term = Term::buffered_stderr();
    let theme = ColorfulTheme::default();

    let mut select = Select::with_theme(&theme);
    for item in ports {
        select.item(item);
    }

    let selection = select.default(0).interact_on_opt(&term).ok()?;
    selection
        .and_then(|index| ports.get(index))
        .and_then(|name| name.split(':').next())
        .map(String::from)
}
