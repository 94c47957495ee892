//! Logcom command line interface.

use std::process;

use clap::{crate_authors, crate_description, crate_name, crate_version, App, AppSettings::*, Arg};
use log::{debug, trace, LevelFilter};
use simplelog::*;

use logcom::{self as lc, host};

fn main() {
    println!("[LC] logcom v{}", crate_version!());

    ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        process::exit(0);
    })
    .expect("Failed to install my Ctrl-C handler!");

    let matches = App::new(crate_name!())
        .version(format!("v{}", crate_version!()).as_str())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "\n\
            Logcom captures everything arriving on a serial line and \
            persists it into rotating, timestamped log files inside the \
            media directory — typically the mount point of a memory \
            card.\n\
            \n\
            The link parameters and the rotation size are read from a \
            `config.ini` at the root of the media; when there is none, \
            one is created with the defaults (automatic rate detection, \
            8-N-1, 1024 KB files) so it can be edited afterwards. A \
            configured rate of 0 makes logcom sweep the standard rates, \
            fastest first, until the line shows clean traffic.\n\
            \n\
            Logcom can be started before or after the probed device is \
            powered. Pulling the media stops the capture; putting it \
            back starts a fresh one, exactly like power-cycling the \
            standalone logger this replaces.\
        ",
        )
        .max_term_width(80)
        .setting(ColoredHelp)
        .setting(NextLineHelp)
        .arg(
            Arg::with_name("DEVICE_TTY")
                .help("the USB tty device to capture")
                .long_help(
                    "the USB tty device to capture; may change when the \
                     probe is unplugged and re-plugged and may differ \
                     between systems. You can opt for selecting a device \
                     interactively by not passing this option.",
                )
                .short("-t")
                .long("--tty")
                .takes_value(true)
                .require_equals(true),
        )
        .arg(
            Arg::with_name("MEDIA_DIR")
                .help("directory standing in for the removable media")
                .long_help(
                    "directory standing in for the removable media; log \
                     files and config.ini land here. Point it at the \
                     mount point of a memory card to mirror the \
                     standalone logger.",
                )
                .index(1)
                .default_value("."),
        )
        .arg(Arg::with_name("v").short("v").multiple(true).help(
            "Sets the logging level of verbosity, repeat several times for \
                higher verbosity",
        ))
        .get_matches();

    // Vary the output based on how many times the user used the "verbose"
    // flag (i.e. 'logcom -v -v -v' or 'logcom -vvv' vs 'logcom -v')
    let log_level: LevelFilter;
    match matches.occurrences_of("v") {
        0 => log_level = LevelFilter::Warn,
        1 => log_level = LevelFilter::Info,
        2 => log_level = LevelFilter::Debug,
        _ => log_level = LevelFilter::Trace,
    }

    TermLogger::init(log_level, Config::default(), TerminalMode::Mixed).unwrap();

    trace!("{:#?}", matches);

    // It's safe to call unwrap here because the argument has a default
    // value.
    let media_dir = matches.value_of("MEDIA_DIR").unwrap().to_owned();

    // A specific device waits for that device; otherwise the connected
    // ports are offered for interactive selection.
    let tty = match matches.value_of("DEVICE_TTY") {
        Some(path) => {
            host::wait_for_port(path);
            path.to_owned()
        }
        None => loop {
            if let Some(path) = host::select_port() {
                break path;
            }
        },
    };

    debug!("capturing {} into {}", tty, media_dir);

    // Run the state machine ===================================================

    let board = lc::Board {
        link: Box::new(host::HostSerial::new(tty)),
        disk: lc::StorageGuard::new(Box::new(host::DirStorage::new(&media_dir))),
        volume: Box::new(host::DirVolume::new(&media_dir)),
        signals: Box::new(host::FolderSignals::new(&media_dir)),
        host_link: Box::new(host::NullHostLink::default()),
        watchdog: Box::new(host::SoftWatchdog::default()),
        timer: Box::new(host::SleepTimer::default()),
        clock: Box::new(host::WallClock::default()),
        indicators: Box::new(host::ConsoleIndicators::default()),
    };

    lc::factory(board).run();
}
