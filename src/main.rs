//! # Faro CLI
//!
//! Front-panel daemon for a Raspberry Pi print server wearing a PiFace
//! Control and Display board.
//!
//! ## Usage
//!
//! ```bash
//! # Run the status panel (the long-lived service mode)
//! faro status
//!
//! # Watch a different print queue
//! faro status --printer hp_LaserJet_3020
//!
//! # Scan into a different share
//! faro status --store /mnt/storage/tmp/Scanner
//!
//! # Mirror boot-logger output on the panel during startup
//! faro bootlog
//!
//! # Flash the system-up banner once booting is done
//! faro splash
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};

use faro::{
    FaroError, Panel, PiFaceLcd, Spi, boot, buttons,
    expander::Mcp23s17,
    scan::SaneTools,
    status::{IpStatus, PrinterStatus, ScannerStatus, StatusSource},
};

/// Faro - PiFace CAD front panel for a print server
#[derive(Parser, Debug)]
#[command(name = "faro")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the status panel and scan console
    Status {
        /// SPI device the board is wired to
        #[arg(long, default_value = "/dev/spidev0.1")]
        device: String,

        /// CUPS queue to watch
        #[arg(long, default_value = "hp_LaserJet_3020")]
        printer: String,

        /// Directory finished scans are delivered to
        #[arg(long, default_value = "/mnt/storage/tmp/Scanner")]
        store: PathBuf,

        /// Scratch directory for in-flight scan pages
        #[arg(long, default_value = "/tmp")]
        scratch: PathBuf,
    },

    /// Mirror boot-logger lines on the panel until killed
    Bootlog {
        /// SPI device the board is wired to
        #[arg(long, default_value = "/dev/spidev0.1")]
        device: String,

        /// FIFO the boot logger writes into
        #[arg(long, default_value = boot::BOOT_FIFO)]
        fifo: PathBuf,
    },

    /// Show the system-up banner for a few seconds and exit
    Splash {
        /// SPI device the board is wired to
        #[arg(long, default_value = "/dev/spidev0.1")]
        device: String,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), FaroError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status {
            device,
            printer,
            store,
            scratch,
        } => {
            let (chip, lcd) = open_board(&device)?;
            let buttons = buttons::listen(chip)?;

            let lines: Vec<Box<dyn StatusSource>> = vec![
                Box::new(IpStatus),
                Box::new(PrinterStatus::new(&printer)?),
                Box::new(ScannerStatus),
            ];

            log::info!("status panel up on {}, watching queue {}", device, printer);
            Panel::new(lcd, lines, buttons, SaneTools, scratch, store)?.run()
        }

        Commands::Bootlog { device, fifo } => {
            let (_, mut lcd) = open_board(&device)?;
            log::info!("following boot log at {}", fifo.display());
            boot::follow(&mut lcd, &fifo)
        }

        Commands::Splash { device } => {
            let (_, mut lcd) = open_board(&device)?;
            boot::splash(&mut lcd)
        }
    }
}

/// Bring up the expander and the display behind it.
///
/// The expander handle is cheap to clone; the caller keeps one for the
/// button poller while the display owns another.
fn open_board(device: &str) -> Result<(Mcp23s17, PiFaceLcd), FaroError> {
    let spi = Arc::new(Mutex::new(Spi::open(device)?));

    let chip = Mcp23s17::new(spi);
    chip.init()?;

    let mut lcd = PiFaceLcd::new(chip.clone());
    lcd.init()?;

    Ok((chip, lcd))
}
