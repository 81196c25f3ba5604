use clap::error::ErrorKind;
use clap::Parser;
use log::info;
use ptrid::app_config::CaptureConfig;
use ptrid::error::{PtridError, Result};
use ptrid::library::{Metric, ReferenceLibrary};
use ptrid::session::{self, HttpClassifier};
use ptrid::sniffer::{self, Sniffer};
use std::path::PathBuf;
use std::time::Duration;

/// Online payload-type identification on live HTTP traffic.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Paths to directories containing training files of the same type
    #[clap(long, required = true, num_args = 1.., value_name = "DIR")]
    types: Vec<PathBuf>,

    /// Directory for the pcap dump of the capture
    #[clap(long, default_value = ".", value_name = "DIR")]
    save: PathBuf,

    /// Analysis mode: MC (Markov-chain likelihood), ID (information
    /// distance) or CHI2 (chi-square)
    #[clap(long, value_enum, default_value = "MC")]
    mode: Metric,

    /// Path to a TOML file with capture settings
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    if let Err(e) = run(&cli) {
        println!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    for dir in &cli.types {
        if !dir.is_dir() {
            return Err(PtridError::InvalidInput(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    }

    let config = match &cli.config {
        Some(path) => CaptureConfig::from_file(path).map_err(|e| {
            PtridError::InvalidInput(format!("bad config {}: {e}", path.display()))
        })?,
        None => CaptureConfig::default(),
    };
    config.validate().map_err(PtridError::InvalidInput)?;

    let library = ReferenceLibrary::build(&cli.types, cli.mode)?;
    info!("reference library ready: {} types", library.len());

    let interface = match config.interface.clone() {
        Some(name) => name,
        None => sniffer::available_interfaces()?
            .into_iter()
            .next()
            .ok_or_else(|| PtridError::InvalidInput("no capture interface available".into()))?,
    };
    info!("capturing on {interface}");

    let mut classifier = HttpClassifier::new(library);
    let mut sniffer = Sniffer::open(&interface, &cli.save, config.snaplen, config.promiscuous)?;
    sniffer.run(Duration::from_secs(config.duration_secs), |header, data| {
        if let Some(verdict) = classifier.process(data, header.caplen as usize) {
            session::print_verdict(classifier.library(), &verdict);
        }
    })?;
    Ok(())
}
