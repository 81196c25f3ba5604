use clap::error::ErrorKind;
use clap::Parser;
use log::debug;
use ptrid::error::Result;
use ptrid::library::{Metric, ReferenceLibrary};
use ptrid::reader::ByteReader;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Offline payload-type identification: classify files interactively
/// against training directories.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Directories containing training files, one directory per type
    #[clap(required = true, value_name = "DIR")]
    types: Vec<PathBuf>,

    /// Comparison metric
    #[clap(long, value_enum, default_value = "ID")]
    mode: Metric,
}

fn main() {
    env_logger::init();
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
    if let Err(e) = run(&cli) {
        println!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let library = ReferenceLibrary::build(&cli.types, cli.mode)?;

    println!("Hello!");
    println!("Write 'exit' for work's end.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Input path to file: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let input = line?;
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }

        let path = Path::new(input);
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                if let Err(e) = classify_file(path, &library) {
                    debug!("classification failed: {e}");
                    println!("Couldn't read the file");
                }
            }
            _ => println!("Not a regular file."),
        }
    }
    Ok(())
}

fn classify_file(path: &Path, library: &ReferenceLibrary) -> Result<()> {
    let mut reader = ByteReader::new(2);
    reader.read_file(path)?;
    let winner = library.analyzer().score(reader.frequencies());
    println!("Type: {} ({})", winner + 1, library.metric().tag());
    Ok(())
}
