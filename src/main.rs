use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use classdump_class_file::ClassFile;

/// Decodes a class file and prints it as JSON.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// The `.class` file to decode.
    path: PathBuf,

    /// Print the JSON on a single line.
    #[arg(long = "compact")]
    compact: bool,

    /// Log decoding progress, unless `RUST_LOG` says otherwise.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) if verbose => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Warn);
        }
    }
    builder.init();
}

fn render(class_file: &ClassFile, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(class_file)
    } else {
        serde_json::to_string_pretty(class_file)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let bytes = fs::read(&cli.path).with_context(|| format!("failed to read {:?}", cli.path))?;
    log::debug!("read {} bytes from {:?}", bytes.len(), cli.path);

    let class_file =
        ClassFile::parse(&bytes).with_context(|| format!("failed to decode {:?}", cli.path))?;

    println!("{}", render(&class_file, cli.compact)?);

    Ok(())
}
