//! Command-line interface wiring for the `rekoatlas` binary.
//!
//! This module owns the clap definitions, logging setup and the single
//! convert/info command; the library does all the decoding.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rekoatlas::{ConvertOptions, LayoutMode, read_info, render_atlas, write_atlas};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub mod common;
pub mod utils;

use common::OutputFormatArg;

/// Parsed CLI entrypoint for the `rekoatlas` binary.
#[derive(Parser, Debug)]
#[command(
    name = "rekoatlas",
    version,
    about = "Convert PC (PCREKO) and Amiga (REKO) cardsets into one PPM card atlas"
)]
pub struct Cli {
    /// Cardset file to convert (default or `-`: stdin).
    pub input: Option<PathBuf>,

    /// Output file (default or `-`: stdout).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Create the card order of the Amiga datatype mreko.
    #[arg(short = 'm', long = "mreko", overrides_with = "rekodt")]
    pub mreko: bool,

    /// Create the card order of the Amiga V39 datatype.
    #[arg(short = 'd', long = "rekodt", overrides_with = "mreko")]
    pub rekodt: bool,

    /// Create a back card for PC cardsets.
    #[arg(short = 'b', long = "back")]
    pub back: bool,

    /// Print cardset information instead of converting.
    #[arg(short = 'i', long = "info")]
    pub info: bool,

    /// Print the information as JSON.
    #[arg(long, requires = "info")]
    pub json: bool,

    /// Image format of the atlas.
    #[arg(long, default_value_t = OutputFormatArg::Ppm, value_enum)]
    pub format: OutputFormatArg,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored log output.
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Layout mode selected by the (mutually overriding) mode flags.
    pub fn layout_mode(&self) -> LayoutMode {
        if self.rekodt {
            LayoutMode::RekoDt39
        } else if self.mreko {
            LayoutMode::MReko
        } else {
            LayoutMode::Normal
        }
    }
}

/// Route log events to stderr; stdout may carry the image.
pub fn init_logging(verbose: bool, no_color: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install log subscriber")
}

/// Execute the requested conversion.
pub fn run(cli: Cli) -> Result<()> {
    let mode = cli.layout_mode();
    let source = utils::describe(cli.input.as_deref(), "stdin");
    let mut input = utils::open_input(cli.input.as_deref())?;

    if cli.info {
        let info = read_info(&mut input, mode)
            .with_context(|| format!("failed to read cardset header from {}", source))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print!("{}", info);
        }
        return Ok(());
    }

    let options = ConvertOptions {
        mode,
        back_card: cli.back,
    };
    let image = render_atlas(&mut input, &options)
        .with_context(|| format!("failed to convert {}", source))?;

    let target = utils::describe(cli.output.as_deref(), "stdout");
    let output = utils::open_output(cli.output.as_deref())?;
    write_atlas(&image, cli.format.into(), output)
        .with_context(|| format!("failed to write {}", target))?;
    tracing::info!(
        width = image.width(),
        height = image.height(),
        "wrote atlas to {}",
        target
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_mode_flag_wins() {
        let cli = Cli::parse_from(["rekoatlas", "-m", "-d"]);
        assert_eq!(cli.layout_mode(), LayoutMode::RekoDt39);
        let cli = Cli::parse_from(["rekoatlas", "--rekodt", "--mreko"]);
        assert_eq!(cli.layout_mode(), LayoutMode::MReko);
        let cli = Cli::parse_from(["rekoatlas", "cards.rkp"]);
        assert_eq!(cli.layout_mode(), LayoutMode::Normal);
    }

    #[test]
    fn json_requires_info() {
        assert!(Cli::try_parse_from(["rekoatlas", "--json"]).is_err());
        let cli = Cli::parse_from(["rekoatlas", "-i", "--json", "-"]);
        assert!(cli.info && cli.json);
    }
}
