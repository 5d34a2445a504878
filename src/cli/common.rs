//! Shared clap helper types for the CLI.

use clap::ValueEnum;
use rekoatlas::OutputFormat;

/// Atlas file formats accepted by `--format`.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormatArg {
    Ppm,
    Png,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> OutputFormat {
        match value {
            OutputFormatArg::Ppm => OutputFormat::Ppm,
            OutputFormatArg::Png => OutputFormat::Png,
        }
    }
}
