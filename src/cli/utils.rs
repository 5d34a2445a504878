//! Convenience helpers for stream acquisition.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rekoatlas::ConvertError;

/// `None` and `-` both select the standard stream.
fn is_std_stream(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p.as_os_str() == "-")
}

/// Human-readable name of a path argument, for error context.
pub fn describe(path: Option<&Path>, std_name: &str) -> String {
    match path {
        Some(p) if !is_std_stream(Some(p)) => p.display().to_string(),
        _ => std_name.to_string(),
    }
}

/// Open the cardset for reading, falling back to stdin.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(p) if !is_std_stream(Some(p)) => {
            let file = File::open(p).with_context(|| format!("failed to open {}", p.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}

/// Open the atlas destination, falling back to stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_std_stream(Some(p)) => {
            let file = File::create(p)
                .map_err(ConvertError::Io)
                .with_context(|| format!("failed to create {}", p.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
