use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Every way a cardset conversion can fail. Each variant aborts the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unrecognized cardset format ({})", describe_leading(.0))]
    UnrecognizedFormat(Option<u8>),
    #[error("unsupported cardset: {0}")]
    UnsupportedCardset(String),
    #[error("no pixel decoder for {variant} cardsets with depth {depth}{}", ham_suffix(.ham))]
    UnsupportedEncoding {
        variant: &'static str,
        depth: u8,
        ham: bool,
    },
    #[error("card {index} is truncated: expected {expected} bytes")]
    TruncatedCard { index: usize, expected: usize },
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
    #[error("cannot allocate {bytes} bytes for the atlas")]
    AllocationFailure {
        bytes: usize,
        #[source]
        source: TryReserveError,
    },
}

impl ConvertError {
    /// Process exit status reported by the binary for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConvertError::TruncatedCard { .. } => 10,
            ConvertError::UnrecognizedFormat(_) => 20,
            ConvertError::UnsupportedCardset(_) => 21,
            ConvertError::UnsupportedEncoding { .. } => 22,
            ConvertError::Io(_) => 30,
            ConvertError::AllocationFailure { .. } => 40,
        }
    }

    pub(crate) fn unsupported<S: Into<String>>(reason: S) -> Self {
        ConvertError::UnsupportedCardset(reason.into())
    }
}

fn ham_suffix(ham: &bool) -> &'static str {
    if *ham { " (HAM)" } else { "" }
}

fn describe_leading(byte: &Option<u8>) -> String {
    match byte {
        Some(b) if b.is_ascii_graphic() => format!("leading byte '{}'", *b as char),
        Some(b) => format!("leading byte {:#04x}", b),
        None => "empty input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exit_codes_are_distinct() {
        let mut codes = vec![
            ConvertError::UnrecognizedFormat(Some(b'X')).exit_code(),
            ConvertError::unsupported("bad magic").exit_code(),
            ConvertError::UnsupportedEncoding {
                variant: "PC",
                depth: 4,
                ham: false,
            }
            .exit_code(),
            ConvertError::TruncatedCard {
                index: 3,
                expected: 11956,
            }
            .exit_code(),
            ConvertError::Io(io::Error::other("closed")).exit_code(),
        ];
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 5);
    }

    #[test]
    fn leading_byte_is_described() {
        assert_eq!(
            ConvertError::UnrecognizedFormat(Some(b'X')).to_string(),
            "unrecognized cardset format (leading byte 'X')"
        );
        assert_eq!(
            ConvertError::UnrecognizedFormat(None).to_string(),
            "unrecognized cardset format (empty input)"
        );
    }
}
