use thiserror::Error;

/// Top-level error type shared by every `pulse` crate.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("config error: {0}")]
    Config(String),

    #[error("no samples collected yet")]
    NoSamples,

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = PulseError> = std::result::Result<T, E>;
