use thiserror::Error;

pub type VolidResult<T> = Result<T, VolidError>;

#[derive(Debug, Error)]
pub enum VolidError {
    #[error("Buffer unavailable: {length} bytes at offset {offset:#x}")]
    Unavailable { offset: u64, length: usize },

    #[error("Read of {length} bytes at offset {offset:#x} lies outside extent of {extent} bytes")]
    OutOfRange { offset: u64, length: usize, extent: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
