use thiserror::Error;

/// Main error type for Callmap operations
#[derive(Error, Debug)]
pub enum CallmapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}

pub type Result<T> = std::result::Result<T, CallmapError>;
