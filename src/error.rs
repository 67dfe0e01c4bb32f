use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Parse Error: {0}")]
    Parse(String),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
    #[error("Signal Error: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = TrendError> = std::result::Result<T, E>;
