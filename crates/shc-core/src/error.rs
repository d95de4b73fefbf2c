use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("mismatch: {0}")]
    Mismatch(String),
    #[error("no usable data: {0}")]
    NoData(String),
    #[error("external producer failed: {0}")]
    Producer(String),
}

pub type ShcResult<T> = Result<T, ShcError>;

impl ShcError {
    /// Short machine-readable tag used in progress events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::Mismatch(_) => "mismatch",
            Self::NoData(_) => "no_data",
            Self::Producer(_) => "producer",
        }
    }
}
