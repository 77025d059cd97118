#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("unsupported task: {0:?} (only \"summarization\" is available)")]
    UnsupportedTask(String),
    #[error("invalid length bounds: min_length {min} is greater than max_length {max}")]
    InvalidLengthBounds { min: usize, max: usize },
    #[error("model resolution failed: {0}")]
    Hub(#[from] hf_hub::api::sync::ApiError),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("model error: {0}")]
    Model(#[from] candle_core::Error),
    #[error("invalid model config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SummarizeError {
    pub fn tokenizer(err: impl std::fmt::Display) -> Self {
        Self::Tokenizer(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SummarizeError>;
