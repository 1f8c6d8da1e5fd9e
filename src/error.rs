use thiserror::Error;

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("trade-off must be one of geodesic/accuracy or planar/speed, got `{0}`")]
    InvalidMetric(String),

    #[error("chunk size must be a positive integer")]
    InvalidChunkSize,

    /// A distance matrix with zero columns has no minimum.
    #[error("no active postcodes left after filtering retired entries")]
    NoActivePostcodes,

    #[error("{dataset} file is missing required column `{column}`")]
    MissingColumn { dataset: &'static str, column: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, JoinError>;
