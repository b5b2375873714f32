use thiserror::Error;

#[derive(Error, Debug)]
pub enum PropsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("config normalizer failed: {0}")]
    Normalizer(#[from] anyhow::Error),

    #[error("not an object: {0}")]
    NotAnObject(&'static str),

    #[error("invalid key path: {0}")]
    InvalidKeyPath(String),
}
