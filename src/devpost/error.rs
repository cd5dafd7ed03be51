use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevpostError {
    #[error("Write failed: {0}")]
    Write(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Could not resolve URL: {0}")]
    Resolve(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, DevpostError>;
