use thiserror::Error;

/// Unified result type for the tilegrid crate.
pub type Result<T> = std::result::Result<T, TilesError>;

/// Errors surfaced by the tile layout engine.
#[derive(Debug, Error)]
pub enum TilesError {
    #[error("region `{0}` not present in page build")]
    RegionNotFound(String),
    #[error("container `{0}` is not registered")]
    UnknownContainer(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("manifest decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
