use thiserror::Error;

use crate::parse::ParseError;
use crate::types::ModelError;

/// Unified error type covering model construction, parsing, loading and I/O.
///
/// Returned by convenience methods like [`Unit::from_json()`](crate::Unit::from_json)
/// and [`Unit::from_file()`](crate::Unit::from_file).
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
