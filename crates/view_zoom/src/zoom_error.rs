// ---------------------------------------------------------------------------
// ZoomError: failures at the wire and configuration boundaries
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors surfaced by snapshot decoding and parameter loading.
///
/// Input and interpolation never fail: capability misses are silent no-ops and
/// bad remote values are clamped. Only bytes and files from outside the
/// process produce a `ZoomError`.
#[derive(Debug)]
pub enum ZoomError {
    /// Parameter file could not be read.
    Io(std::io::Error),
    /// Snapshot bytes did not decode.
    Decode(String),
    /// A decoded snapshot carried NaN or infinity.
    NonFinite { field: &'static str },
    /// Parameter file was not valid JSON for `ZoomParams`.
    Json(String),
    /// Parameters parsed but violate a constraint.
    InvalidParams(String),
}

impl fmt::Display for ZoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoomError::Io(e) => write!(f, "I/O error: {e}"),
            ZoomError::Decode(msg) => write!(f, "Snapshot decoding error: {msg}"),
            ZoomError::NonFinite { field } => {
                write!(f, "Snapshot field `{field}` is not finite")
            }
            ZoomError::Json(msg) => write!(f, "Parameter parse error: {msg}"),
            ZoomError::InvalidParams(msg) => write!(f, "Invalid zoom parameters: {msg}"),
        }
    }
}

impl std::error::Error for ZoomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZoomError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ZoomError {
    fn from(e: std::io::Error) -> Self {
        ZoomError::Io(e)
    }
}

impl From<bitcode::Error> for ZoomError {
    fn from(e: bitcode::Error) -> Self {
        ZoomError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for ZoomError {
    fn from(e: serde_json::Error) -> Self {
        ZoomError::Json(e.to_string())
    }
}
