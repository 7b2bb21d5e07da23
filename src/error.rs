use thiserror::Error;

/// Errors surfaced by the editing core.
///
/// All of these are local and recoverable: the session that produced them is
/// left exactly as it was, so the caller may retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// No usable image was supplied when starting an edit session
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The offscreen surface or a drawing resource could not be created
    #[error("render failure: {0}")]
    RenderFailure(String),

    /// Encoding the rendered surface produced no data
    #[error("serialization failure: {0}")]
    SerializationFailure(String),

    /// The session was closed before a queued export finished
    #[error("export cancelled before completion")]
    ExportCancelled,
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Errors raised while loading an [`EditorConfig`](crate::config::EditorConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid scale range [{min}, {max}]")]
    InvalidScaleRange { min: f32, max: f32 },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EditorError::InvalidInput("no image data".into());
        assert_eq!(err.to_string(), "invalid input: no image data");

        let err = ConfigError::InvalidScaleRange { min: 2.0, max: 1.0 };
        assert!(err.to_string().contains("[2, 1]"));
    }
}
