//! Error types.

use thiserror::Error;

/// Errors raised while configuring or launching the laser injection.
#[derive(Debug, Error)]
pub enum Error {
    /// The setup is physically or geometrically unsound. Callers should treat
    /// this as fatal for the run.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Adapter, device or buffer mapping failure on the GPU backend.
    #[error("GPU error: {0}")]
    Gpu(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("laser plane outside local domain".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: laser plane outside local domain"
        );
        assert!(Error::Gpu("no adapter".into()).to_string().contains("no adapter"));
    }
}
