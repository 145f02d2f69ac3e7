/// Result alias that carries the custom [`CaptchaError`] type.
pub type Result<T> = std::result::Result<T, CaptchaError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    /// Parameters rejected before any generation work starts. No partial
    /// sequence is ever produced alongside this error.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A font or similar resource could not be loaded. The mask builder
    /// recovers from this locally by switching to the built-in font.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    /// Frame rendering could not be scheduled, e.g. the worker pool failed
    /// to start.
    #[error("render: {0}")]
    Render(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration documents that fail to deserialize.
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
    /// Failures reported by the container encoder.
    #[error("encode: {0}")]
    Encode(#[from] image::ImageError),
}

impl CaptchaError {
    /// Creates an input-validation error from the provided message.
    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a resource error from the provided message.
    pub fn unavailable<T: Into<String>>(msg: T) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Creates a rendering error from the provided message.
    pub fn render<T: Into<String>>(msg: T) -> Self {
        Self::Render(msg.into())
    }

    /// Returns `true` for errors that reject the caller's parameters.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Rejects zero values for dimensions, counts and speeds.
pub(crate) fn ensure_positive(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(CaptchaError::invalid(format!("{name} must be > 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_values() {
        let err = ensure_positive("scroll speed", 0).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(format!("{err}").contains("scroll speed"));
        assert!(ensure_positive("scroll speed", 2).is_ok());
    }
}
