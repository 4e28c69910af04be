//! Layout errors.

use thiserror::Error;

use multichat_browser::GatewayError;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// The platform returned no displays at all.
    #[error("No displays available")]
    NoDisplays,

    /// A companion needs a normal browser window to tile against.
    #[error("No focused normal window to place the companion next to")]
    NoFocusedWindow,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(LayoutError::NoDisplays.to_string(), "No displays available");
        let err: LayoutError = GatewayError::CreateFailed("boom".to_string()).into();
        assert!(err.to_string().contains("boom"));
    }
}
