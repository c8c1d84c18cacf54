//! Utilities module for logging and error handling

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{DiagnosisError, ErrorKind, Result};
pub use logging::{init_logging, parse_level, LogConfig, LogFormat};

/// Format a duration in milliseconds with two decimals
pub fn format_millis(seconds: f64) -> String {
    format!("{:.2} ms", seconds * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0.0125), "12.50 ms");
    }
}
