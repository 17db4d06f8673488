// crates/pcg_config/src/error.rs

//! Config layer errors

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid value
    #[error("invalid value '{key}': {value} - {reason}")]
    InvalidValue {
        /// Config key
        key: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "thread_pool.thread_name".to_string(),
            value: String::new(),
            reason: "must not be empty".to_string(),
        };
        assert!(err.to_string().contains("thread_pool.thread_name"));
    }
}
