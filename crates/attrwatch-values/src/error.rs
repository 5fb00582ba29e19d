use thiserror::Error;

/// Error channel for [`ValueObserverDelegate::parse_value_for_token`].
///
/// The observer treats the payload as opaque.
///
/// [`ValueObserverDelegate::parse_value_for_token`]: crate::ValueObserverDelegate::parse_value_for_token
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Ready-made parse error for delegates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueParseError {
    #[error("invalid token {content:?}: {reason}")]
    Invalid { content: String, reason: String },
}

impl ValueParseError {
    #[must_use]
    pub fn invalid(content: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            content: content.into(),
            reason: reason.into(),
        }
    }
}

/// Rejected [`ObserverConfig`](crate::ObserverConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("sweep threshold must be at least 1")]
    ZeroSweepThreshold,
}
