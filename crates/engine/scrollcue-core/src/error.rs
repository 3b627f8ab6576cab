//! Error types for attribute parsing and engine configuration.
//!
//! None of these reach the host page: attribute errors are turned into
//! documented defaults by [`ElementConfig::from_host`](crate::config::ElementConfig::from_host),
//! and configuration errors only surface from binding constructors.

/// Failure to interpret a declarative attribute value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AttributeError {
    /// The required animation class attribute is absent or blank.
    #[error("missing required attribute: {name}")]
    Missing { name: String },

    /// The value has no usable numeric prefix, or the number is not finite.
    #[error("malformed {name} value: {value:?}")]
    Malformed { name: String, value: String },

    /// The threshold resolved to an infinite or NaN fraction.
    #[error("threshold resolves to non-finite fraction {0}")]
    NonFinite(f64),

    /// A pixel threshold cannot be normalized against a collapsed viewport.
    #[error("cannot resolve {px}px against viewport height {viewport_height}")]
    DegenerateViewport { px: i64, viewport_height: f64 },
}

/// Rejected engine configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("default_threshold must be finite, got {0}")]
    InvalidThreshold(f64),
}
