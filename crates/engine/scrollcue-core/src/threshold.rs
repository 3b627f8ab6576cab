//! Threshold resolution: raw trigger-line attribute → viewport fraction.
//!
//! Three shapes are recognised:
//! - `"<int>px"`: pixels from the viewport top, divided by viewport height.
//! - `"<float>"`: a fraction of viewport height.
//! - `"<float><unit>"`: any other CSS length. Only the numeric prefix is
//!   used, as a fraction, so `"10rem"` resolves to `10.0`. Units are not
//!   converted to pixels.
//!
//! Anything without a numeric prefix falls back to the configured default.

use serde::{Deserialize, Serialize};

use crate::error::AttributeError;
use crate::numeric::{int_prefix, split_float_prefix};

/// Fraction used when an element gives no usable threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Parsed, not yet resolved, threshold attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ThresholdSpec {
    /// Attribute absent.
    Default,
    /// Bare number, read as a fraction of viewport height.
    Fraction(f64),
    /// `<int>px`, pixels from the viewport top.
    Pixels(i64),
    /// Number followed by a unit other than `px`; the unit is kept for logging only.
    Length { value: f64, unit: String },
}

impl ThresholdSpec {
    /// Parse the value of attribute `name`. `None` means the attribute is
    /// absent. `name` only labels the error.
    pub fn parse(raw: Option<&str>, name: &str) -> Result<Self, AttributeError> {
        let Some(raw) = raw else {
            return Ok(Self::Default);
        };
        let value = raw.trim();
        let malformed = || AttributeError::Malformed {
            name: name.to_string(),
            value: raw.to_string(),
        };

        if value.ends_with("px") {
            return int_prefix(value).map(Self::Pixels).ok_or_else(malformed);
        }

        let (number, rest) = split_float_prefix(value)
            .filter(|(number, _)| number.is_finite())
            .ok_or_else(malformed)?;
        if rest.trim().is_empty() {
            Ok(Self::Fraction(number))
        } else {
            Ok(Self::Length {
                value: number,
                unit: rest.trim().to_string(),
            })
        }
    }

    /// Normalize to a viewport fraction against the current viewport height.
    /// The result is always finite.
    pub fn resolve(&self, viewport_height: f64, default: f64) -> Result<f64, AttributeError> {
        let fraction = match *self {
            Self::Default => default,
            Self::Fraction(f) => f,
            Self::Length { value, .. } => value,
            Self::Pixels(px) => {
                if viewport_height > 0.0 && viewport_height.is_finite() {
                    px as f64 / viewport_height
                } else {
                    return Err(AttributeError::DegenerateViewport {
                        px,
                        viewport_height,
                    });
                }
            }
        };
        if fraction.is_finite() {
            Ok(fraction)
        } else {
            Err(AttributeError::NonFinite(fraction))
        }
    }
}

/// Trigger line position in CSS pixels from the viewport top.
#[inline]
pub fn trigger_line(fraction: f64, viewport_height: f64) -> f64 {
    fraction * viewport_height
}
