//! Engine configuration and the typed per-element attribute configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AttributeError, ConfigError};
use crate::host::Host;
use crate::numeric::float_prefix;
use crate::threshold::{ThresholdSpec, DEFAULT_THRESHOLD};

/// Palette cycled across debug-enabled elements in registration order.
pub const DEFAULT_PALETTE: [&str; 6] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4",
];

/// Engine-wide settings. Every field has a default, so hosts may pass a
/// partial object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fraction used when an element's threshold is absent or unusable.
    pub default_threshold: f64,
    /// Quiet period after the last resize before the full rebuild runs.
    pub resize_debounce_ms: f64,
    /// Rendering frames to wait before drawing debug markers.
    pub settle_frames: u32,
    /// Debug marker colors (any CSS color).
    pub palette: Vec<String>,
    /// Prepended to every attribute name, e.g. `"data-"`.
    pub attribute_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
            resize_debounce_ms: 200.0,
            settle_frames: 3,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            attribute_prefix: String::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if !self.resize_debounce_ms.is_finite() || self.resize_debounce_ms < 0.0 {
            return Err(ConfigError::InvalidDuration {
                field: "resize_debounce_ms",
                value: self.resize_debounce_ms,
            });
        }
        if !self.default_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.default_threshold));
        }
        Ok(())
    }

    pub fn attribute_names(&self) -> AttributeNames {
        AttributeNames::with_prefix(&self.attribute_prefix)
    }
}

/// Fully qualified attribute names for one prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeNames {
    pub class: String,
    pub threshold: String,
    pub reverse: String,
    pub debug: String,
    pub children: String,
    pub stagger: String,
}

impl AttributeNames {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            class: format!("{prefix}animation-class"),
            threshold: format!("{prefix}animation-threshold"),
            reverse: format!("{prefix}animation-reverse"),
            debug: format!("{prefix}debug"),
            children: format!("{prefix}children"),
            stagger: format!("{prefix}children-stagger"),
        }
    }
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self::with_prefix("")
    }
}

/// Exit behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reverse {
    /// Once entered, stay entered.
    #[default]
    None,
    /// Exit removes the animation class.
    Mirror,
    /// Exit removes the animation class and adds this one; enter removes it again.
    Alternate(String),
}

impl Reverse {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("false") => Self::None,
            Some("true") => Self::Mirror,
            Some(class) => Self::Alternate(class.to_string()),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn alternate_class(&self) -> Option<&str> {
        match self {
            Self::Alternate(class) => Some(class),
            _ => None,
        }
    }
}

/// Animation target delegation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Children {
    /// Animate the element itself.
    #[default]
    None,
    /// Animate direct child elements.
    Direct,
    /// Animate every descendant carrying this class.
    Class(String),
}

impl Children {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("false") => Self::None,
            Some("true") => Self::Direct,
            Some(selector) => {
                let class = selector.strip_prefix('.').unwrap_or(selector);
                if class.is_empty() {
                    Self::None
                } else {
                    Self::Class(class.to_string())
                }
            }
        }
    }

    #[inline]
    pub fn is_delegated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Parse a stagger duration into milliseconds.
///
/// `"<n>ms"` is taken literally, `"<n>s"` is scaled by 1000 and a bare number
/// is already milliseconds. Absent means no stagger. `name` only labels the
/// error.
pub fn parse_stagger(raw: Option<&str>, name: &str) -> Result<f64, AttributeError> {
    let Some(raw) = raw else {
        return Ok(0.0);
    };
    let value = raw.trim();
    let malformed = || AttributeError::Malformed {
        name: name.to_string(),
        value: raw.to_string(),
    };
    let parsed = if value.ends_with("ms") {
        float_prefix(value)
    } else if value.ends_with('s') {
        float_prefix(value).map(|secs| secs * 1000.0)
    } else {
        float_prefix(value)
    };
    let ms = parsed.filter(|ms| ms.is_finite()).ok_or_else(malformed)?;
    Ok(ms.max(0.0))
}

/// Typed configuration of one element, parsed once per registration pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub animation_class: String,
    pub threshold: ThresholdSpec,
    pub reverse: Reverse,
    pub children: Children,
    /// Per-target delay in milliseconds; 0 means all targets at once.
    pub stagger_ms: f64,
    pub debug: bool,
}

impl ElementConfig {
    /// A config with only the animation class set.
    pub fn new(animation_class: impl Into<String>) -> Self {
        Self {
            animation_class: animation_class.into(),
            threshold: ThresholdSpec::Default,
            reverse: Reverse::None,
            children: Children::None,
            stagger_ms: 0.0,
            debug: false,
        }
    }

    /// Read and parse every attribute of `node`.
    ///
    /// Only a missing animation class is an error; malformed optional values
    /// fall back to their defaults.
    pub fn from_host<H: Host>(
        host: &H,
        node: &H::Node,
        names: &AttributeNames,
    ) -> Result<Self, AttributeError> {
        let animation_class = read_animation_class(host, node, names)?;

        let raw_threshold = host.attribute(node, &names.threshold);
        let threshold = ThresholdSpec::parse(raw_threshold.as_deref(), &names.threshold)
            .unwrap_or_else(|e| {
                log::debug!("{e}; falling back to default threshold");
                ThresholdSpec::Default
            });
        if let ThresholdSpec::Length { value, unit } = &threshold {
            log::debug!("threshold unit {unit:?} is not converted; using {value} as a fraction");
        }
        let raw_stagger = host.attribute(node, &names.stagger);
        let stagger_ms =
            parse_stagger(raw_stagger.as_deref(), &names.stagger).unwrap_or_else(|e| {
                log::debug!("{e}; children fire without stagger");
                0.0
            });

        Ok(Self {
            animation_class,
            threshold,
            reverse: Reverse::parse(host.attribute(node, &names.reverse).as_deref()),
            children: Children::parse(host.attribute(node, &names.children).as_deref()),
            stagger_ms,
            debug: host
                .attribute(node, &names.debug)
                .is_some_and(|v| v.trim() == "true"),
        })
    }
}

/// The required animation class, trimmed. Blank counts as missing.
pub fn read_animation_class<H: Host>(
    host: &H,
    node: &H::Node,
    names: &AttributeNames,
) -> Result<String, AttributeError> {
    host.attribute(node, &names.class)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AttributeError::Missing {
            name: names.class.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stagger(raw: Option<&str>) -> Result<f64, AttributeError> {
        parse_stagger(raw, "children-stagger")
    }

    #[test]
    fn stagger_units() {
        assert_eq!(stagger(Some("100ms")), Ok(100.0));
        assert_eq!(stagger(Some("0.2s")), Ok(200.0));
        assert_eq!(stagger(Some("1.5s")), Ok(1500.0));
        assert_eq!(stagger(Some("150")), Ok(150.0));
        assert_eq!(stagger(None), Ok(0.0));
        assert_eq!(stagger(Some("-50ms")), Ok(0.0));
        assert!(stagger(Some("fast")).is_err());
        assert!(stagger(Some("ms")).is_err());
        assert!(stagger(Some("Infinitys")).is_err());
    }

    #[test]
    fn malformed_stagger_names_the_prefixed_attribute() {
        let names = AttributeNames::with_prefix("data-");
        assert_eq!(
            parse_stagger(Some("fast"), &names.stagger),
            Err(AttributeError::Malformed {
                name: "data-children-stagger".into(),
                value: "fast".into()
            })
        );
    }

    #[test]
    fn reverse_forms() {
        assert_eq!(Reverse::parse(None), Reverse::None);
        assert_eq!(Reverse::parse(Some("false")), Reverse::None);
        assert_eq!(Reverse::parse(Some("")), Reverse::None);
        assert_eq!(Reverse::parse(Some("true")), Reverse::Mirror);
        assert_eq!(
            Reverse::parse(Some(" fade-out ")),
            Reverse::Alternate("fade-out".into())
        );
        assert_eq!(
            Reverse::parse(Some("fade-out")).alternate_class(),
            Some("fade-out")
        );
        assert_eq!(Reverse::Mirror.alternate_class(), None);
    }

    #[test]
    fn children_forms() {
        assert_eq!(Children::parse(None), Children::None);
        assert_eq!(Children::parse(Some("false")), Children::None);
        assert_eq!(Children::parse(Some("true")), Children::Direct);
        assert_eq!(Children::parse(Some("card")), Children::Class("card".into()));
        assert_eq!(Children::parse(Some(".card")), Children::Class("card".into()));
        assert_eq!(Children::parse(Some(".")), Children::None);
    }

    #[test]
    fn prefixed_attribute_names() {
        let names = AttributeNames::with_prefix("data-");
        assert_eq!(names.class, "data-animation-class");
        assert_eq!(names.stagger, "data-children-stagger");
        assert_eq!(AttributeNames::default().debug, "debug");
    }

    #[test]
    fn config_validation() {
        assert!(Config::default().validate().is_ok());
        let empty = Config {
            palette: Vec::new(),
            ..Config::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyPalette));
        let negative = Config {
            resize_debounce_ms: -1.0,
            ..Config::default()
        };
        assert!(negative.validate().is_err());
    }
}
