//! Debug overlay description.
//!
//! The core decides what to draw and when; the host decides how it looks.
//! Markers must be click-through and are never treated as animation targets.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    /// Fixed to the viewport at the trigger line.
    TriggerLine,
    /// Attached to the element's top edge; scrolls with it.
    ElementAnchor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Pixels from the viewport top for `TriggerLine`, from the element top
    /// for `ElementAnchor`.
    pub offset: f64,
    pub label: String,
    pub color: String,
}

/// Both markers of one element.
#[derive(Debug)]
pub struct DebugArtifacts<M> {
    pub trigger_line: M,
    pub element_anchor: M,
}

/// Threshold label, trimmed to at most three decimals.
pub fn threshold_label(fraction: f64) -> String {
    let rounded = format!("{fraction:.3}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("threshold: {trimmed}")
}

/// Color for the `index`-th debug element.
pub fn palette_color(palette: &[String], index: usize) -> &str {
    if palette.is_empty() {
        return "red";
    }
    &palette[index % palette.len()]
}

/// The marker pair for an element whose threshold resolved to `fraction`
/// with the trigger line at `line` pixels.
pub fn markers_for(fraction: f64, line: f64, color: &str) -> [Marker; 2] {
    let label = threshold_label(fraction);
    [
        Marker {
            kind: MarkerKind::TriggerLine,
            offset: line,
            label: label.clone(),
            color: color.to_string(),
        },
        Marker {
            kind: MarkerKind::ElementAnchor,
            offset: 0.0,
            label,
            color: color.to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_trimmed() {
        assert_eq!(threshold_label(0.75), "threshold: 0.75");
        assert_eq!(threshold_label(150.0 / 1000.0), "threshold: 0.15");
        assert_eq!(threshold_label(1.0), "threshold: 1");
        assert_eq!(threshold_label(0.0), "threshold: 0");
    }

    #[test]
    fn palette_cycles() {
        let palette = vec!["a".to_string(), "b".to_string()];
        assert_eq!(palette_color(&palette, 0), "a");
        assert_eq!(palette_color(&palette, 1), "b");
        assert_eq!(palette_color(&palette, 2), "a");
    }

    #[test]
    fn marker_pair_shares_label_and_color() {
        let [line, anchor] = markers_for(0.5, 400.0, "#fff");
        assert_eq!(line.kind, MarkerKind::TriggerLine);
        assert_eq!(line.offset, 400.0);
        assert_eq!(anchor.kind, MarkerKind::ElementAnchor);
        assert_eq!(anchor.offset, 0.0);
        assert_eq!(line.label, anchor.label);
        assert_eq!(line.color, anchor.color);
    }
}
