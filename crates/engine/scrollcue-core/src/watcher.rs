//! Visibility watcher: one observation band per resolved threshold.
//!
//! A watcher's band is a one-pixel strip whose top edge sits on the trigger
//! line. The host's observer reports whenever an element starts or stops
//! overlapping that strip; the engine then compares the element's top with
//! the line to decide the direction.

use serde::{Deserialize, Serialize};

use crate::ids::{ElementId, WatcherId};
use crate::threshold::trigger_line;

/// Observer root margin in CSS pixels. Negative values inset the viewport.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Margin whose effective region starts exactly at `line` and is one
    /// pixel tall.
    pub fn for_line(line: f64, viewport_height: f64) -> Self {
        let y = line.round();
        Self {
            top: -y,
            right: 0.0,
            bottom: -(viewport_height.round() - y - 1.0),
            left: 0.0,
        }
    }

    /// Effective band `(top, bottom)` in viewport coordinates.
    pub fn band(&self, viewport_height: f64) -> (f64, f64) {
        (-self.top, viewport_height + self.bottom)
    }

    /// Whether a box spanning `top..bottom` overlaps the band. Edge contact
    /// counts, as it does for browser intersection observers.
    pub fn intersects(&self, top: f64, bottom: f64, viewport_height: f64) -> bool {
        let (band_top, band_bottom) = self.band(viewport_height);
        band_top <= band_bottom && top <= band_bottom && bottom >= band_top
    }

    /// CSS `rootMargin` string, e.g. `"-400px 0px -399px 0px"`.
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// One observer shared by every element resolving to the same fraction.
#[derive(Clone, Debug)]
pub struct Watcher {
    pub id: WatcherId,
    pub fraction: f64,
    /// Trigger line in pixels from the viewport top at registration time.
    pub line: f64,
    pub margin: RootMargin,
    pub members: Vec<ElementId>,
}

impl Watcher {
    pub fn new(id: WatcherId, fraction: f64, viewport_height: f64) -> Self {
        let line = trigger_line(fraction, viewport_height);
        Self {
            id,
            fraction,
            line,
            margin: RootMargin::for_line(line, viewport_height),
            members: Vec::new(),
        }
    }
}
