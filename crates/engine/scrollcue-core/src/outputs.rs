//! Output contracts from the engine.
//!
//! Every entry point returns the events it produced. They describe class
//! changes that were already applied through the host; adapters may forward
//! them (for example as DOM custom events) but need not act on them.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::state::Direction;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TriggerEvent {
    /// Enter applied to the element or fanned out to its targets.
    Entered { element: ElementId },
    /// Exit applied to the element or fanned out to its targets.
    Exited { element: ElementId },
    /// One delegated target toggled.
    TargetToggled {
        element: ElementId,
        index: usize,
        direction: Direction,
    },
    OverlayDrawn { element: ElementId },
    Rebuilt { elements: usize, watchers: usize },
    TornDown { elements: usize, watchers: usize },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub events: Vec<TriggerEvent>,
}

impl Outputs {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push(&mut self, event: TriggerEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
