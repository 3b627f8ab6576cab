//! scrollcue core (host-agnostic)
//!
//! Scroll-triggered class toggling driven by declarative element attributes.
//! The engine resolves each element's trigger line, shares one visibility
//! watcher per distinct line, and turns the watcher's edge-crossing callbacks
//! into enter/exit class changes, optionally staggered over delegated
//! children. Hosts (the wasm binding, test documents) implement [`Host`].

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod ids;
pub mod numeric;
pub mod outputs;
pub mod overlay;
pub mod registry;
pub mod schedule;
pub mod stagger;
pub mod state;
pub mod threshold;
pub mod watcher;

// Re-exports for consumers (adapters)
pub use config::{AttributeNames, Children, Config, ElementConfig, Reverse};
pub use engine::{ElementRecord, Engine, Task};
pub use error::{AttributeError, ConfigError};
pub use host::Host;
pub use ids::{ElementId, TaskId, WatcherId};
pub use outputs::{Outputs, TriggerEvent};
pub use overlay::{Marker, MarkerKind};
pub use state::Direction;
pub use threshold::{trigger_line, ThresholdSpec, DEFAULT_THRESHOLD};
pub use watcher::{RootMargin, Watcher};
