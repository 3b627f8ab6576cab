//! The document seam.
//!
//! The engine never touches a DOM directly. Adapters (the wasm binding, the
//! in-memory test document) implement [`Host`] and forward observer
//! callbacks back to [`Engine::handle_crossings`](crate::engine::Engine::handle_crossings).

use crate::ids::{ElementId, WatcherId};
use crate::overlay::Marker;
use crate::watcher::RootMargin;

pub trait Host {
    /// Handle to a document element. Cloning clones the handle, never the node.
    type Node: Clone;
    /// Handle to an inserted debug marker.
    type MarkerHandle;

    /// Current viewport height in CSS pixels.
    fn viewport_height(&self) -> f64;

    /// Every element carrying `attribute`, in document order.
    fn scan(&self, attribute: &str) -> Vec<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Adding a class that is already present must be a no-op.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Removing a class that is absent must be a no-op.
    fn remove_class(&mut self, node: &Self::Node, class: &str);

    /// Top edge of the element's bounding box, relative to the viewport top.
    fn top(&self, node: &Self::Node) -> f64;

    /// Direct child elements in document order.
    fn child_elements(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Descendant elements carrying `class`, in document order.
    fn descendants_with_class(&self, node: &Self::Node, class: &str) -> Vec<Self::Node>;

    /// Whether the node was inserted by [`Host::insert_marker`].
    fn is_marker(&self, node: &Self::Node) -> bool;

    /// Start watching `node` under `watcher`, creating the observer with
    /// `margin` on first use. Intersection changes must be reported as
    /// `element` to the engine.
    fn observe(&mut self, watcher: WatcherId, margin: &RootMargin, element: ElementId, node: &Self::Node);

    /// Drop the observer. No callback for `watcher` may follow.
    fn disconnect(&mut self, watcher: WatcherId);

    /// Insert a debug marker for `anchor`.
    fn insert_marker(&mut self, marker: &Marker, anchor: &Self::Node) -> Self::MarkerHandle;

    fn remove_marker(&mut self, handle: Self::MarkerHandle);
}
