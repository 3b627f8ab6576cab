//! In-memory document implementing [`Host`].
//!
//! Elements have absolute page positions; scrolling moves the viewport over
//! them. Observers behave like browser intersection observers with a zero
//! threshold: one entry per target on `observe`, then one entry whenever a
//! target starts or stops overlapping the observer's band.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::Deserialize;

use scrollcue_core::{ElementId, Host, Marker, RootMargin, WatcherId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Declarative element description, also the JSON fixture format.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ElementSpec {
    /// Lookup name for tests; not an attribute.
    pub name: Option<String>,
    /// Absolute top in page pixels. Children default to their parent's top.
    pub top: Option<f64>,
    pub height: f64,
    pub attrs: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(name: &str, top: f64, height: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            top: Some(top),
            height,
            ..Self::default()
        }
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole page: viewport plus top-level elements.
#[derive(Clone, Debug, Deserialize)]
pub struct PageSpec {
    pub viewport_height: f64,
    #[serde(default)]
    pub scroll_y: f64,
    pub elements: Vec<ElementSpec>,
}

/// One effective class mutation, stamped with the document clock.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassChange {
    pub node: NodeId,
    pub class: String,
    pub added: bool,
    pub at: f64,
}

#[derive(Debug)]
struct NodeData {
    name: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    top: f64,
    height: f64,
    marker: Option<Marker>,
    detached: bool,
}

#[derive(Debug)]
struct Observer {
    margin: RootMargin,
    targets: Vec<(ElementId, NodeId, bool)>,
}

#[derive(Debug)]
pub struct FakeDom {
    nodes: Vec<NodeData>,
    viewport_height: f64,
    scroll_y: f64,
    now: f64,
    observers: HashMap<WatcherId, Observer>,
    pending: Vec<(WatcherId, ElementId)>,
    class_log: Vec<ClassChange>,
    disconnected: Vec<WatcherId>,
}

const BODY: NodeId = NodeId(0);

impl FakeDom {
    pub fn new(viewport_height: f64) -> Self {
        let body = NodeData {
            name: Some("body".into()),
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            top: 0.0,
            height: 0.0,
            marker: None,
            detached: false,
        };
        Self {
            nodes: vec![body],
            viewport_height,
            scroll_y: 0.0,
            now: 0.0,
            observers: HashMap::new(),
            pending: Vec::new(),
            class_log: Vec::new(),
            disconnected: Vec::new(),
        }
    }

    pub fn from_spec(spec: &PageSpec) -> Self {
        let mut dom = Self::new(spec.viewport_height);
        dom.scroll_y = spec.scroll_y;
        for el in &spec.elements {
            dom.append(BODY, el);
        }
        dom
    }

    pub fn body(&self) -> NodeId {
        BODY
    }

    /// Append `spec` (and its subtree) under `parent`.
    pub fn append(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let top = spec.top.unwrap_or(self.nodes[parent.0].top);
        let id = self.push_node(NodeData {
            name: spec.name.clone(),
            parent: Some(parent),
            children: Vec::new(),
            attrs: spec.attrs.clone(),
            classes: spec.classes.clone(),
            top,
            height: spec.height,
            marker: None,
            detached: false,
        });
        for child in &spec.children {
            self.append(id, child);
        }
        id
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = data.parent;
        self.nodes.push(data);
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    /// Node by its fixture name. Panics on unknown names (test helper).
    pub fn node(&self, name: &str) -> NodeId {
        self.nodes
            .iter()
            .position(|n| !n.detached && n.name.as_deref() == Some(name))
            .map(NodeId)
            .unwrap_or_else(|| panic!("no node named {name:?}"))
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].classes
    }

    pub fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) {
        self.nodes[node.0]
            .attrs
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove_attribute(&mut self, node: NodeId, key: &str) {
        self.nodes[node.0].attrs.remove(key);
    }

    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Scroll so the page offset `y` is at the viewport top.
    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y;
        self.recompute_intersections();
    }

    /// Scroll so `node`'s top sits `viewport_top` pixels below the viewport top.
    pub fn scroll_node_to(&mut self, node: NodeId, viewport_top: f64) {
        let y = self.nodes[node.0].top - viewport_top;
        self.scroll_to(y);
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
        self.recompute_intersections();
    }

    fn recompute_intersections(&mut self) {
        let mut ids: Vec<_> = self.observers.keys().copied().collect();
        ids.sort_by_key(|w| w.0);
        for w in ids {
            let Some(obs) = self.observers.get(&w) else {
                continue;
            };
            let margin = obs.margin;
            let states: Vec<bool> = obs
                .targets
                .iter()
                .map(|(_, node, _)| self.intersects(&margin, *node))
                .collect();
            if let Some(obs) = self.observers.get_mut(&w) {
                for ((element, _, was), now) in obs.targets.iter_mut().zip(states) {
                    if *was != now {
                        *was = now;
                        self.pending.push((w, *element));
                    }
                }
            }
        }
    }

    fn intersects(&self, margin: &RootMargin, node: NodeId) -> bool {
        let n = &self.nodes[node.0];
        let top = n.top - self.scroll_y;
        margin.intersects(top, top + n.height, self.viewport_height)
    }

    /// Observer entries queued since the last call, batched per watcher in
    /// first-seen order.
    pub fn take_entries(&mut self) -> Vec<(WatcherId, Vec<ElementId>)> {
        let mut batches: Vec<(WatcherId, Vec<ElementId>)> = Vec::new();
        for (w, el) in self.pending.drain(..) {
            match batches.iter_mut().find(|(bw, _)| *bw == w) {
                Some((_, els)) => els.push(el),
                None => batches.push((w, vec![el])),
            }
        }
        batches
    }

    pub fn class_log(&self) -> &[ClassChange] {
        &self.class_log
    }

    pub fn clear_class_log(&mut self) {
        self.class_log.clear();
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn observer_margin(&self, watcher: WatcherId) -> Option<RootMargin> {
        self.observers.get(&watcher).map(|o| o.margin)
    }

    pub fn disconnected(&self) -> &[WatcherId] {
        &self.disconnected
    }

    /// Live marker nodes and their descriptions.
    pub fn markers(&self) -> Vec<(NodeId, &Marker)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.detached)
            .filter_map(|(i, n)| n.marker.as_ref().map(|m| (NodeId(i), m)))
            .collect()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn preorder(&self, from: NodeId, out: &mut Vec<NodeId>) {
        for &c in &self.nodes[from.0].children {
            if self.nodes[c.0].detached {
                continue;
            }
            out.push(c);
            self.preorder(c, out);
        }
    }
}

impl Host for FakeDom {
    type Node = NodeId;
    type MarkerHandle = NodeId;

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scan(&self, attribute: &str) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.preorder(BODY, &mut all);
        all.into_iter()
            .filter(|n| self.nodes[n.0].attrs.contains_key(attribute))
            .collect()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attrs.get(name).cloned()
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        self.nodes[node.0].classes.push(class.to_string());
        self.class_log.push(ClassChange {
            node: *node,
            class: class.to_string(),
            added: true,
            at: self.now,
        });
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        let classes = &mut self.nodes[node.0].classes;
        let before = classes.len();
        classes.retain(|c| c != class);
        if classes.len() != before {
            self.class_log.push(ClassChange {
                node: *node,
                class: class.to_string(),
                added: false,
                at: self.now,
            });
        }
    }

    fn top(&self, node: &NodeId) -> f64 {
        self.nodes[node.0].top - self.scroll_y
    }

    fn child_elements(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .filter(|c| !self.nodes[c.0].detached)
            .collect()
    }

    fn descendants_with_class(&self, node: &NodeId, class: &str) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.preorder(*node, &mut all);
        all.into_iter()
            .filter(|n| self.has_class(n, class))
            .collect()
    }

    fn is_marker(&self, node: &NodeId) -> bool {
        self.nodes[node.0].marker.is_some()
    }

    fn observe(&mut self, watcher: WatcherId, margin: &RootMargin, element: ElementId, node: &NodeId) {
        let intersecting = self.intersects(margin, *node);
        self.observers
            .entry(watcher)
            .or_insert_with(|| Observer {
                margin: *margin,
                targets: Vec::new(),
            })
            .targets
            .push((element, *node, intersecting));
        // Browsers report every target once right after observe().
        self.pending.push((watcher, element));
    }

    fn disconnect(&mut self, watcher: WatcherId) {
        self.observers.remove(&watcher);
        self.pending.retain(|(w, _)| *w != watcher);
        self.disconnected.push(watcher);
    }

    fn insert_marker(&mut self, marker: &Marker, anchor: &NodeId) -> NodeId {
        use scrollcue_core::MarkerKind;
        let (parent, top) = match marker.kind {
            MarkerKind::TriggerLine => (BODY, self.scroll_y + marker.offset),
            MarkerKind::ElementAnchor => (*anchor, self.nodes[anchor.0].top + marker.offset),
        };
        self.push_node(NodeData {
            name: None,
            parent: Some(parent),
            children: Vec::new(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            top,
            height: 0.0,
            marker: Some(marker.clone()),
            detached: false,
        })
    }

    fn remove_marker(&mut self, handle: NodeId) {
        if let Some(parent) = self.nodes[handle.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != handle);
        }
        self.nodes[handle.0].detached = true;
    }
}
