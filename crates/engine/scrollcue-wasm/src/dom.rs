//! [`Host`] over the live browser document.

use std::cell::RefCell;
use std::rc::Weak;

use gloo::render::AnimationFrame;
use gloo::timers::callback::Timeout;
use hashbrown::HashMap;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlCollection, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, NodeList, Window,
};

use scrollcue_core::{ElementId, Engine, Host, Marker, MarkerKind, RootMargin, WatcherId};

use crate::driver;

/// Set on every inserted debug marker; also keeps markers out of child targets.
pub const MARKER_ATTRIBUTE: &str = "data-scrollcue-marker";

pub type WebEngine = Engine<WebHost>;

struct ObserverSlot {
    observer: IntersectionObserver,
    targets: Vec<(Element, ElementId)>,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

pub struct WebHost {
    window: Window,
    document: Document,
    engine: Weak<RefCell<WebEngine>>,
    observers: HashMap<WatcherId, ObserverSlot>,
    /// Armed wake-up for the earliest timed task, with its deadline.
    pub(crate) timer: Option<(f64, Timeout)>,
    pub(crate) frame: Option<AnimationFrame>,
}

impl WebHost {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            engine: Weak::new(),
            observers: HashMap::new(),
            timer: None,
            frame: None,
        }
    }

    /// Point observer callbacks at the engine that owns this host.
    pub(crate) fn bind(&mut self, engine: Weak<RefCell<WebEngine>>) {
        self.engine = engine;
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Map observer entries back to the element ids they were observed as.
    pub(crate) fn entry_ids(&self, watcher: WatcherId, entries: &Array) -> Vec<ElementId> {
        let Some(slot) = self.observers.get(&watcher) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
            .filter_map(|entry| {
                let target = entry.target();
                slot.targets
                    .iter()
                    .find(|(el, _)| *el == target)
                    .map(|(_, id)| *id)
            })
            .collect()
    }

    fn create_observer(
        &self,
        watcher: WatcherId,
        margin: &RootMargin,
    ) -> Result<ObserverSlot, JsValue> {
        let engine = self.engine.clone();
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                driver::on_crossings(&engine, watcher, &entries);
            },
        );
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&margin.to_css());
        init.set_threshold(&JsValue::from_f64(0.0));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(ObserverSlot {
            observer,
            targets: Vec::new(),
            _callback: callback,
        })
    }

    fn build_marker(&self, marker: &Marker, anchor: &Element) -> Result<Element, JsValue> {
        let el = self.document.create_element("div")?;
        let kind = match marker.kind {
            MarkerKind::TriggerLine => "trigger-line",
            MarkerKind::ElementAnchor => "element-anchor",
        };
        el.set_attribute(MARKER_ATTRIBUTE, kind)?;
        el.set_attribute("aria-hidden", "true")?;
        el.set_attribute("style", &marker_style(marker))?;
        el.set_text_content(Some(&marker.label));
        match marker.kind {
            MarkerKind::TriggerLine => {
                let body: Element = self
                    .document
                    .body()
                    .ok_or_else(|| JsValue::from_str("document has no body"))?
                    .into();
                body.append_child(&el)?;
            }
            // First child, so it sits on the element's top edge.
            MarkerKind::ElementAnchor => anchor.prepend_with_node_1(&el)?,
        }
        Ok(el)
    }
}

fn marker_style(marker: &Marker) -> String {
    let position = match marker.kind {
        MarkerKind::TriggerLine => "fixed",
        MarkerKind::ElementAnchor => "relative",
    };
    let color = &marker.color;
    format!(
        "position:{position};left:0;right:0;top:{}px;height:0;\
         border-top:1px dashed {color};color:{color};\
         font:11px/1.4 monospace;pointer-events:none;z-index:2147483647;",
        marker.offset
    )
}

fn collection_elements(list: &HtmlCollection) -> Vec<Element> {
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

fn node_list_elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

impl Host for WebHost {
    type Node = Element;
    type MarkerHandle = Option<Element>;

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn scan(&self, attribute: &str) -> Vec<Element> {
        match self.document.query_selector_all(&format!("[{attribute}]")) {
            Ok(list) => node_list_elements(&list),
            Err(e) => {
                log::warn!("scrollcue: cannot scan for [{attribute}]: {e:?}");
                Vec::new()
            }
        }
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().add_1(class) {
            log::warn!("scrollcue: cannot add class {class:?}: {e:?}");
        }
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        if let Err(e) = node.class_list().remove_1(class) {
            log::warn!("scrollcue: cannot remove class {class:?}: {e:?}");
        }
    }

    fn top(&self, node: &Element) -> f64 {
        node.get_bounding_client_rect().top()
    }

    fn child_elements(&self, node: &Element) -> Vec<Element> {
        collection_elements(&node.children())
    }

    fn descendants_with_class(&self, node: &Element, class: &str) -> Vec<Element> {
        collection_elements(&node.get_elements_by_class_name(class))
    }

    fn is_marker(&self, node: &Element) -> bool {
        node.has_attribute(MARKER_ATTRIBUTE)
    }

    fn observe(&mut self, watcher: WatcherId, margin: &RootMargin, element: ElementId, node: &Element) {
        if !self.observers.contains_key(&watcher) {
            match self.create_observer(watcher, margin) {
                Ok(slot) => {
                    self.observers.insert(watcher, slot);
                }
                Err(e) => {
                    log::warn!(
                        "scrollcue: cannot observe with rootMargin {}: {e:?}",
                        margin.to_css()
                    );
                    return;
                }
            }
        }
        if let Some(slot) = self.observers.get_mut(&watcher) {
            slot.targets.push((node.clone(), element));
            slot.observer.observe(node);
        }
    }

    fn disconnect(&mut self, watcher: WatcherId) {
        if let Some(slot) = self.observers.remove(&watcher) {
            slot.observer.disconnect();
        }
    }

    fn insert_marker(&mut self, marker: &Marker, anchor: &Element) -> Option<Element> {
        match self.build_marker(marker, anchor) {
            Ok(el) => Some(el),
            Err(e) => {
                log::warn!("scrollcue: cannot draw debug marker: {e:?}");
                None
            }
        }
    }

    fn remove_marker(&mut self, handle: Option<Element>) {
        if let Some(el) = handle {
            el.remove();
        }
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        for (_, slot) in self.observers.drain() {
            slot.observer.disconnect();
        }
    }
}
