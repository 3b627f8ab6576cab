//! Test harness driving an [`Engine`] over a [`FakeDom`] with a virtual clock.

use scrollcue_core::{Config, Engine, TriggerEvent};

use crate::dom::{FakeDom, NodeId, PageSpec};

pub struct Page {
    pub engine: Engine<FakeDom>,
    now: f64,
}

impl Page {
    pub fn new(dom: FakeDom) -> Self {
        Self::with_config(dom, Config::default())
    }

    pub fn with_config(dom: FakeDom, cfg: Config) -> Self {
        let engine = Engine::new(dom, cfg).expect("valid test config");
        Self { engine, now: 0.0 }
    }

    pub fn from_spec(spec: &PageSpec) -> Self {
        Self::new(FakeDom::from_spec(spec))
    }

    pub fn dom(&self) -> &FakeDom {
        self.engine.host()
    }

    pub fn dom_mut(&mut self) -> &mut FakeDom {
        self.engine.host_mut()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn node(&self, name: &str) -> NodeId {
        self.dom().node(name)
    }

    pub fn has_class(&self, name: &str, class: &str) -> bool {
        let node = self.node(name);
        self.dom().classes(node).iter().any(|c| c == class)
    }

    /// Initial scan plus the observers' initial entries.
    pub fn init(&mut self) -> Vec<TriggerEvent> {
        let mut events = self.engine.init().events.clone();
        events.extend(self.deliver());
        events
    }

    pub fn refresh(&mut self) -> Vec<TriggerEvent> {
        let mut events = self.engine.refresh().events.clone();
        events.extend(self.deliver());
        events
    }

    pub fn teardown(&mut self) -> Vec<TriggerEvent> {
        self.engine.teardown().events.clone()
    }

    /// Feed queued observer entries to the engine.
    pub fn deliver(&mut self) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        let now = self.now;
        for (watcher, elements) in self.dom_mut().take_entries() {
            let out = self.engine.handle_crossings(watcher, &elements, now);
            events.extend(out.events.iter().cloned());
        }
        events
    }

    pub fn scroll_to(&mut self, y: f64) -> Vec<TriggerEvent> {
        self.dom_mut().scroll_to(y);
        self.deliver()
    }

    /// Scroll so the named element's top sits at `viewport_top`.
    pub fn scroll_node_to(&mut self, name: &str, viewport_top: f64) -> Vec<TriggerEvent> {
        let node = self.node(name);
        self.dom_mut().scroll_node_to(node, viewport_top);
        self.deliver()
    }

    /// Move the clock to `t`, running every deadline on the way at its own
    /// time, and delivering observer entries created by rebuilds.
    pub fn advance_to(&mut self, t: f64) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        while let Some(deadline) = self.engine.next_deadline().filter(|d| *d <= t) {
            self.set_now(deadline.max(self.now));
            let now = self.now;
            events.extend(self.engine.advance(now).events.iter().cloned());
            events.extend(self.deliver());
        }
        self.set_now(t.max(self.now));
        events
    }

    pub fn advance_by(&mut self, dt: f64) -> Vec<TriggerEvent> {
        let t = self.now + dt;
        self.advance_to(t)
    }

    /// Run `n` rendering frames without moving the clock.
    pub fn frames(&mut self, n: u32) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            let now = self.now;
            events.extend(self.engine.advance_frame(now).events.iter().cloned());
        }
        events
    }

    /// Resize the viewport and notify the engine, as a window listener would.
    pub fn resize(&mut self, height: f64) -> Vec<TriggerEvent> {
        self.dom_mut().set_viewport_height(height);
        let now = self.now;
        self.engine.on_resize(now);
        self.deliver()
    }

    fn set_now(&mut self, now: f64) {
        self.now = now;
        self.dom_mut().set_now(now);
    }
}
