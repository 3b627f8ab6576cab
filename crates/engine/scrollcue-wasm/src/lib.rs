use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use scrollcue_core::{Config, ElementId, Engine};

mod dom;
mod driver;

pub use dom::{WebEngine, WebHost, MARKER_ATTRIBUTE};
use driver::{report, with_engine, SharedEngine};

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn install_hooks() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "console")]
    {
        // Fails harmlessly when a logger is already installed.
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

fn parse_config(config: JsValue) -> Result<Config, JsError> {
    let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
        Config::default()
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
    };
    cfg.validate()
        .map_err(|e| JsError::new(&format!("config error: {e}")))?;
    Ok(cfg)
}

/// One engine bound to the page's window and document, plus the listeners
/// that drive it.
struct Runtime {
    engine: SharedEngine,
    listeners: Vec<EventListener>,
}

impl Runtime {
    fn new(cfg: Config) -> Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("scrollcue needs a window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("scrollcue needs a document"))?;
        let engine = Engine::new(WebHost::new(window, document), cfg)
            .map_err(|e| JsError::new(&format!("config error: {e}")))?;
        let engine = Rc::new(RefCell::new(engine));
        engine.borrow_mut().host_mut().bind(Rc::downgrade(&engine));
        Ok(Self {
            engine,
            listeners: Vec::new(),
        })
    }

    fn init(&self) {
        with_engine(&self.engine, |eng, _| report(eng.init()));
    }

    fn refresh(&self) {
        with_engine(&self.engine, |eng, _| report(eng.refresh()));
    }

    fn teardown(&self) {
        with_engine(&self.engine, |eng, _| report(eng.teardown()));
    }

    /// Initialize once the document is parsed, and rebuild after resizes.
    fn hook_page(&mut self) {
        let (window, document) = {
            let eng = self.engine.borrow();
            (eng.host().window().clone(), eng.host().document().clone())
        };

        if document.ready_state() == "loading" {
            let weak = Rc::downgrade(&self.engine);
            self.listeners
                .push(EventListener::once(&document, "DOMContentLoaded", move |_| {
                    if let Some(engine) = weak.upgrade() {
                        with_engine(&engine, |eng, _| report(eng.init()));
                    }
                }));
        } else {
            self.init();
        }

        let weak = Rc::downgrade(&self.engine);
        self.listeners
            .push(EventListener::new(&window, "resize", move |_| {
                if let Some(engine) = weak.upgrade() {
                    with_engine(&engine, |eng, now| eng.on_resize(now));
                }
            }));
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if let Ok(mut eng) = self.engine.try_borrow_mut() {
            eng.teardown();
        }
    }
}

#[derive(Serialize)]
struct WatcherInfo {
    fraction: f64,
    line: f64,
    root_margin: String,
    members: Vec<u32>,
}

#[wasm_bindgen]
pub struct ScrollCue {
    runtime: Runtime,
}

#[wasm_bindgen]
impl ScrollCue {
    /// Create an engine over the current document. Pass a config object or
    /// undefined/null for defaults. Nothing is scanned until `init()`.
    /// Example:
    ///   new ScrollCue({ attribute_prefix: "data-", resize_debounce_ms: 100 })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ScrollCue, JsError> {
        install_hooks();
        let cfg = parse_config(config)?;
        Ok(ScrollCue {
            runtime: Runtime::new(cfg)?,
        })
    }

    /// Scan the document and start watching.
    pub fn init(&self) {
        self.runtime.init();
    }

    /// Tear down and rescan, e.g. after injecting content.
    pub fn refresh(&self) {
        self.runtime.refresh();
    }

    /// Stop watching and cancel every pending task, including a debounced
    /// resize rebuild.
    pub fn teardown(&self) {
        self.runtime.teardown();
    }

    /// Also initialize on page-ready and rebuild after window resizes.
    #[wasm_bindgen(js_name = hook_page)]
    pub fn hook_page(&mut self) {
        self.runtime.hook_page();
    }

    #[wasm_bindgen(js_name = element_count)]
    pub fn element_count(&self) -> u32 {
        self.runtime.engine.borrow().element_count() as u32
    }

    #[wasm_bindgen(js_name = watcher_count)]
    pub fn watcher_count(&self) -> u32 {
        self.runtime.engine.borrow().watcher_count() as u32
    }

    #[wasm_bindgen(js_name = pending_tasks)]
    pub fn pending_tasks(&self) -> u32 {
        self.runtime.engine.borrow().pending_tasks() as u32
    }

    /// Whether the `index`-th registered element has entered; undefined if
    /// there is no such element.
    #[wasm_bindgen(js_name = has_entered)]
    pub fn has_entered(&self, index: u32) -> Option<bool> {
        self.runtime.engine.borrow().has_entered(ElementId(index))
    }

    /// Watchers as `[{ fraction, line, root_margin, members }]`.
    pub fn watchers(&self) -> Result<JsValue, JsError> {
        let eng = self.runtime.engine.borrow();
        let infos: Vec<WatcherInfo> = eng
            .watchers()
            .map(|w| WatcherInfo {
                fraction: w.fraction,
                line: w.line,
                root_margin: w.margin.to_css(),
                members: w.members.iter().map(|m| m.0).collect(),
            })
            .collect();
        swb::to_value(&infos).map_err(|e| JsError::new(&format!("serialize error: {e}")))
    }
}

thread_local! {
    static PAGE: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

/// Start the page-wide instance: initialize on page-ready and rebuild after
/// window resizes. Calling it again refreshes the running instance.
#[wasm_bindgen]
pub fn start(config: JsValue) -> Result<(), JsError> {
    install_hooks();
    let cfg = parse_config(config)?;
    PAGE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(runtime) = slot.as_ref() {
            log::debug!("scrollcue: already started, refreshing");
            runtime.refresh();
            return Ok(());
        }
        let mut runtime = Runtime::new(cfg)?;
        runtime.hook_page();
        *slot = Some(runtime);
        Ok(())
    })
}

/// Rescan the page-wide instance. No-op before `start`.
#[wasm_bindgen]
pub fn refresh() {
    PAGE.with(|slot| {
        if let Some(runtime) = slot.borrow().as_ref() {
            runtime.refresh();
        }
    });
}

/// Tear down the page-wide instance, dropping any pending resize rebuild.
/// A later `refresh()` or a new window resize rescans.
#[wasm_bindgen]
pub fn teardown() {
    PAGE.with(|slot| {
        if let Some(runtime) = slot.borrow().as_ref() {
            runtime.teardown();
        }
    });
}

/// ABI guard for JS wrappers.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
