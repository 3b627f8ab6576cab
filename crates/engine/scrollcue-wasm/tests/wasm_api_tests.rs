#![cfg(target_arch = "wasm32")]
use serde_wasm_bindgen as swb;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use scrollcue_core::Config;
use scrollcue_wasm::{abi_version, ScrollCue, MARKER_ATTRIBUTE};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Append a fresh container to the body and fill it with `html`.
fn mount(html: &str) -> web_sys::Element {
    let doc = document();
    let root = doc.create_element("div").unwrap();
    root.set_inner_html(html);
    doc.body().unwrap().append_child(&root).unwrap();
    root
}

fn prefixed(prefix: &str) -> JsValue {
    let cfg = Config {
        attribute_prefix: prefix.into(),
        ..Config::default()
    };
    swb::to_value(&cfg).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(ScrollCue::new(JsValue::UNDEFINED).is_ok());
    assert!(ScrollCue::new(JsValue::NULL).is_ok());
}

#[wasm_bindgen_test]
fn rejects_invalid_config() {
    let cfg = Config {
        palette: Vec::new(),
        ..Config::default()
    };
    assert!(ScrollCue::new(swb::to_value(&cfg).unwrap()).is_err());
    assert!(ScrollCue::new(JsValue::from_str("not a config")).is_err());
}

#[wasm_bindgen_test]
fn init_registers_and_teardown_clears() {
    let root = mount(
        r#"<div t1-animation-class="fade-in" t1-animation-threshold="0.5"></div>
           <div t1-animation-class="fade-in" t1-animation-threshold="0.5"></div>
           <div t1-animation-class="pop" t1-animation-threshold="0.25"></div>
           <div t1-animation-class=""></div>"#,
    );
    let cue = ScrollCue::new(prefixed("t1-")).unwrap();
    assert_eq!(cue.element_count(), 0);

    cue.init();
    assert_eq!(cue.element_count(), 3);
    assert_eq!(cue.watcher_count(), 2);
    assert_eq!(cue.has_entered(0), Some(false));
    assert_eq!(cue.has_entered(9), None);

    cue.teardown();
    assert_eq!(cue.element_count(), 0);
    assert_eq!(cue.watcher_count(), 0);
    cue.teardown();

    root.remove();
}

#[wasm_bindgen_test]
fn watchers_expose_root_margin() {
    let root = mount(r#"<div t2-animation-class="fade-in" t2-animation-threshold="0.5"></div>"#);
    let cue = ScrollCue::new(prefixed("t2-")).unwrap();
    cue.init();

    let height = web_sys::window()
        .unwrap()
        .inner_height()
        .unwrap()
        .as_f64()
        .unwrap();
    let watchers = cue.watchers().unwrap();
    let first = js_sys::Reflect::get(&watchers, &JsValue::from_f64(0.0)).unwrap();
    let line = js_sys::Reflect::get(&first, &JsValue::from_str("line"))
        .unwrap()
        .as_f64()
        .unwrap();
    assert_eq!(line, height * 0.5);
    let margin = js_sys::Reflect::get(&first, &JsValue::from_str("root_margin"))
        .unwrap()
        .as_string()
        .unwrap();
    assert!(margin.starts_with(&format!("-{}px 0px -", line.round())));

    cue.teardown();
    root.remove();
}

#[wasm_bindgen_test]
fn refresh_picks_up_injected_content() {
    let root = mount(r#"<div t3-animation-class="fade-in"></div>"#);
    let cue = ScrollCue::new(prefixed("t3-")).unwrap();
    cue.init();
    assert_eq!(cue.element_count(), 1);

    let extra = document().create_element("div").unwrap();
    extra.set_attribute("t3-animation-class", "fade-in").unwrap();
    root.append_child(&extra).unwrap();
    cue.refresh();
    assert_eq!(cue.element_count(), 2);

    cue.teardown();
    root.remove();
}

#[wasm_bindgen_test]
fn debug_waits_for_frames_and_teardown_removes_markers() {
    let root = mount(r#"<div t4-animation-class="fade-in" t4-debug="true"></div>"#);
    let cue = ScrollCue::new(prefixed("t4-")).unwrap();
    cue.init();

    let selector = format!("[{MARKER_ATTRIBUTE}]");
    // Markers wait for settle frames, so nothing is drawn synchronously.
    assert!(document().query_selector(&selector).unwrap().is_none());
    assert_eq!(cue.pending_tasks(), 1);

    cue.teardown();
    assert_eq!(cue.pending_tasks(), 0);
    assert!(document().query_selector(&selector).unwrap().is_none());
    root.remove();
}

#[wasm_bindgen_test]
fn teardown_drops_pending_resize_rebuild() {
    let root = mount(r#"<div t5-animation-class="fade-in"></div>"#);
    let mut cue = ScrollCue::new(prefixed("t5-")).unwrap();
    cue.hook_page();
    assert_eq!(cue.element_count(), 1);

    let window = web_sys::window().unwrap();
    let resize = web_sys::Event::new("resize").unwrap();
    window.dispatch_event(&resize).unwrap();
    assert_eq!(cue.pending_tasks(), 1);

    cue.teardown();
    assert_eq!(cue.pending_tasks(), 0);
    assert_eq!(cue.element_count(), 0);
    root.remove();
}

#[wasm_bindgen_test]
fn page_wide_functions_are_safe_in_any_order() {
    scrollcue_wasm::refresh();
    scrollcue_wasm::teardown();
    assert!(scrollcue_wasm::start(JsValue::UNDEFINED).is_ok());
    assert!(scrollcue_wasm::start(JsValue::UNDEFINED).is_ok());
    scrollcue_wasm::refresh();
    scrollcue_wasm::teardown();
}
