//! Browser callbacks into the engine.
//!
//! Every entry point borrows the engine for one synchronous call and then
//! re-arms the single timeout (earliest timed task) and the frame request
//! (settle countdowns).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::render::request_animation_frame;
use gloo::timers::callback::Timeout;
use js_sys::Array;

use scrollcue_core::{Outputs, WatcherId};

use crate::dom::WebEngine;

pub type SharedEngine = Rc<RefCell<WebEngine>>;

/// Monotonic milliseconds from `performance.now()`. Falls back to the wall
/// clock only where the Performance API is missing.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn report(out: &Outputs) {
    for event in &out.events {
        log::trace!("scrollcue: {event:?}");
    }
}

/// Run `f` with the engine and the current time, then re-arm wake-ups.
pub fn with_engine(engine: &SharedEngine, f: impl FnOnce(&mut WebEngine, f64)) {
    match engine.try_borrow_mut() {
        Ok(mut eng) => f(&mut eng, now_ms()),
        Err(_) => {
            log::warn!("scrollcue: engine busy, dropping callback");
            return;
        }
    }
    arm(engine);
}

pub fn arm(engine: &SharedEngine) {
    let Ok(mut eng) = engine.try_borrow_mut() else {
        return;
    };
    let deadline = eng.next_deadline();
    let wants_frame = eng.has_frame_tasks();
    let host = eng.host_mut();

    let armed = host.timer.as_ref().map(|(at, _)| *at);
    match deadline {
        Some(at) if armed == Some(at) => {}
        Some(at) => {
            let delay = (at - now_ms()).max(0.0).ceil() as u32;
            let weak = Rc::downgrade(engine);
            host.timer = Some((at, Timeout::new(delay, move || on_timer(&weak))));
        }
        None => host.timer = None,
    }

    if wants_frame && host.frame.is_none() {
        let weak = Rc::downgrade(engine);
        host.frame = Some(request_animation_frame(move |_| on_frame(&weak)));
    }
}

pub(crate) fn on_crossings(weak: &Weak<RefCell<WebEngine>>, watcher: WatcherId, entries: &Array) {
    let Some(engine) = weak.upgrade() else {
        return;
    };
    with_engine(&engine, |eng, now| {
        let ids = eng.host().entry_ids(watcher, entries);
        if !ids.is_empty() {
            report(eng.handle_crossings(watcher, &ids, now));
        }
    });
}

fn on_timer(weak: &Weak<RefCell<WebEngine>>) {
    let Some(engine) = weak.upgrade() else {
        return;
    };
    with_engine(&engine, |eng, now| {
        eng.host_mut().timer.take();
        report(eng.advance(now));
    });
}

fn on_frame(weak: &Weak<RefCell<WebEngine>>) {
    let Some(engine) = weak.upgrade() else {
        return;
    };
    with_engine(&engine, |eng, now| {
        eng.host_mut().frame.take();
        report(eng.advance_frame(now));
    });
}
