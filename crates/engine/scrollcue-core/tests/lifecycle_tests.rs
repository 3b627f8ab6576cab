use scrollcue_core::{ElementId, TriggerEvent, WatcherId};
use scrollcue_test_fixtures::{pages, ElementSpec, FakeDom, Page};

fn page(name: &str) -> Page {
    pages::page(name).unwrap_or_else(|e| panic!("fixture {name}: {e:#}"))
}

#[test]
fn teardown_before_init_is_a_no_op() {
    let mut page = page("fade-in");
    assert!(page.teardown().is_empty());
    assert_eq!(page.engine.element_count(), 0);
    assert!(page.dom().disconnected().is_empty());
}

#[test]
fn teardown_disconnects_and_is_idempotent() {
    let mut page = page("mixed-thresholds");
    page.init();
    let events = page.teardown();
    assert_eq!(
        events,
        vec![TriggerEvent::TornDown {
            elements: 6,
            watchers: 4
        }]
    );
    assert_eq!(page.dom().observer_count(), 0);
    assert_eq!(page.dom().disconnected().len(), 4);
    assert_eq!(page.engine.element_count(), 0);
    assert_eq!(page.engine.watcher_count(), 0);
    assert_eq!(page.engine.pending_tasks(), 0);

    assert!(page.teardown().is_empty());
    assert_eq!(page.dom().disconnected().len(), 4);
}

#[test]
fn teardown_removes_debug_markers() {
    let mut page = page("mixed-thresholds");
    page.init();
    page.frames(3);
    assert_eq!(page.dom().markers().len(), 4);
    page.teardown();
    assert!(page.dom().markers().is_empty());
}

#[test]
fn teardown_before_settle_never_draws() {
    let mut page = page("mixed-thresholds");
    page.init();
    page.frames(1);
    page.teardown();
    assert!(page.frames(5).is_empty());
    assert!(page.dom().markers().is_empty());
}

#[test]
fn teardown_cancels_pending_stagger_steps() {
    let mut page = page("card-grid");
    page.init();
    page.scroll_node_to("b", 400.0);
    assert!(page.has_class("card-0", "fade-in"));

    page.teardown();
    page.advance_to(1000.0);
    assert!(!page.has_class("card-1", "fade-in"));
    assert!(!page.has_class("card-2", "fade-in"));
}

#[test]
fn refresh_rebuilds_from_scratch() {
    let mut page = page("fade-in");
    page.init();
    let events = page.refresh();
    assert_eq!(
        events,
        vec![
            TriggerEvent::TornDown {
                elements: 1,
                watchers: 1
            },
            TriggerEvent::Rebuilt {
                elements: 1,
                watchers: 1
            },
        ]
    );
    assert_eq!(page.dom().disconnected(), &[WatcherId(0)]);
    assert_eq!(page.dom().observer_count(), 1);
}

#[test]
fn entered_elements_are_not_reregistered() {
    let mut page = page("fade-in");
    page.init();
    page.scroll_node_to("a", 300.0);
    assert!(page.has_class("a", "fade-in"));

    let events = page.refresh();
    assert!(events.contains(&TriggerEvent::Rebuilt {
        elements: 0,
        watchers: 0
    }));
    assert!(page.has_class("a", "fade-in"));
}

#[test]
fn delegated_parent_reregisters_with_fresh_state() {
    let mut page = page("card-grid");
    page.init();
    page.scroll_node_to("b", 400.0);
    page.advance_to(500.0);
    assert_eq!(page.engine.has_entered(ElementId(0)), Some(true));

    // Below the line so the post-rebuild initial entry does not re-enter.
    page.scroll_node_to("b", 600.0);
    page.refresh();
    assert_eq!(page.engine.element_count(), 2);
    assert_eq!(page.engine.has_entered(ElementId(0)), Some(false));
}

#[test]
fn resize_rebuild_is_debounced() {
    let mut page = page("fade-in");
    page.init();

    page.resize(900.0);
    page.advance_to(100.0);
    page.resize(1000.0);

    assert!(page.advance_to(250.0).is_empty());
    assert!(page.dom().disconnected().is_empty());
    assert_eq!(page.engine.watcher_of(ElementId(0)).unwrap().line, 400.0);

    let events = page.advance_to(300.0);
    assert!(events.contains(&TriggerEvent::Rebuilt {
        elements: 1,
        watchers: 1
    }));
    assert_eq!(page.dom().disconnected(), &[WatcherId(0)]);

    let watcher = page.engine.watcher_of(ElementId(0)).unwrap().clone();
    assert_eq!(watcher.line, 500.0);
    assert_eq!(watcher.margin.to_css(), "-500px 0px -499px 0px");
    assert_eq!(page.dom().observer_margin(watcher.id), Some(watcher.margin));
    assert!(page.engine.next_deadline().is_none());
}

#[test]
fn crossings_follow_the_new_line_after_resize() {
    let mut page = page("fade-in");
    page.init();
    page.resize(1000.0);
    page.advance_by(200.0);

    page.scroll_node_to("a", 600.0);
    assert!(!page.has_class("a", "fade-in"));
    page.scroll_node_to("a", 500.0);
    assert!(page.has_class("a", "fade-in"));
}

#[test]
fn teardown_cancels_pending_resize_rebuild() {
    let mut page = page("fade-in");
    page.init();
    page.resize(1000.0);
    assert_eq!(page.engine.next_deadline(), Some(200.0));

    page.teardown();
    assert_eq!(page.engine.pending_tasks(), 0);
    assert!(page.engine.next_deadline().is_none());

    let events = page.advance_to(500.0);
    assert!(!events
        .iter()
        .any(|e| matches!(e, TriggerEvent::Rebuilt { .. })));
    assert_eq!(page.engine.element_count(), 0);
    assert_eq!(page.dom().observer_count(), 0);
}

#[test]
fn resize_after_teardown_rescans() {
    let mut page = page("fade-in");
    page.init();
    page.teardown();
    page.resize(1000.0);
    let events = page.advance_by(200.0);
    assert!(events.contains(&TriggerEvent::Rebuilt {
        elements: 1,
        watchers: 1
    }));
}

#[test]
fn far_off_line_enters_on_initial_report_only() {
    let mut page = page("mixed-thresholds");
    let rem = ElementId(5);
    // "10rem" resolves to 10, a line ten viewports down. The element starts
    // above it, so the first observer report enters it.
    let events = page.init();
    assert!(events.contains(&TriggerEvent::Entered { element: rem }));
    assert_eq!(page.engine.watcher_of(rem).unwrap().line, 8000.0);
    assert!(page.has_class("rem", "fade-in"));
    assert_eq!(page.engine.has_entered(rem), Some(true));

    // The band is off-viewport, so no scroll produces another crossing.
    page.dom_mut().clear_class_log();
    for top in [700.0, 300.0, 0.0, -200.0] {
        let events = page.scroll_node_to("rem", top);
        assert!(!events.contains(&TriggerEvent::Entered { element: rem }));
        assert!(!events.contains(&TriggerEvent::Exited { element: rem }));
    }
    let rem_node = page.node("rem");
    assert!(page.dom().class_log().iter().all(|c| c.node != rem_node));
    assert!(page.has_class("rem", "fade-in"));
}

#[test]
fn negative_line_never_fires() {
    let mut dom = FakeDom::new(800.0);
    let body = dom.body();
    dom.append(
        body,
        &ElementSpec::new("low", 1000.0, 100.0)
            .attr("animation-class", "fade-in")
            .attr("animation-threshold", "-0.5")
            .attr("animation-reverse", "true"),
    );
    let mut page = Page::new(dom);
    page.init();
    let low = ElementId(0);
    assert_eq!(page.engine.watcher_of(low).unwrap().line, -400.0);
    assert_eq!(page.engine.has_entered(low), Some(false));

    for top in [300.0, 0.0, -250.0, 400.0] {
        assert!(page.scroll_node_to("low", top).is_empty());
    }
    assert!(!page.has_class("low", "fade-in"));
    assert!(page.dom().class_log().is_empty());
    assert_eq!(page.engine.has_entered(low), Some(false));
}
