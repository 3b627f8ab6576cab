//! Engine: owns every registration, watcher and pending task for one document.
//!
//! Methods:
//! - new, init / refresh (full rebuild), teardown
//! - on_resize (debounced rebuild), handle_crossings (observer callbacks)
//! - advance / advance_frame (run due tasks)

use crate::config::{read_animation_class, AttributeNames, Config, ElementConfig};
use crate::error::ConfigError;
use crate::host::Host;
use crate::ids::{ElementId, IdAllocator, WatcherId};
use crate::outputs::{Outputs, TriggerEvent};
use crate::overlay::{markers_for, palette_color, DebugArtifacts};
use crate::registry::TriggerRegistry;
use crate::schedule::{Due, Owner, Scheduler};
use crate::stagger::{fan_out, FanOut, FanOutRequest, StaggerSchedule, StaggerStep};
use crate::state::{apply_classes, AnimationState, Direction, Transition};
use crate::watcher::Watcher;

/// Deferred work.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Rebuild,
    Stagger(StaggerStep),
    DrawOverlay(ElementId),
}

/// Everything the engine knows about one registered element.
pub struct ElementRecord<H: Host> {
    pub id: ElementId,
    pub node: H::Node,
    pub config: ElementConfig,
    pub fraction: f64,
    pub watcher: WatcherId,
    pub state: AnimationState,
    pub stagger: Option<StaggerSchedule<H::Node>>,
    /// Palette color, present when debug is enabled.
    pub debug_color: Option<String>,
    pub debug: Option<DebugArtifacts<H::MarkerHandle>>,
}

pub struct Engine<H: Host> {
    cfg: Config,
    names: AttributeNames,
    host: H,

    ids: IdAllocator,
    registry: TriggerRegistry,
    elements: Vec<ElementRecord<H>>,
    scheduler: Scheduler<Task>,

    outputs: Outputs,
}

impl<H: Host> Engine<H> {
    /// Create an engine over `host`. Nothing is scanned until [`Engine::init`].
    pub fn new(host: H, cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::build(host, cfg))
    }

    pub fn with_defaults(host: H) -> Self {
        Self::build(host, Config::default())
    }

    fn build(host: H, cfg: Config) -> Self {
        Self {
            names: cfg.attribute_names(),
            cfg,
            host,
            ids: IdAllocator::new(),
            registry: TriggerRegistry::new(),
            elements: Vec::new(),
            scheduler: Scheduler::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Initial scan. Calling it again behaves like [`Engine::refresh`].
    pub fn init(&mut self) -> &Outputs {
        self.outputs.clear();
        self.rebuild();
        &self.outputs
    }

    /// Full rebuild: teardown, then rescan against the current viewport.
    pub fn refresh(&mut self) -> &Outputs {
        self.outputs.clear();
        self.rebuild();
        &self.outputs
    }

    /// Disconnect every watcher, cancel every pending task, remove every
    /// debug marker and forget every element. Safe to call at any time.
    ///
    /// A debounced rebuild requested by [`Engine::on_resize`] is cancelled
    /// too; only a later resize or [`Engine::refresh`] rescans.
    pub fn teardown(&mut self) -> &Outputs {
        self.outputs.clear();
        if self.scheduler.cancel_owner(Owner::Resize) > 0 {
            log::debug!("teardown: dropped pending resize rebuild");
        }
        self.teardown_inner();
        &self.outputs
    }

    /// Note a viewport resize. The rebuild runs once no further resize has
    /// been seen for `resize_debounce_ms`.
    pub fn on_resize(&mut self, now: f64) {
        self.scheduler.cancel_owner(Owner::Resize);
        let at = now + self.cfg.resize_debounce_ms;
        self.scheduler.schedule_at(Owner::Resize, at, Task::Rebuild);
    }

    /// Observer callback: `elements` changed intersection with `watcher`'s band.
    pub fn handle_crossings(
        &mut self,
        watcher: WatcherId,
        elements: &[ElementId],
        now: f64,
    ) -> &Outputs {
        self.outputs.clear();
        for &id in elements {
            self.handle_crossing(watcher, id, now);
        }
        self.run_due(now);
        &self.outputs
    }

    /// Run every timed task due at `now`.
    pub fn advance(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        self.run_due(now);
        &self.outputs
    }

    /// Count one rendering frame, then run whatever came due.
    pub fn advance_frame(&mut self, now: f64) -> &Outputs {
        self.outputs.clear();
        for due in self.scheduler.tick_frame() {
            self.run_task(due);
        }
        self.run_due(now);
        &self.outputs
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduler.next_deadline()
    }

    pub fn has_frame_tasks(&self) -> bool {
        self.scheduler.has_frame_tasks()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pending_stagger(&self, id: ElementId) -> usize {
        self.scheduler.pending_for(Owner::Stagger(id))
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn watcher_count(&self) -> usize {
        self.registry.len()
    }

    pub fn watchers(&self) -> impl Iterator<Item = &Watcher> {
        self.registry.iter()
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementRecord<H>> {
        self.elements.iter()
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementRecord<H>> {
        self.elements.get(id.index())
    }

    pub fn has_entered(&self, id: ElementId) -> Option<bool> {
        self.element(id).map(|r| r.state.has_entered())
    }

    pub fn watcher_of(&self, id: ElementId) -> Option<&Watcher> {
        self.element(id).and_then(|r| self.registry.get(r.watcher))
    }

    fn rebuild(&mut self) {
        self.teardown_inner();
        self.register_all();
        let (elements, watchers) = (self.elements.len(), self.registry.len());
        log::info!("scrollcue: registered {elements} elements on {watchers} watchers");
        self.outputs.push(TriggerEvent::Rebuilt { elements, watchers });
    }

    fn teardown_inner(&mut self) {
        let watcher_ids = self.registry.drain();
        for &w in &watcher_ids {
            self.host.disconnect(w);
        }
        let cancelled = self.scheduler.cancel_where(Owner::is_registration_scoped);
        let elements = self.elements.len();
        for record in self.elements.drain(..) {
            if let Some(artifacts) = record.debug {
                self.host.remove_marker(artifacts.trigger_line);
                self.host.remove_marker(artifacts.element_anchor);
            }
        }
        self.ids.reset();
        if elements == 0 && watcher_ids.is_empty() {
            return;
        }
        log::debug!(
            "scrollcue: teardown dropped {elements} elements, {} watchers, {cancelled} tasks",
            watcher_ids.len()
        );
        self.outputs.push(TriggerEvent::TornDown {
            elements,
            watchers: watcher_ids.len(),
        });
    }

    fn register_all(&mut self) {
        let viewport_height = self.host.viewport_height();
        let mut debug_index = 0usize;

        for node in self.host.scan(&self.names.class) {
            let config = match ElementConfig::from_host(&self.host, &node, &self.names) {
                Ok(c) => c,
                Err(e) => {
                    log::debug!("scrollcue: skipping element: {e}");
                    continue;
                }
            };
            if self.host.has_class(&node, &config.animation_class) {
                log::debug!(
                    "scrollcue: skipping element already carrying {:?}",
                    config.animation_class
                );
                continue;
            }

            let default = self.cfg.default_threshold;
            let fraction = config
                .threshold
                .resolve(viewport_height, default)
                .unwrap_or_else(|e| {
                    log::debug!("scrollcue: {e}; using default threshold {default}");
                    default
                });

            let id = self.ids.alloc_element();
            let (watcher, created) =
                self.registry
                    .register(&mut self.ids, id, fraction, viewport_height);
            if created {
                log::trace!(
                    "scrollcue: watcher {:?} for fraction {fraction} at {}px",
                    watcher.id,
                    watcher.line
                );
            }
            let watcher_id = watcher.id;
            self.host.observe(watcher_id, &watcher.margin, id, &node);

            let debug_color = config.debug.then(|| {
                let color = palette_color(&self.cfg.palette, debug_index).to_string();
                debug_index += 1;
                self.scheduler.schedule_after_frames(
                    Owner::Settle(id),
                    self.cfg.settle_frames,
                    Task::DrawOverlay(id),
                );
                color
            });

            self.elements.push(ElementRecord {
                id,
                node,
                config,
                fraction,
                watcher: watcher_id,
                state: AnimationState::default(),
                stagger: None,
                debug_color,
                debug: None,
            });
        }
    }

    fn handle_crossing(&mut self, watcher: WatcherId, id: ElementId, now: f64) {
        let Some(line) = self.registry.get(watcher).map(|w| w.line) else {
            return;
        };
        let Some(record) = self.elements.get_mut(id.index()) else {
            return;
        };
        if record.watcher != watcher {
            return;
        }
        if let Err(e) = read_animation_class(&self.host, &record.node, &self.names) {
            log::debug!("scrollcue: ignoring crossing for {id:?}: {e}");
            return;
        }

        let top = self.host.top(&record.node);
        let transition = record.state.on_crossing(top, line, &record.config.reverse);
        log::trace!("scrollcue: {id:?} top={top} line={line} -> {transition:?}");
        let Transition::Apply(direction) = transition else {
            return;
        };

        if record.config.children.is_delegated() {
            let outcome = fan_out(
                &mut self.host,
                &mut self.scheduler,
                &record.node,
                &mut record.stagger,
                FanOutRequest {
                    element: id,
                    direction,
                    children: &record.config.children,
                    animation_class: &record.config.animation_class,
                    reverse: &record.config.reverse,
                    stagger_ms: record.config.stagger_ms,
                    now,
                },
                Task::Stagger,
            );
            if let FanOut::Immediate { targets } = outcome {
                for index in 0..targets {
                    self.outputs.push(TriggerEvent::TargetToggled {
                        element: id,
                        index,
                        direction,
                    });
                }
            }
        } else {
            apply_classes(
                &mut self.host,
                &record.node,
                direction,
                &record.config.animation_class,
                &record.config.reverse,
            );
        }

        self.outputs.push(match direction {
            Direction::Enter => TriggerEvent::Entered { element: id },
            Direction::Exit => TriggerEvent::Exited { element: id },
        });
    }

    fn run_due(&mut self, now: f64) {
        while let Some(due) = self.scheduler.pop_due(now) {
            self.run_task(due);
        }
    }

    fn run_task(&mut self, due: Due<Task>) {
        log::trace!("scrollcue: running {:?} for {:?}", due.task, due.owner);
        match due.task {
            Task::Rebuild => self.rebuild(),
            Task::Stagger(step) => self.run_stagger_step(step),
            Task::DrawOverlay(id) => self.draw_overlay(id),
        }
    }

    fn run_stagger_step(&mut self, step: StaggerStep) {
        let Some(record) = self.elements.get(step.element.index()) else {
            return;
        };
        let Some(schedule) = record.stagger.as_ref() else {
            return;
        };
        if schedule.direction != step.direction {
            return;
        }
        let Some(target) = schedule.target(step.index) else {
            return;
        };
        apply_classes(
            &mut self.host,
            target,
            step.direction,
            &record.config.animation_class,
            &record.config.reverse,
        );
        self.outputs.push(TriggerEvent::TargetToggled {
            element: step.element,
            index: step.index,
            direction: step.direction,
        });
    }

    fn draw_overlay(&mut self, id: ElementId) {
        let Some(record) = self.elements.get_mut(id.index()) else {
            return;
        };
        if record.debug.is_some() {
            return;
        }
        let Some(line) = self.registry.get(record.watcher).map(|w| w.line) else {
            return;
        };
        let Some(color) = record.debug_color.as_deref() else {
            return;
        };
        let [trigger, anchor] = markers_for(record.fraction, line, color);
        record.debug = Some(DebugArtifacts {
            trigger_line: self.host.insert_marker(&trigger, &record.node),
            element_anchor: self.host.insert_marker(&anchor, &record.node),
        });
        self.outputs.push(TriggerEvent::OverlayDrawn { element: id });
    }
}
