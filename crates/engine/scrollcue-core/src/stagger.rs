//! Child stagger scheduler: fans one enter/exit into per-target class
//! toggles, optionally spaced in time.

use crate::config::{Children, Reverse};
use crate::host::Host;
use crate::ids::ElementId;
use crate::schedule::{Owner, Scheduler};
use crate::state::{apply_classes, Direction};

/// Delegated targets of `node`, in document order, never including debug markers.
pub fn resolve_targets<H: Host>(host: &H, node: &H::Node, children: &Children) -> Vec<H::Node> {
    let candidates = match children {
        Children::None => return Vec::new(),
        Children::Direct => host.child_elements(node),
        Children::Class(class) => host.descendants_with_class(node, class),
    };
    candidates
        .into_iter()
        .filter(|c| !host.is_marker(c))
        .collect()
}

/// One pending per-target toggle, as stored in the scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaggerStep {
    pub element: ElementId,
    pub index: usize,
    pub direction: Direction,
}

/// Targets of the most recent staggered fan-out for one parent. The queued
/// steps live in the scheduler under [`Owner::Stagger`].
#[derive(Debug)]
pub struct StaggerSchedule<N> {
    pub direction: Direction,
    pub targets: Vec<N>,
}

impl<N> StaggerSchedule<N> {
    pub fn target(&self, index: usize) -> Option<&N> {
        self.targets.get(index)
    }
}

/// What a fan-out did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FanOut {
    /// Exit requested without reverse configured; nothing happened.
    Gated,
    /// Every target toggled synchronously.
    Immediate { targets: usize },
    /// Targets queued `delay_ms` apart, the first at `now`.
    Scheduled { targets: usize },
}

/// Parameters of one fan-out.
pub struct FanOutRequest<'a> {
    pub element: ElementId,
    pub direction: Direction,
    pub children: &'a Children,
    pub animation_class: &'a str,
    pub reverse: &'a Reverse,
    pub stagger_ms: f64,
    pub now: f64,
}

/// Fan `req.direction` out over the delegated targets of `parent`.
///
/// Any earlier schedule of the same parent is cancelled first, so a late
/// toggle from a superseded fan-out can never land. `previous` receives the
/// new schedule when targets were queued and is cleared otherwise.
pub fn fan_out<H, T>(
    host: &mut H,
    scheduler: &mut Scheduler<T>,
    parent: &H::Node,
    previous: &mut Option<StaggerSchedule<H::Node>>,
    req: FanOutRequest<'_>,
    task: impl Fn(StaggerStep) -> T,
) -> FanOut
where
    H: Host,
{
    let owner = Owner::Stagger(req.element);
    let cancelled = scheduler.cancel_owner(owner);
    if cancelled > 0 {
        log::trace!("element {:?}: cancelled {cancelled} pending stagger steps", req.element);
    }
    *previous = None;

    if req.direction == Direction::Exit && !req.reverse.is_enabled() {
        return FanOut::Gated;
    }

    let targets = resolve_targets(host, parent, req.children);
    if req.stagger_ms <= 0.0 {
        for target in &targets {
            apply_classes(host, target, req.direction, req.animation_class, req.reverse);
        }
        return FanOut::Immediate {
            targets: targets.len(),
        };
    }

    for index in 0..targets.len() {
        let at = req.now + index as f64 * req.stagger_ms;
        scheduler.schedule_at(
            owner,
            at,
            task(StaggerStep {
                element: req.element,
                index,
                direction: req.direction,
            }),
        );
    }
    let count = targets.len();
    *previous = Some(StaggerSchedule {
        direction: req.direction,
        targets,
    });
    FanOut::Scheduled { targets: count }
}
