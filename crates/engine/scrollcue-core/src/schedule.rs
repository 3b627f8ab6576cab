//! Cancelable delayed tasks with owner-scoped cancellation.
//!
//! Two kinds of wake-up exist: wall-clock deadlines (resize debounce, stagger
//! steps) and rendering-frame countdowns (debug settle). The scheduler never
//! calls anything itself; the host advances it and the engine runs what
//! comes out.

use crate::ids::{ElementId, TaskId};

/// Who a task belongs to. Scheduling for an owner usually starts by
/// cancelling everything it still has pending.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Resize,
    Stagger(ElementId),
    Settle(ElementId),
}

impl Owner {
    /// Whether this owner belongs to the current registration pass.
    pub fn is_registration_scoped(self) -> bool {
        !matches!(self, Owner::Resize)
    }
}

#[derive(Debug)]
struct Timed<T> {
    id: TaskId,
    owner: Owner,
    at: f64,
    task: T,
}

#[derive(Debug)]
struct Framed<T> {
    id: TaskId,
    owner: Owner,
    remaining: u32,
    task: T,
}

/// A task that came due.
#[derive(Debug, PartialEq)]
pub struct Due<T> {
    pub id: TaskId,
    pub owner: Owner,
    pub task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    timed: Vec<Timed<T>>,
    framed: Vec<Framed<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            timed: Vec::new(),
            framed: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Run `task` once the clock reaches `at` (milliseconds).
    pub fn schedule_at(&mut self, owner: Owner, at: f64, task: T) -> TaskId {
        let id = self.alloc();
        self.timed.push(Timed {
            id,
            owner,
            at,
            task,
        });
        id
    }

    /// Run `task` after `frames` rendering frames. Zero means the next frame.
    pub fn schedule_after_frames(&mut self, owner: Owner, frames: u32, task: T) -> TaskId {
        let id = self.alloc();
        self.framed.push(Framed {
            id,
            owner,
            remaining: frames.max(1),
            task,
        });
        id
    }

    /// Cancel every pending task of `owner`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: Owner) -> usize {
        self.cancel_where(|o| o == owner)
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(Owner) -> bool) -> usize {
        let before = self.len();
        self.timed.retain(|t| !pred(t.owner));
        self.framed.retain(|t| !pred(t.owner));
        before - self.len()
    }

    /// Remove and return the earliest task due at `now`. Ties go to the
    /// task scheduled first.
    pub fn pop_due(&mut self, now: f64) -> Option<Due<T>> {
        let idx = self
            .timed
            .iter()
            .enumerate()
            .filter(|(_, t)| t.at <= now)
            .min_by(|(_, a), (_, b)| a.at.total_cmp(&b.at).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;
        let t = self.timed.remove(idx);
        Some(Due {
            id: t.id,
            owner: t.owner,
            task: t.task,
        })
    }

    /// Count one rendering frame and return the tasks it completed, in
    /// scheduling order.
    pub fn tick_frame(&mut self) -> Vec<Due<T>> {
        for f in &mut self.framed {
            f.remaining -= 1;
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            self.framed.drain(..).partition(|f| f.remaining == 0);
        self.framed = pending;
        due.into_iter()
            .map(|f| Due {
                id: f.id,
                owner: f.owner,
                task: f.task,
            })
            .collect()
    }

    /// Earliest wall-clock deadline still pending.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timed.iter().map(|t| t.at).min_by(f64::total_cmp)
    }

    pub fn has_frame_tasks(&self) -> bool {
        !self.framed.is_empty()
    }

    pub fn pending_for(&self, owner: Owner) -> usize {
        self.timed.iter().filter(|t| t.owner == owner).count()
            + self.framed.iter().filter(|t| t.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.timed.len() + self.framed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
