//! Trigger registry: groups elements by resolved fraction so each distinct
//! fraction gets exactly one watcher.
//!
//! Fractions are matched bit-for-bit. `0.1 + 0.2` and `0.3` get separate
//! watchers; that costs one extra observer and nothing else.

use hashbrown::HashMap;

use crate::ids::{ElementId, IdAllocator, WatcherId};
use crate::watcher::Watcher;

#[derive(Debug, Default)]
pub struct TriggerRegistry {
    by_fraction: HashMap<u64, WatcherId>,
    watchers: Vec<Watcher>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `element` to the watcher for `fraction`, creating it if needed.
    /// Returns the watcher and whether it was just created.
    pub fn register(
        &mut self,
        ids: &mut IdAllocator,
        element: ElementId,
        fraction: f64,
        viewport_height: f64,
    ) -> (&Watcher, bool) {
        let key = fraction.to_bits();
        let (id, created) = match self.by_fraction.get(&key) {
            Some(id) => (*id, false),
            None => {
                let id = ids.alloc_watcher();
                self.by_fraction.insert(key, id);
                self.watchers.push(Watcher::new(id, fraction, viewport_height));
                (id, true)
            }
        };
        let watcher = &mut self.watchers[id.0 as usize];
        watcher.members.push(element);
        (&self.watchers[id.0 as usize], created)
    }

    pub fn get(&self, id: WatcherId) -> Option<&Watcher> {
        self.watchers.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Watcher> {
        self.watchers.iter()
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }

    /// Forget every watcher, returning their ids for disconnection.
    pub fn drain(&mut self) -> Vec<WatcherId> {
        self.by_fraction.clear();
        self.watchers.drain(..).map(|w| w.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_fractions_share_a_watcher() {
        let mut ids = IdAllocator::new();
        let mut reg = TriggerRegistry::new();
        let (w0, created0) = reg.register(&mut ids, ElementId(0), 0.5, 800.0);
        let w0 = w0.id;
        let (w1, created1) = reg.register(&mut ids, ElementId(1), 0.5, 800.0);
        assert!(created0);
        assert!(!created1);
        assert_eq!(w0, w1.id);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(w0).unwrap().members, vec![ElementId(0), ElementId(1)]);
    }

    #[test]
    fn distinct_fractions_never_share() {
        let mut ids = IdAllocator::new();
        let mut reg = TriggerRegistry::new();
        reg.register(&mut ids, ElementId(0), 0.5, 800.0);
        reg.register(&mut ids, ElementId(1), 0.75, 800.0);
        reg.register(&mut ids, ElementId(2), 0.1 + 0.2, 800.0);
        reg.register(&mut ids, ElementId(3), 0.3, 800.0);
        assert_eq!(reg.len(), 4);
        let lines: Vec<_> = reg.iter().map(|w| w.line).collect();
        assert_eq!(lines[1], 600.0);
    }

    #[test]
    fn drain_empties_registry() {
        let mut ids = IdAllocator::new();
        let mut reg = TriggerRegistry::new();
        reg.register(&mut ids, ElementId(0), 0.5, 800.0);
        reg.register(&mut ids, ElementId(1), 0.25, 800.0);
        assert_eq!(reg.drain(), vec![WatcherId(0), WatcherId(1)]);
        assert!(reg.is_empty());
        assert!(reg.get(WatcherId(0)).is_none());
        ids.reset();
        let (w, created) = reg.register(&mut ids, ElementId(0), 0.5, 800.0);
        assert!(created);
        assert_eq!(w.id, WatcherId(0));
        assert_eq!(w.members, vec![ElementId(0)]);
    }
}
