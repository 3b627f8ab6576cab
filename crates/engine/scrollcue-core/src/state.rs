//! Per-element enter/exit state machine.

use serde::{Deserialize, Serialize};

use crate::config::Reverse;
use crate::host::Host;

/// Crossing direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Enter,
    Exit,
}

/// Outcome of one crossing for one element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Apply(Direction),
    /// Below the line but exit is not permitted (no reverse, or never entered).
    Hold,
}

/// "Has entered at least once". Only a teardown resets it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    entered: bool,
}

impl AnimationState {
    pub fn has_entered(&self) -> bool {
        self.entered
    }

    /// Decide what a crossing with the element top at `top` means against
    /// `line`, updating the entered flag.
    pub fn on_crossing(&mut self, top: f64, line: f64, reverse: &Reverse) -> Transition {
        if top <= line {
            self.entered = true;
            Transition::Apply(Direction::Enter)
        } else if reverse.is_enabled() && self.entered {
            Transition::Apply(Direction::Exit)
        } else {
            Transition::Hold
        }
    }
}

/// Apply an enter or exit class change to one node.
pub fn apply_classes<H: Host>(
    host: &mut H,
    node: &H::Node,
    direction: Direction,
    animation_class: &str,
    reverse: &Reverse,
) {
    match direction {
        Direction::Enter => {
            host.add_class(node, animation_class);
            if let Some(alt) = reverse.alternate_class() {
                host.remove_class(node, alt);
            }
        }
        Direction::Exit => {
            host.remove_class(node, animation_class);
            if let Some(alt) = reverse.alternate_class() {
                host.add_class(node, alt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_at_or_above_line() {
        let mut s = AnimationState::default();
        assert_eq!(
            s.on_crossing(400.0, 400.0, &Reverse::None),
            Transition::Apply(Direction::Enter)
        );
        assert!(s.has_entered());
    }

    #[test]
    fn no_exit_without_reverse() {
        let mut s = AnimationState::default();
        s.on_crossing(100.0, 400.0, &Reverse::None);
        assert_eq!(s.on_crossing(500.0, 400.0, &Reverse::None), Transition::Hold);
        assert!(s.has_entered());
    }

    #[test]
    fn exit_before_first_enter_is_a_no_op() {
        let mut s = AnimationState::default();
        assert_eq!(s.on_crossing(500.0, 400.0, &Reverse::Mirror), Transition::Hold);
        assert!(!s.has_entered());
        s.on_crossing(300.0, 400.0, &Reverse::Mirror);
        assert_eq!(
            s.on_crossing(500.0, 400.0, &Reverse::Mirror),
            Transition::Apply(Direction::Exit)
        );
        // Exit does not clear the flag.
        assert!(s.has_entered());
    }
}
