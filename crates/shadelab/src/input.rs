//! Keyboard state for the frame function.
//!
//! [`Keyboard`] is fed by the host's window events through
//! [`handle`](Keyboard::handle) and read by [`frame`](crate::app::frame).
//! Edges (a key going down or up) are kept in arrival order until
//! [`end_frame`](Keyboard::end_frame).

use std::collections::HashSet;

pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

/// Held keys plus the press and release edges seen this frame.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    held: HashSet<KeyCode>,
    edges: Vec<(KeyCode, ElementState)>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one key event. Auto-repeat presses of a held key and releases
    /// of a key that was never down record no edge.
    pub fn handle(&mut self, key: KeyCode, state: ElementState) {
        let changed = match state {
            ElementState::Pressed => self.held.insert(key),
            ElementState::Released => self.held.remove(&key),
        };
        if changed {
            self.edges.push((key, state));
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.handle(key, ElementState::Pressed);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.handle(key, ElementState::Released);
    }

    pub fn held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// `key` went down this frame.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.edges.contains(&(key, ElementState::Pressed))
    }

    /// `key` went up this frame.
    pub fn just_released(&self, key: KeyCode) -> bool {
        self.edges.contains(&(key, ElementState::Released))
    }

    /// Forget this frame's edges. Held keys stay held.
    pub fn end_frame(&mut self) {
        self.edges.clear();
    }
}
