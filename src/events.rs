//! Gameplay event fan-out.
//!
//! The bus is an owned value injected wherever destruction can happen; the
//! simulation drains it after each collector finishes its cascade. There is
//! no global event state.

use std::collections::VecDeque;

use crate::PixelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameplayEvent {
    /// A pixel was destroyed through the sanctioned gameplay path.
    PixelDestroyed(PixelId),
    /// The grid's live pixel set changed; outlines must be recomputed.
    GridPixelsChanged,
    /// A key finished collecting; unlocks the next locked collector.
    KeyCollected,
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: VecDeque<GameplayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameplayEvent) {
        self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<GameplayEvent> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut bus = EventBus::new();
        bus.publish(GameplayEvent::PixelDestroyed(PixelId(3)));
        bus.publish(GameplayEvent::GridPixelsChanged);
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.pop(), Some(GameplayEvent::PixelDestroyed(PixelId(3))));
        assert_eq!(bus.pop(), Some(GameplayEvent::GridPixelsChanged));
        assert_eq!(bus.pop(), None);
        assert!(bus.is_empty());
    }
}
