//! Controller events and the bus that carries them.
//!
//! Everything the controller tells the outside world (animation signals,
//! visibility, power changes, removal) is published as a [`ControllerEvent`]
//! and drained into the frame's effects.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use lunar_common::{CellCoord, EntityId};

use crate::physics::Facing;
use crate::power::{AnimationProfile, PowerState};

/// Signals emitted by the player controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// Horizontal speed for the run animation
    Speed(f32),
    /// Skid flag: input opposes current velocity
    Stop(bool),
    /// Jump pose flag
    Jump(bool),
    /// Death pose flag
    Dead(bool),
    /// One-shot power transition trigger
    ChangeState,
    /// Animation profile swap
    Profile(AnimationProfile),
    /// Animator on/off (suspended while falling off a ledge)
    AnimatorEnabled(bool),
    /// Sprite visibility (invincibility flicker)
    Visible(bool),
    /// Power state changed
    PowerChanged {
        /// Previous state
        from: PowerState,
        /// New state
        to: PowerState,
    },
    /// A shot was fired in the given direction
    ShotFired(Facing),
    /// A pickup was consumed and should be removed
    PickupConsumed(EntityId),
    /// A level cell was hit from below
    CellHit(CellCoord),
    /// The controller's entity should be removed from the level
    Removed,
}

/// Event bus for broadcasting controller events.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<ControllerEvent>,
    /// Receiver for collecting events
    receiver: Receiver<ControllerEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: ControllerEvent) {
        // Non-blocking send - if full, event is dropped
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            warn!(
                "Event bus full ({} pending), dropping {:?}",
                self.capacity, event
            );
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<ControllerEvent> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(ControllerEvent::Jump(true));
        bus.publish(ControllerEvent::ChangeState);

        let events = bus.drain();
        assert_eq!(
            events,
            vec![ControllerEvent::Jump(true), ControllerEvent::ChangeState]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        bus.publish(ControllerEvent::Dead(true));
        bus.publish(ControllerEvent::Removed);
        assert_eq!(bus.drain(), vec![ControllerEvent::Dead(true)]);
    }

    #[test]
    fn test_default_bus_holds_a_busy_frame() {
        let bus = EventBus::default();
        for _ in 0..256 {
            bus.publish(ControllerEvent::Visible(false));
        }
        bus.publish(ControllerEvent::Removed);
        let events = bus.drain();
        assert_eq!(events.len(), 256);
        assert!(!events.contains(&ControllerEvent::Removed));
    }
}
