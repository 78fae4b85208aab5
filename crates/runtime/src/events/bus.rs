//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{CombatEvent, NoiseEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Attacks and deaths
    Combat,
    /// Listeners reacting to noise
    Noise,
    /// Turn bookkeeping
    Turn,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Combat, Topic::Noise, Topic::Turn];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Combat(CombatEvent),
    Noise(NoiseEvent),
    Turn(TurnEvent),
}

impl GameEvent {
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::Combat(_) => Topic::Combat,
            GameEvent::Noise(_) => Topic::Noise,
            GameEvent::Turn(_) => Topic::Turn,
        }
    }
}

impl From<CombatEvent> for GameEvent {
    fn from(event: CombatEvent) -> Self {
        GameEvent::Combat(event)
    }
}

impl From<NoiseEvent> for GameEvent {
    fn from(event: NoiseEvent) -> Self {
        GameEvent::Noise(event)
    }
}

impl From<TurnEvent> for GameEvent {
    fn from(event: TurnEvent) -> Self {
        GameEvent::Turn(event)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Channels are created up front, so the bus is
/// never locked.
#[derive(Clone)]
pub struct EventBus {
    channels: HashMap<Topic, broadcast::Sender<GameEvent>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self { channels }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<GameEvent>) {
        let event = event.into();
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "crawl_runtime::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<GameEvent> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created in `with_capacity`; a closed receiver
            // just yields nothing.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<GameEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects whatever is buffered on a receiver without waiting.
///
/// Lagged receivers skip the dropped events and keep draining.
pub fn drain(receiver: &mut broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(target: "crawl_runtime::events", skipped, "event receiver lagged");
            }
            Err(_) => return events,
        }
    }
}

#[cfg(test)]
mod tests {
    use crawl_core::EntityId;

    use super::*;

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::new();
        let mut combat = bus.subscribe(Topic::Combat);
        let mut turn = bus.subscribe(Topic::Turn);

        bus.publish(CombatEvent::ActorKilled {
            victim: EntityId(3),
            killer: Some(EntityId::PLAYER),
        });

        assert_eq!(drain(&mut combat).len(), 1);
        assert!(drain(&mut turn).is_empty());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::with_capacity(2);
        for id in 0..5 {
            bus.publish(NoiseEvent::ActorWoke { actor: EntityId(id) });
        }
    }

    #[test]
    fn lagging_receiver_keeps_latest() {
        let bus = EventBus::with_capacity(2);
        let mut noise = bus.subscribe(Topic::Noise);
        for id in 0..5 {
            bus.publish(NoiseEvent::ActorWoke { actor: EntityId(id) });
        }
        let events = drain(&mut noise);
        assert_eq!(
            events.last(),
            Some(&GameEvent::Noise(NoiseEvent::ActorWoke { actor: EntityId(4) }))
        );
    }
}
