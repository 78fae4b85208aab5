use crate::config::NoisePolicy;
use crate::env::MapOracle;
use crate::message::{MessageChannel, MessageSink};
use crate::sight::{can_see, sees_invisible};
use crate::state::{ActorState, Behaviour, EntityId, StatusEffect, StatusKind};

use super::grid::{Heard, NoiseListener};

/// Perception score a monster rolls against the noise maker's stealth.
///
/// The second value is set when the noise maker was invisible to the
/// listener, which makes stealth practice rarer.
pub fn awaken_chance<M>(
    map: &M,
    listener: &ActorState,
    producer: Option<&ActorState>,
    loudness: i32,
) -> (i32, bool)
where
    M: MapOracle + ?Sized,
{
    let intelligence = listener
        .monster_traits()
        .map_or(0, |traits| traits.intelligence.rank());
    let mut perception = 10 + intelligence * 4 + listener.hit_dice();
    if sees_invisible(listener) {
        perception += 5;
    }

    let mut unnatural_stealthy = false;
    if let Some(producer) = producer {
        if listener.behaviour == Behaviour::Wandering && listener.foe == Some(producer.id) {
            perception += 15;
        }
        if producer.has(StatusKind::Invisible) && !sees_invisible(listener) {
            perception -= 75;
            unnatural_stealthy = true;
        }
        if producer.has(StatusKind::Backlit) && can_see(map, listener, producer) {
            perception += 50;
        }
    }

    if listener.is_asleep() {
        if listener.holiness.is_natural() {
            if listener.has(StatusKind::SleepWary) {
                perception -= 10;
            }
        } else {
            perception += 10;
        }
    }

    perception += loudness.max(0);
    (perception.max(0), unnatural_stealthy)
}

/// Default [`NoiseListener`]: monsters roll perception against stealth and
/// wake or go looking; the player is told what they heard.
pub struct StealthCheck<'a> {
    map: &'a dyn MapOracle,
    policy: &'a NoisePolicy,
    messages: &'a mut dyn MessageSink,
    alerted: Vec<EntityId>,
    woken: Vec<EntityId>,
}

impl<'a> StealthCheck<'a> {
    pub fn new(
        map: &'a dyn MapOracle,
        policy: &'a NoisePolicy,
        messages: &'a mut dyn MessageSink,
    ) -> Self {
        Self {
            map,
            policy,
            messages,
            alerted: Vec::new(),
            woken: Vec::new(),
        }
    }

    /// Monsters that noticed a noise, in the order they heard it.
    pub fn alerted(&self) -> &[EntityId] {
        &self.alerted
    }

    /// Subset of [`StealthCheck::alerted`] that was asleep.
    pub fn woken(&self) -> &[EntityId] {
        &self.woken
    }

    fn stealth_of(&self, producer: Option<&ActorState>) -> i32 {
        producer
            .and_then(ActorState::player_traits)
            .map_or(self.policy.ambient_stealth, |traits| traits.stealth)
    }
}

impl NoiseListener for StealthCheck<'_> {
    fn hear(&mut self, heard: Heard<'_, '_>) {
        let Heard {
            listener,
            mut producer,
            event,
            perceived,
            dice,
            ..
        } = heard;

        if listener.is_player() {
            if !event.description.is_empty() {
                self.messages.push(
                    MessageChannel::Sound,
                    format!("You hear {}.", event.description),
                );
            }
            return;
        }

        let berserk = producer
            .as_deref()
            .is_some_and(|p| p.has(StatusKind::Berserk));
        let (perception, unnatural_stealthy) =
            awaken_chance(self.map, listener, producer.as_deref(), event.loudness());
        let stealth = self.stealth_of(producer.as_deref());
        let noticed = berserk || dice.x_chance_in_y(perception + 1, stealth);

        if noticed {
            let was_asleep = listener.is_asleep();
            if matches!(
                listener.behaviour,
                Behaviour::Sleeping | Behaviour::Wandering | Behaviour::Seeking(_)
            ) {
                listener.behaviour = Behaviour::Seeking(perceived);
            }
            listener.remove_status(StatusKind::SleepWary);
            if let Some(producer) = producer.as_deref() {
                listener.foe = Some(producer.id);
            }
            tracing::debug!(
                target: "crawl_core::noise",
                listener = %listener.id,
                perception,
                stealth,
                %perceived,
                "listener alerted"
            );
            self.alerted.push(listener.id);
            if was_asleep {
                self.woken.push(listener.id);
            }
            return;
        }

        if let Some(producer) = producer.as_deref_mut() {
            let practice = !listener.wont_attack() && can_see(self.map, producer, listener);
            if let Some(traits) = producer.player_traits_mut() {
                if practice
                    && !dice.x_chance_in_y(traits.armour_mass, 1000)
                    && ((!unnatural_stealthy && dice.one_chance_in(25)) || dice.one_chance_in(100))
                {
                    traits.stealth_practice += 1;
                }
            }
        }

        if listener.is_asleep() && listener.holiness.is_natural() && dice.one_chance_in(3) {
            listener
                .statuses
                .add(StatusEffect::new(StatusKind::SleepWary, self.policy.wary_turns));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{
        Dice, Intelligence, MapDimensions, RngOracle, SpeciesDef, SpeciesId, StaticTile,
        TerrainKind, stream,
    };
    use crate::message::MessageLog;
    use crate::noise::{NoiseEvent, NoiseId};
    use crate::state::{PlayerTraits, Position};

    struct FixedRng(u32);

    impl RngOracle for FixedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.0
        }
    }

    struct Room;

    impl MapOracle for Room {
        fn dimensions(&self) -> MapDimensions {
            MapDimensions::new(10, 10)
        }

        fn tile(&self, position: Position) -> Option<StaticTile> {
            self.contains(position)
                .then_some(StaticTile::new(TerrainKind::Floor))
        }
    }

    fn orc() -> ActorState {
        let def = SpeciesDef::new(SpeciesId(5), "orc", 3).with_intelligence(Intelligence::Human);
        ActorState::monster(EntityId(4), &def, Position::new(5, 5))
            .with_behaviour(Behaviour::Sleeping)
    }

    fn sneak() -> ActorState {
        ActorState::player("Ada", Position::new(2, 5), PlayerTraits::new(1, 10, 10))
    }

    #[test]
    fn perception_formula() {
        let listener = orc();
        // 10 + 2*4 + 3, plus loudness 2.
        assert_eq!(awaken_chance(&Room, &listener, None, 2), (23, false));

        let mut wary = orc();
        wary.add_status(StatusKind::SleepWary, 5);
        assert_eq!(awaken_chance(&Room, &wary, None, 0).0, 11);

        let invisible = sneak().with_status(StatusEffect::new(StatusKind::Invisible, 5));
        assert_eq!(awaken_chance(&Room, &listener, Some(&invisible), 0), (0, true));
    }

    #[test]
    fn backlit_producer_is_easy_to_notice() {
        let listener = orc();
        let lit = sneak().with_status(StatusEffect::new(StatusKind::Backlit, 5));
        assert_eq!(awaken_chance(&Room, &listener, Some(&lit), 0).0, 71);
    }

    #[test]
    fn woken_listener_seeks_perceived_source() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::NOISE);
        let mut log = MessageLog::new();
        let policy = NoisePolicy::default();
        let mut check = StealthCheck::new(&Room, &policy, &mut log);

        let mut listener = orc();
        let mut producer = sneak();
        let event = NoiseEvent::from_loudness(producer.position, 5, Some(producer.id));
        check.hear(Heard {
            listener: &mut listener,
            producer: Some(&mut producer),
            noise_id: NoiseId(0),
            event: &event,
            intensity: 2450,
            travel: 3,
            perceived: Position::new(2, 5),
            dice: &mut dice,
        });

        assert_eq!(listener.behaviour, Behaviour::Seeking(Position::new(2, 5)));
        assert_eq!(listener.foe, Some(EntityId::PLAYER));
        assert_eq!(check.woken(), &[EntityId(4)]);
    }

    #[test]
    fn sleeping_through_noise_trains_stealth() {
        let rng = FixedRng(u32::MAX);
        let mut dice = Dice::new(&rng, 0, 0, stream::NOISE);
        let mut log = MessageLog::new();
        let policy = NoisePolicy::default();
        let mut check = StealthCheck::new(&Room, &policy, &mut log);

        let mut listener = orc();
        let mut producer = sneak();
        let event = NoiseEvent::from_loudness(producer.position, 1, Some(producer.id));
        check.hear(Heard {
            listener: &mut listener,
            producer: Some(&mut producer),
            noise_id: NoiseId(0),
            event: &event,
            intensity: 900,
            travel: 3,
            perceived: Position::new(2, 5),
            dice: &mut dice,
        });

        // Every chance fails under maximal rolls, so nothing changes.
        assert!(listener.is_asleep());
        assert!(check.alerted().is_empty());
        assert_eq!(producer.player_traits().map(|t| t.stealth_practice), Some(0));
        assert!(!listener.has(StatusKind::SleepWary));
    }

    #[test]
    fn player_listener_gets_a_message() {
        let rng = FixedRng(0);
        let mut dice = Dice::new(&rng, 0, 0, stream::NOISE);
        let mut log = MessageLog::new();
        let policy = NoisePolicy::default();
        {
            let mut check = StealthCheck::new(&Room, &policy, &mut log);
            let mut player = sneak();
            let event = NoiseEvent::from_loudness(Position::new(8, 8), 4, None)
                .with_description("a distant clang");
            check.hear(Heard {
                listener: &mut player,
                producer: None,
                noise_id: NoiseId(0),
                event: &event,
                intensity: 1000,
                travel: 6,
                perceived: Position::new(8, 8),
                dice: &mut dice,
            });
        }
        assert!(log.contains("You hear a distant clang."));
    }
}
