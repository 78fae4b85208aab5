use crate::config::NoisePolicy;
use crate::env::{Dice, MapDimensions, MapOracle};
use crate::state::{ActorState, EntityId, Position, Roster, StatusKind, Step};

use super::error::NoiseError;
use super::perception::perceived_position;

/// Index of a noise within the current propagation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseId(pub u32);

/// A sound emitted somewhere on the map.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseEvent {
    pub source: Position,
    /// Intensity in milli-units.
    pub intensity: i32,
    pub producer: Option<EntityId>,
    /// Short phrase shown to the player, e.g. "a loud crash". May be empty.
    pub description: String,
}

impl NoiseEvent {
    pub fn milli(source: Position, intensity: i32, producer: Option<EntityId>) -> Self {
        Self {
            source,
            intensity,
            producer,
            description: String::new(),
        }
    }

    /// Builds an event from a whole-unit loudness.
    pub fn from_loudness(source: Position, loudness: i32, producer: Option<EntityId>) -> Self {
        Self::milli(source, loudness.saturating_mul(1000), producer)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn loudness(&self) -> i32 {
        self.intensity / 1000
    }
}

/// Per-cell propagation record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseCell {
    /// Loudest noise that reached the cell, if any.
    pub noise_id: Option<NoiseId>,
    pub intensity: i32,
    /// Steps walked from the source along the loudest path.
    pub travel: u32,
    /// Direction of the last step into this cell; `Step::NONE` at a source.
    pub arrival: Step,
}

impl NoiseCell {
    pub const SILENT: Self = Self {
        noise_id: None,
        intensity: 0,
        travel: 0,
        arrival: Step::NONE,
    };

    pub fn is_silent(&self) -> bool {
        self.noise_id.is_none()
    }
}

impl Default for NoiseCell {
    fn default() -> Self {
        Self::SILENT
    }
}

/// What a listener receives for the noise it heard.
pub struct Heard<'a, 'r> {
    pub listener: &'a mut ActorState,
    /// The actor that made the noise, when it is still on the roster.
    pub producer: Option<&'a mut ActorState>,
    pub noise_id: NoiseId,
    pub event: &'a NoiseEvent,
    /// Intensity that arrived at the listener's cell.
    pub intensity: i32,
    pub travel: u32,
    /// Where the listener believes the noise came from.
    pub perceived: Position,
    pub dice: &'a mut Dice<'r>,
}

/// Reacts to actors hearing a noise.
pub trait NoiseListener {
    fn hear(&mut self, heard: Heard<'_, '_>);
}

impl<F> NoiseListener for F
where
    F: FnMut(Heard<'_, '_>),
{
    fn hear(&mut self, heard: Heard<'_, '_>) {
        self(heard)
    }
}

/// Summary of one propagation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub events: usize,
    /// Cells holding any noise after the flood.
    pub cells_reached: usize,
    /// Listeners handed to the [`NoiseListener`], in order.
    pub heard: Vec<(EntityId, NoiseId)>,
}

/// Turn-angle between two consecutive steps.
///
/// Zero when leaving a source or going straight, 4 for a reversal, otherwise
/// the Manhattan distance between the two step vectors (1 for a slight bend,
/// 2 for a right angle, 3 for a sharp turn).
pub fn turn_angle(arrival: Step, next: Step) -> i32 {
    if arrival.is_none() {
        return 0;
    }
    if next == arrival.reversed() {
        return 4;
    }
    i32::from((arrival.dx - next.dx).abs()) + i32::from((arrival.dy - next.dy).abs())
}

/// Map-sized buffer of noise intensities plus the queue of pending events.
#[derive(Clone, Debug)]
pub struct NoiseGrid {
    dimensions: MapDimensions,
    cells: Vec<NoiseCell>,
    events: Vec<NoiseEvent>,
    /// Cells that hold a noise, in the order they were first reached.
    touched: Vec<Position>,
    /// Set after a flush; the next registration wipes the old cells.
    stale: bool,
}

impl NoiseGrid {
    pub fn new(dimensions: MapDimensions) -> Self {
        Self {
            dimensions,
            cells: vec![NoiseCell::SILENT; dimensions.area()],
            events: Vec::new(),
            touched: Vec::new(),
            stale: false,
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    /// Noise record for a cell. `None` off the map.
    pub fn cell(&self, position: Position) -> Option<&NoiseCell> {
        self.dimensions
            .index(position)
            .and_then(|index| self.cells.get(index))
    }

    /// Events registered since the last propagation.
    pub fn pending(&self) -> &[NoiseEvent] {
        &self.events
    }

    /// Clears every cell and drops all pending events.
    pub fn reset(&mut self) {
        self.clear_cells();
        self.events.clear();
        self.stale = false;
    }

    /// Queues a noise for the next propagation.
    ///
    /// Noises at or below the audibility floor are dropped and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError::OutOfBounds`] when the source is off the map.
    pub fn register_noise(
        &mut self,
        event: NoiseEvent,
        policy: &NoisePolicy,
    ) -> Result<Option<NoiseId>, NoiseError> {
        if !self.dimensions.contains(event.source) {
            return Err(NoiseError::out_of_bounds(event.source, event.producer));
        }
        if event.intensity <= policy.audibility_floor {
            tracing::trace!(
                target: "crawl_core::noise",
                source = %event.source,
                intensity = event.intensity,
                "noise below audibility floor"
            );
            return Ok(None);
        }
        if self.stale {
            self.clear_cells();
            self.stale = false;
        }

        let id = NoiseId(self.events.len() as u32);
        self.seed(id, &event);
        tracing::debug!(
            target: "crawl_core::noise",
            id = id.0,
            source = %event.source,
            intensity = event.intensity,
            "noise registered"
        );
        self.events.push(event);
        Ok(Some(id))
    }

    /// Floods every pending noise across the map and lets each reached actor
    /// hear the loudest one at its cell.
    ///
    /// Pending events are consumed; cell records stay readable until the next
    /// registration or [`NoiseGrid::reset`].
    pub fn propagate_noise<M, L>(
        &mut self,
        map: &M,
        policy: &NoisePolicy,
        roster: &mut Roster,
        dice: &mut Dice<'_>,
        listener: &mut L,
    ) -> PropagationReport
    where
        M: MapOracle + ?Sized,
        L: NoiseListener + ?Sized,
    {
        let mut report = PropagationReport {
            events: self.events.len(),
            ..PropagationReport::default()
        };
        if self.events.is_empty() {
            return report;
        }

        self.clear_cells();
        let events = std::mem::take(&mut self.events);
        for (index, event) in events.iter().enumerate() {
            self.seed(NoiseId(index as u32), event);
        }

        self.flood(map, policy);
        report.cells_reached = self.touched.len();
        tracing::debug!(
            target: "crawl_core::noise",
            events = events.len(),
            cells = report.cells_reached,
            "noise propagated"
        );

        for position in self.touched.clone() {
            if map.is_silenced(position) {
                continue;
            }
            let Some(cell) = self.cell(position).copied() else {
                continue;
            };
            let Some(noise_id) = cell.noise_id else {
                continue;
            };
            let Some(event) = events.get(noise_id.0 as usize) else {
                continue;
            };
            let Some(listener_id) = roster.at(position) else {
                continue;
            };
            if Some(listener_id) == event.producer {
                continue;
            }
            if roster
                .get(listener_id)
                .is_none_or(|actor| actor.has(StatusKind::Sleepy))
            {
                continue;
            }

            let perceived =
                perceived_position(map, policy, dice, event.source, position, cell.travel);
            let (listener_actor, producer_actor) = match event.producer {
                Some(producer) => match roster.pair_mut(listener_id, producer) {
                    Some((listener_actor, producer_actor)) => (listener_actor, Some(producer_actor)),
                    None => match roster.get_mut(listener_id) {
                        Some(actor) => (actor, None),
                        None => continue,
                    },
                },
                None => match roster.get_mut(listener_id) {
                    Some(actor) => (actor, None),
                    None => continue,
                },
            };

            tracing::trace!(
                target: "crawl_core::noise",
                listener = %listener_id,
                intensity = cell.intensity,
                travel = cell.travel,
                perceived = %perceived,
                "noise heard"
            );
            listener.hear(Heard {
                listener: listener_actor,
                producer: producer_actor,
                noise_id,
                event,
                intensity: cell.intensity,
                travel: cell.travel,
                perceived,
                dice: &mut *dice,
            });
            report.heard.push((listener_id, noise_id));
        }

        self.stale = true;
        report
    }

    fn clear_cells(&mut self) {
        for position in self.touched.drain(..) {
            if let Some(index) = self.dimensions.index(position) {
                self.cells[index] = NoiseCell::SILENT;
            }
        }
    }

    /// Writes a source into its cell when it is strictly louder.
    fn seed(&mut self, id: NoiseId, event: &NoiseEvent) {
        let Some(index) = self.dimensions.index(event.source) else {
            return;
        };
        let cell = &mut self.cells[index];
        if event.intensity <= cell.intensity {
            return;
        }
        if cell.is_silent() {
            self.touched.push(event.source);
        }
        *cell = NoiseCell {
            noise_id: Some(id),
            intensity: event.intensity,
            travel: 0,
            arrival: Step::NONE,
        };
    }

    /// Breadth-first expansion, one ring at a time.
    fn flood<M>(&mut self, map: &M, policy: &NoisePolicy)
    where
        M: MapOracle + ?Sized,
    {
        let mut frontier: Vec<Position> = self.touched.clone();
        let mut next: Vec<Position> = Vec::new();
        // Ring at which a cell was last queued; avoids duplicate perimeter entries.
        let mut queued: Vec<u32> = vec![0; self.cells.len()];
        let mut ring: u32 = 1;

        while !frontier.is_empty() {
            ring += 1;
            for &position in &frontier {
                if map.is_silenced(position) {
                    continue;
                }
                let Some(tile) = map.tile(position) else {
                    continue;
                };
                let Some(cell) = self.cell(position).copied() else {
                    continue;
                };
                let base = policy.attenuation(tile.terrain());

                for step in Step::NEIGHBOURS {
                    let neighbour = position.offset(step);
                    let Some(index) = self.dimensions.index(neighbour) else {
                        continue;
                    };
                    let attenuation = policy.turned(base, turn_angle(cell.arrival, step));
                    let intensity = cell.intensity.saturating_sub(attenuation);
                    if intensity <= policy.audibility_floor {
                        continue;
                    }
                    let target = &mut self.cells[index];
                    if intensity <= target.intensity {
                        continue;
                    }
                    if target.is_silent() {
                        self.touched.push(neighbour);
                    }
                    *target = NoiseCell {
                        noise_id: cell.noise_id,
                        intensity,
                        travel: cell.travel + 1,
                        arrival: step,
                    };
                    if queued[index] != ring {
                        queued[index] = ring;
                        next.push(neighbour);
                    }
                }
            }
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
        }
    }
}
